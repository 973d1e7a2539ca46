// Copyright (C) 2023 Felix Huettner
//
// This file is part of DTRD.
//
// DTRD is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// DTRD is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use bitflags::bitflags;

bitflags! {
    /// Block Processing Control Flags, RFC 5050 §4.3.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct BlockFlags: u32 {
        const MUST_REPLICATE_TO_ALL_FRAGMENTS = 0x01;
        const STATUS_REPORT_IF_NOT_PROCESSABLE = 0x02;
        const DELETE_BUNDLE_IF_NOT_PROCESSABLE = 0x04;
        const LAST_BLOCK = 0x08;
        const DISCARD_BLOCK_IF_NOT_PROCESSABLE = 0x10;
        const FORWARDED_WITHOUT_PROCESSING = 0x20;
    }
}
