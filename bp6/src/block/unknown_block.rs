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

//! A block whose `block_type` this profile does not recognize. Kept
//! verbatim so the agent can honor `BlockFlags::FORWARDED_WITHOUT_PROCESSING`
//! instead of dropping data it cannot interpret.

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UnknownBlock {
    pub block_type: u8,
    pub data: Vec<u8>,
}
