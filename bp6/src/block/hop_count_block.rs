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

//! Extension block carrying the hop-limit enforcement from SPEC_FULL §4.5.
//! Not part of RFC 5050 proper; the reference node carries it the same way.

use crate::CodecError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct HopCountBlock {
    pub limit: u8,
    pub count: u8,
}

impl HopCountBlock {
    /// `true` if incrementing would still be within `limit`.
    pub fn can_increment(&self) -> bool {
        self.count < self.limit
    }

    pub fn incremented(self) -> Self {
        HopCountBlock {
            count: self.count.saturating_add(1),
            ..self
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.limit);
        out.push(self.count);
    }

    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        match data {
            [limit, count] => Ok(HopCountBlock {
                limit: *limit,
                count: *count,
            }),
            _ => Err(CodecError::MalformedBlock),
        }
    }
}
