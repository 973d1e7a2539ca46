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

pub mod hop_count_block;
pub mod payload_block;
pub mod unknown_block;

use crate::{CodecError, blockflags::BlockFlags, sdnv};

use self::{hop_count_block::HopCountBlock, payload_block::PayloadBlock, unknown_block::UnknownBlock};

pub const BLOCK_TYPE_PAYLOAD: u8 = 1;
pub const BLOCK_TYPE_HOP_COUNT: u8 = 10;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Block {
    Payload(PayloadBlock),
    HopCount(HopCountBlock),
    Unknown(UnknownBlock),
}

impl Block {
    fn block_type(&self) -> u8 {
        match self {
            Block::Payload(_) => BLOCK_TYPE_PAYLOAD,
            Block::HopCount(_) => BLOCK_TYPE_HOP_COUNT,
            Block::Unknown(b) => b.block_type,
        }
    }

    fn encode_payload(&self, out: &mut Vec<u8>) {
        match self {
            Block::Payload(p) => out.extend_from_slice(&p.data),
            Block::HopCount(h) => h.encode(out),
            Block::Unknown(u) => out.extend_from_slice(&u.data),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CanonicalBlock {
    pub block: Block,
    pub block_flags: BlockFlags,
}

impl CanonicalBlock {
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.block.block_type());
        sdnv::encode(u64::from(self.block_flags.bits()), out);
        let mut payload = Vec::new();
        self.block.encode_payload(&mut payload);
        sdnv::encode(payload.len() as u64, out);
        out.extend_from_slice(&payload);
    }

    pub fn decode(buf: &[u8]) -> Result<(Self, usize), CodecError> {
        if buf.is_empty() {
            return Err(CodecError::Truncated);
        }
        let block_type = buf[0];
        let mut pos = 1;
        let (flags_bits, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let block_flags = BlockFlags::from_bits_truncate(flags_bits);
        let (length, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let length = length as usize;
        let end = pos.checked_add(length).ok_or(CodecError::Truncated)?;
        if end > buf.len() {
            return Err(CodecError::Truncated);
        }
        let data = &buf[pos..end];
        let block = match block_type {
            BLOCK_TYPE_PAYLOAD => Block::Payload(PayloadBlock {
                data: data.to_vec(),
            }),
            BLOCK_TYPE_HOP_COUNT => Block::HopCount(HopCountBlock::decode(data)?),
            other => Block::Unknown(UnknownBlock {
                block_type: other,
                data: data.to_vec(),
            }),
        };
        Ok((
            CanonicalBlock {
                block,
                block_flags,
            },
            end,
        ))
    }
}
