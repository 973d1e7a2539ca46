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

use crate::{
    CodecError,
    block::{BLOCK_TYPE_PAYLOAD, Block, CanonicalBlock, hop_count_block::HopCountBlock, payload_block::PayloadBlock},
    blockflags::BlockFlags,
    bundle_number::{self, BundleNumber},
    primaryblock::PrimaryBlock,
};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Bundle {
    pub primary_block: PrimaryBlock,
    pub blocks: Vec<CanonicalBlock>,
}

impl Bundle {
    pub fn payload_block(&self) -> &PayloadBlock {
        self.blocks
            .iter()
            .find_map(|b| match &b.block {
                Block::Payload(p) => Some(p),
                _ => None,
            })
            .expect("constructed/decoded bundles always carry a payload block")
    }

    /// The un-fragmented application data unit length: the wire value when
    /// this bundle is a fragment, otherwise the payload block's own size.
    pub fn application_data_length(&self) -> u32 {
        match self.primary_block.fragment {
            Some(f) => f.application_data_length,
            None => self.payload_block().data.len() as u32,
        }
    }

    pub fn bundle_number(&self) -> BundleNumber {
        let pb = &self.primary_block;
        bundle_number::compute(
            pb.creation_sequence,
            pb.creation_timestamp.0,
            pb.source.node_id,
            pb.source.service_id,
            pb.fragment_offset(),
            self.application_data_length(),
        )
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.primary_block.encode(&mut out);
        for block in &self.blocks {
            block.encode(&mut out);
        }
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let (primary_block, mut pos) = PrimaryBlock::decode(buf)?;
        let mut blocks = Vec::new();
        let mut saw_payload = false;
        let mut saw_last_block = false;
        while pos < buf.len() {
            if saw_last_block {
                return Err(CodecError::MalformedBlock);
            }
            let (block, consumed) = CanonicalBlock::decode(&buf[pos..])?;
            pos += consumed;
            if matches!(block.block, Block::Payload(_)) {
                saw_payload = true;
            }
            saw_last_block = block
                .block_flags
                .contains(crate::blockflags::BlockFlags::LAST_BLOCK);
            blocks.push(block);
        }
        if !saw_payload {
            return Err(CodecError::MissingPayloadBlock);
        }
        Ok(Bundle {
            primary_block,
            blocks,
        })
    }

    /// Ensures exactly one `PAYLOAD` block is present and it carries the
    /// `LAST_BLOCK` flag, matching §3's "exactly one block has type
    /// `PAYLOAD`" invariant for locally-created bundles.
    pub fn payload_block_type() -> u8 {
        BLOCK_TYPE_PAYLOAD
    }

    /// The hop-count extension block carried by this bundle, if any
    /// (SPEC_FULL §4.5's hop-limit supplement; not part of RFC 5050).
    pub fn hop_count(&self) -> Option<HopCountBlock> {
        self.blocks.iter().find_map(|b| match &b.block {
            Block::HopCount(h) => Some(*h),
            _ => None,
        })
    }

    /// Returns a copy of this bundle with its hop-count block replaced (or
    /// inserted ahead of the payload block if absent). The payload block
    /// keeps the `LAST_BLOCK` flag.
    pub fn with_hop_count(&self, hop_count: HopCountBlock) -> Bundle {
        let mut blocks: Vec<CanonicalBlock> = self
            .blocks
            .iter()
            .filter(|b| !matches!(b.block, Block::HopCount(_)))
            .cloned()
            .collect();
        let payload_pos = blocks
            .iter()
            .position(|b| matches!(b.block, Block::Payload(_)))
            .unwrap_or(blocks.len());
        blocks.insert(
            payload_pos,
            CanonicalBlock {
                block: Block::HopCount(hop_count),
                block_flags: BlockFlags::empty(),
            },
        );
        Bundle {
            primary_block: self.primary_block.clone(),
            blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Bundle;
    use crate::{
        block::{Block, CanonicalBlock, payload_block::PayloadBlock},
        blockflags::BlockFlags,
        bundleflags::ProcessingFlags,
        endpoint::Endpoint,
        primaryblock::PrimaryBlock,
        time::DtnTime,
    };

    fn sample_bundle(payload: &[u8]) -> Bundle {
        Bundle {
            primary_block: PrimaryBlock {
                processing_flags: ProcessingFlags::DELIVERY_STATUS_REQUESTED,
                destination: Endpoint::new(1, 25),
                source: Endpoint::new(2, 99),
                report_to: Endpoint::new(2, 99),
                custodian: Endpoint::new(2, 99),
                creation_timestamp: DtnTime(0),
                creation_sequence: 0,
                lifetime: 3600,
                fragment: None,
            },
            blocks: vec![CanonicalBlock {
                block: Block::Payload(PayloadBlock {
                    data: payload.to_vec(),
                }),
                block_flags: BlockFlags::LAST_BLOCK,
            }],
        }
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let payload: Vec<u8> = (0..60).map(|i: u32| (i % 256) as u8).collect();
        let bundle = sample_bundle(&payload);
        let encoded = bundle.encode();
        let decoded = Bundle::decode(&encoded).unwrap();
        assert_eq!(decoded, bundle);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn bundle_number_is_deterministic_over_defining_fields() {
        let a = sample_bundle(&[1, 2, 3]);
        let b = sample_bundle(&[9, 9, 9]); // different payload bytes, same length
        assert_eq!(a.bundle_number(), b.bundle_number());
    }

    #[test]
    fn bundle_number_changes_with_payload_length() {
        let a = sample_bundle(&[1, 2, 3]);
        let b = sample_bundle(&[1, 2, 3, 4]);
        assert_ne!(a.bundle_number(), b.bundle_number());
    }

    #[test]
    fn decode_rejects_bundle_without_payload_block() {
        let mut bundle = sample_bundle(&[1, 2, 3]);
        bundle.blocks.clear();
        let mut out = Vec::new();
        bundle.primary_block.encode(&mut out);
        // no canonical blocks follow
        assert_eq!(Bundle::decode(&out), Err(crate::CodecError::MissingPayloadBlock));
    }

    #[test]
    fn decode_rejects_trailing_garbage_after_last_block() {
        let bundle = sample_bundle(&[1, 2, 3]);
        let mut encoded = bundle.encode();
        encoded.push(0xFF); // one more byte that doesn't form a block
        assert_eq!(Bundle::decode(&encoded), Err(crate::CodecError::MalformedBlock));
    }
}
