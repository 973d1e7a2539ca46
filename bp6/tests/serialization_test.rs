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

use bp6::{
    block::{Block, CanonicalBlock, payload_block::PayloadBlock},
    blockflags::BlockFlags,
    bundle::Bundle,
    bundleflags::ProcessingFlags,
    endpoint::Endpoint,
    primaryblock::PrimaryBlock,
    time::DtnTime,
};

/// destination (1,25), source (2,99), report_to == source, custodian
/// null, creation_timestamp 0, sequence 0, lifetime 3600, 60-byte
/// payload -- the scenario 1 bundle.
#[rustfmt::skip]
const SCENARIO_1_BYTES: &[u8] = &[
    // primary block: version, processing_flags SDNV, block-length SDNV
    0x06, 0x00, 0x0D,
    // body: destination(1,25), source(2,99), report_to(2,99), custodian(0,0)
    0x01, 0x19, 0x02, 0x63, 0x02, 0x63, 0x00, 0x00,
    // creation_timestamp=0, creation_sequence=0, lifetime=3600, dictionary_length=0
    0x00, 0x00, 0x9C, 0x10, 0x00,
    // canonical block: type=PAYLOAD, flags=LAST_BLOCK, length=60
    0x01, 0x08, 0x3C,
    // 60 payload bytes, 0..59
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09,
    0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10, 0x11, 0x12, 0x13,
    0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D,
    0x1E, 0x1F, 0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27,
    0x28, 0x29, 0x2A, 0x2B, 0x2C, 0x2D, 0x2E, 0x2F, 0x30, 0x31,
    0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x3B,
];

fn scenario_1_bundle() -> Bundle {
    let payload: Vec<u8> = (0u8..60).collect();
    Bundle {
        primary_block: PrimaryBlock {
            processing_flags: ProcessingFlags::empty(),
            destination: Endpoint::new(1, 25),
            source: Endpoint::new(2, 99),
            report_to: Endpoint::new(2, 99),
            custodian: Endpoint::null(),
            creation_timestamp: DtnTime(0),
            creation_sequence: 0,
            lifetime: 3600,
            fragment: None,
        },
        blocks: vec![CanonicalBlock {
            block: Block::Payload(PayloadBlock { data: payload }),
            block_flags: BlockFlags::LAST_BLOCK,
        }],
    }
}

#[test]
fn decodes_the_literal_wire_fixture() {
    let decoded = Bundle::decode(SCENARIO_1_BYTES).unwrap();
    assert_eq!(decoded, scenario_1_bundle());
}

#[test]
fn encodes_to_the_literal_wire_fixture() {
    assert_eq!(scenario_1_bundle().encode(), SCENARIO_1_BYTES);
}

#[test]
fn bundle_number_is_stable_across_encode_decode() {
    let original = scenario_1_bundle();
    let decoded = Bundle::decode(&original.encode()).unwrap();
    assert_eq!(original.bundle_number(), decoded.bundle_number());
}
