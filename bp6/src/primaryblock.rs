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
    CodecError, bundleflags::ProcessingFlags, endpoint::Endpoint, sdnv, time::DtnTime,
};

pub const BUNDLE_VERSION: u8 = 6;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PrimaryBlock {
    pub processing_flags: ProcessingFlags,
    pub destination: Endpoint,
    pub source: Endpoint,
    pub report_to: Endpoint,
    pub custodian: Endpoint,
    pub creation_timestamp: DtnTime,
    pub creation_sequence: u32,
    pub lifetime: u32,
    /// `fragment_offset` and `application_data_length` are only present on
    /// the wire when `ProcessingFlags::FRAGMENT` is set; `None` here means
    /// "not a fragment" rather than "offset 0".
    pub fragment: Option<FragmentInfo>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FragmentInfo {
    pub offset: u32,
    pub application_data_length: u32,
}

impl PrimaryBlock {
    /// `fragment_offset` for bundle-number / redundancy-filter purposes:
    /// 0 if this bundle is not a fragment, matching §3's data model.
    pub fn fragment_offset(&self) -> u32 {
        self.fragment.map_or(0, |f| f.offset)
    }

    fn encoded_endpoint(out: &mut Vec<u8>, endpoint: &Endpoint) {
        sdnv::encode(u64::from(endpoint.node_id), out);
        sdnv::encode(u64::from(endpoint.service_id), out);
    }

    fn decode_endpoint(buf: &[u8]) -> Result<(Endpoint, usize), CodecError> {
        let (node_id, consumed_node) = sdnv::decode(buf)?;
        let (service_id, consumed_service) = sdnv::decode(&buf[consumed_node..])?;
        Ok((
            Endpoint::new(node_id, service_id),
            consumed_node + consumed_service,
        ))
    }

    /// Encodes the fields that come after the block-length SDNV, i.e.
    /// everything the `block-length` value in `encode` measures.
    fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::new();
        Self::encoded_endpoint(&mut body, &self.destination);
        Self::encoded_endpoint(&mut body, &self.source);
        Self::encoded_endpoint(&mut body, &self.report_to);
        Self::encoded_endpoint(&mut body, &self.custodian);
        sdnv::encode(u64::from(self.creation_timestamp.0), &mut body);
        sdnv::encode(u64::from(self.creation_sequence), &mut body);
        sdnv::encode(u64::from(self.lifetime), &mut body);
        sdnv::encode(0, &mut body); // dictionary_length, always 0 in this profile
        if let Some(fragment) = self.fragment {
            sdnv::encode(u64::from(fragment.offset), &mut body);
            sdnv::encode(u64::from(fragment.application_data_length), &mut body);
        }
        body
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(BUNDLE_VERSION);
        sdnv::encode(u64::from(self.processing_flags.bits()), out);
        let body = self.encode_body();
        sdnv::encode(body.len() as u64, out);
        out.extend_from_slice(&body);
    }

    pub fn decode(buf: &[u8]) -> Result<(Self, usize), CodecError> {
        if buf.is_empty() {
            return Err(CodecError::Truncated);
        }
        let version = buf[0];
        if version != BUNDLE_VERSION {
            return Err(CodecError::VersionMismatch(version));
        }
        let mut pos = 1;
        let (flags_bits, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let processing_flags = ProcessingFlags::from_bits_truncate(flags_bits);

        let (block_length, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let body_start = pos;
        let body_end = body_start
            .checked_add(block_length as usize)
            .ok_or(CodecError::Truncated)?;
        if body_end > buf.len() {
            return Err(CodecError::Truncated);
        }

        let (destination, consumed) = Self::decode_endpoint(&buf[pos..])?;
        pos += consumed;
        let (source, consumed) = Self::decode_endpoint(&buf[pos..])?;
        pos += consumed;
        let (report_to, consumed) = Self::decode_endpoint(&buf[pos..])?;
        pos += consumed;
        let (custodian, consumed) = Self::decode_endpoint(&buf[pos..])?;
        pos += consumed;

        let (creation_timestamp, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let (creation_sequence, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let (lifetime, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let (_dictionary_length, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;

        let fragment = if processing_flags.contains(ProcessingFlags::FRAGMENT) {
            let (offset, consumed) = sdnv::decode(&buf[pos..])?;
            pos += consumed;
            let (application_data_length, consumed) = sdnv::decode(&buf[pos..])?;
            pos += consumed;
            Some(FragmentInfo {
                offset,
                application_data_length,
            })
        } else {
            None
        };

        if pos != body_end {
            return Err(CodecError::MalformedBlock);
        }

        Ok((
            PrimaryBlock {
                processing_flags,
                destination,
                source,
                report_to,
                custodian,
                creation_timestamp: DtnTime(creation_timestamp),
                creation_sequence,
                lifetime,
                fragment,
            },
            pos,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{FragmentInfo, PrimaryBlock};
    use crate::{bundleflags::ProcessingFlags, endpoint::Endpoint, time::DtnTime};

    fn sample() -> PrimaryBlock {
        PrimaryBlock {
            processing_flags: ProcessingFlags::DELIVERY_STATUS_REQUESTED,
            destination: Endpoint::new(1, 25),
            source: Endpoint::new(2, 99),
            report_to: Endpoint::new(2, 99),
            custodian: Endpoint::null(),
            creation_timestamp: DtnTime(0),
            creation_sequence: 0,
            lifetime: 3600,
            fragment: None,
        }
    }

    #[test]
    fn round_trips_byte_identical() {
        let pb = sample();
        let mut out = Vec::new();
        pb.encode(&mut out);
        let (decoded, consumed) = PrimaryBlock::decode(&out).unwrap();
        assert_eq!(consumed, out.len());
        assert_eq!(decoded, pb);
        let mut reencoded = Vec::new();
        decoded.encode(&mut reencoded);
        assert_eq!(reencoded, out);
    }

    #[test]
    fn round_trips_fragment_fields() {
        let pb = PrimaryBlock {
            processing_flags: ProcessingFlags::FRAGMENT,
            fragment: Some(FragmentInfo {
                offset: 120,
                application_data_length: 1024,
            }),
            ..sample()
        };
        let mut out = Vec::new();
        pb.encode(&mut out);
        let (decoded, _) = PrimaryBlock::decode(&out).unwrap();
        assert_eq!(decoded, pb);
        assert_eq!(decoded.fragment_offset(), 120);
    }

    #[test]
    fn non_fragment_offset_defaults_to_zero() {
        assert_eq!(sample().fragment_offset(), 0);
    }

    #[test]
    fn rejects_wrong_version() {
        let mut out = Vec::new();
        sample().encode(&mut out);
        out[0] = 7;
        assert_eq!(
            PrimaryBlock::decode(&out),
            Err(crate::CodecError::VersionMismatch(7))
        );
    }

    #[test]
    fn rejects_truncated_buffer() {
        let mut out = Vec::new();
        sample().encode(&mut out);
        out.truncate(out.len() - 2);
        assert_eq!(PrimaryBlock::decode(&out), Err(crate::CodecError::Truncated));
    }
}
