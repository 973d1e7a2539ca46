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
    CodecError, administrative_record::bundle_status_report::BundleStatusReason,
    endpoint::Endpoint, sdnv,
};

const SUCCEEDED_BIT: u8 = 0x80;

/// Carries `status` (succeeded bit + reason code) and the triple
/// identifying the bundle this signal is about, per §4.4.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CustodySignal {
    pub succeeded: bool,
    pub reason: BundleStatusReason,
    pub source: Endpoint,
    pub creation_timestamp: u32,
    pub creation_sequence: u32,
    pub fragment_offset: u32,
}

impl CustodySignal {
    pub fn encode(&self, out: &mut Vec<u8>) {
        let status = (self.reason as u8) | if self.succeeded { SUCCEEDED_BIT } else { 0 };
        out.push(status);
        sdnv::encode(u64::from(self.source.node_id), out);
        sdnv::encode(u64::from(self.source.service_id), out);
        sdnv::encode(u64::from(self.creation_timestamp), out);
        sdnv::encode(u64::from(self.creation_sequence), out);
        sdnv::encode(u64::from(self.fragment_offset), out);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.is_empty() {
            return Err(CodecError::Truncated);
        }
        let status = buf[0];
        let succeeded = status & SUCCEEDED_BIT != 0;
        let reason = BundleStatusReason::from_u8(status & !SUCCEEDED_BIT)?;
        let mut pos = 1;
        let (node_id, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let (service_id, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let (creation_timestamp, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let (creation_sequence, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        let (fragment_offset, consumed) = sdnv::decode(&buf[pos..])?;
        pos += consumed;
        if pos != buf.len() {
            return Err(CodecError::MalformedBlock);
        }
        Ok(CustodySignal {
            succeeded,
            reason,
            source: Endpoint::new(node_id, service_id),
            creation_timestamp,
            creation_sequence,
            fragment_offset,
        })
    }

    /// The triple (plus source) used to match this signal to a held
    /// custody record, matching the fields a `CustodyRecord` is keyed on.
    pub fn matches(&self, source: Endpoint, creation_timestamp: u32, creation_sequence: u32, fragment_offset: u32) -> bool {
        self.source == source
            && self.creation_timestamp == creation_timestamp
            && self.creation_sequence == creation_sequence
            && self.fragment_offset == fragment_offset
    }
}

#[cfg(test)]
mod tests {
    use super::CustodySignal;
    use crate::administrative_record::bundle_status_report::BundleStatusReason;
    use crate::endpoint::Endpoint;

    #[test]
    fn round_trips_byte_identical() {
        let signal = CustodySignal {
            succeeded: true,
            reason: BundleStatusReason::NoAdditionalInformation,
            source: Endpoint::new(2, 99),
            creation_timestamp: 42,
            creation_sequence: 1,
            fragment_offset: 0,
        };
        let mut out = Vec::new();
        signal.encode(&mut out);
        assert_eq!(CustodySignal::decode(&out).unwrap(), signal);
    }

    #[test]
    fn matches_compares_the_identifying_triple() {
        let signal = CustodySignal {
            succeeded: false,
            reason: BundleStatusReason::DepletedStorage,
            source: Endpoint::new(2, 99),
            creation_timestamp: 42,
            creation_sequence: 1,
            fragment_offset: 0,
        };
        assert!(signal.matches(Endpoint::new(2, 99), 42, 1, 0));
        assert!(!signal.matches(Endpoint::new(2, 99), 43, 1, 0));
    }
}
