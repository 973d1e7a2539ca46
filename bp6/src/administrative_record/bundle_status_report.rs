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

use crate::{CodecError, endpoint::Endpoint, sdnv};

bitflags! {
    /// Which lifecycle events this report is asserting happened, per §4.4.
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct BundleStatusFlags: u8 {
        const RECEIVED  = 0x01;
        const FORWARDED = 0x02;
        const DELIVERED = 0x04;
        const DELETED   = 0x08;
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum BundleStatusReason {
    NoAdditionalInformation = 0,
    LifetimeExpired = 1,
    ForwardedOverUnidirectionalLink = 2,
    TransmissionCanceled = 3,
    DepletedStorage = 4,
    DestinationEndpointIdUnavailable = 5,
    NoKnownRouteToDestinationFromHere = 6,
    NoTimelyContactWithNextNodeOnRoute = 7,
    BlockUnintelligible = 8,
    HopLimitExceeded = 9,
    TrafficPared = 10,
    BlockUnsupported = 11,
}

impl BundleStatusReason {
    pub(crate) fn from_u8(value: u8) -> Result<Self, CodecError> {
        Ok(match value {
            0 => Self::NoAdditionalInformation,
            1 => Self::LifetimeExpired,
            2 => Self::ForwardedOverUnidirectionalLink,
            3 => Self::TransmissionCanceled,
            4 => Self::DepletedStorage,
            5 => Self::DestinationEndpointIdUnavailable,
            6 => Self::NoKnownRouteToDestinationFromHere,
            7 => Self::NoTimelyContactWithNextNodeOnRoute,
            8 => Self::BlockUnintelligible,
            9 => Self::HopLimitExceeded,
            10 => Self::TrafficPared,
            11 => Self::BlockUnsupported,
            _ => return Err(CodecError::MalformedBlock),
        })
    }
}

/// The identifying triple (plus source endpoint) used to match a report
/// back to the bundle it describes, per §4.4: `(source_node,
/// creation_timestamp, creation_sequence, fragment_offset)`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct BundleStatusReport {
    pub flags: BundleStatusFlags,
    pub reason: BundleStatusReason,
    pub source: Endpoint,
    pub creation_timestamp: u32,
    pub creation_sequence: u32,
    pub fragment_offset: u32,
}

impl BundleStatusReport {
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.flags.bits());
        out.push(self.reason as u8);
        sdnv::encode(u64::from(self.source.node_id), out);
        sdnv::encode(u64::from(self.source.service_id), out);
        sdnv::encode(u64::from(self.creation_timestamp), out);
        sdnv::encode(u64::from(self.creation_sequence), out);
        sdnv::encode(u64::from(self.fragment_offset), out);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < 2 {
            return Err(CodecError::Truncated);
        }
        let flags = BundleStatusFlags::from_bits_truncate(buf[0]);
        let reason = BundleStatusReason::from_u8(buf[1])?;
        let mut pos = 2;
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
        Ok(BundleStatusReport {
            flags,
            reason,
            source: Endpoint::new(node_id, service_id),
            creation_timestamp,
            creation_sequence,
            fragment_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BundleStatusFlags, BundleStatusReason, BundleStatusReport};
    use crate::endpoint::Endpoint;

    #[test]
    fn round_trips_byte_identical() {
        let report = BundleStatusReport {
            flags: BundleStatusFlags::DELIVERED,
            reason: BundleStatusReason::NoAdditionalInformation,
            source: Endpoint::new(2, 99),
            creation_timestamp: 123_456,
            creation_sequence: 7,
            fragment_offset: 0,
        };
        let mut out = Vec::new();
        report.encode(&mut out);
        assert_eq!(BundleStatusReport::decode(&out).unwrap(), report);
    }

    #[test]
    fn decode_rejects_unknown_reason_code() {
        let bytes = [BundleStatusFlags::DELETED.bits(), 200, 0, 0, 0, 0, 0];
        assert!(BundleStatusReport::decode(&bytes).is_err());
    }
}
