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

//! Administrative records: protocol-internal payloads carried inside a
//! bundle whose `ADMINISTRATIVE_RECORD` processing flag is set, per §4.4.

pub mod bundle_status_report;
pub mod custody_signal;

use crate::CodecError;

use self::{bundle_status_report::BundleStatusReport, custody_signal::CustodySignal};

pub const RECORD_TYPE_STATUS_REPORT: u8 = 0x10;
pub const RECORD_TYPE_CUSTODY_SIGNAL: u8 = 0x20;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AdministrativeRecord {
    StatusReport(BundleStatusReport),
    CustodySignal(CustodySignal),
}

impl AdministrativeRecord {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            AdministrativeRecord::StatusReport(r) => {
                out.push(RECORD_TYPE_STATUS_REPORT);
                r.encode(&mut out);
            }
            AdministrativeRecord::CustodySignal(s) => {
                out.push(RECORD_TYPE_CUSTODY_SIGNAL);
                s.encode(&mut out);
            }
        }
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let (&record_type, rest) = buf.split_first().ok_or(CodecError::Truncated)?;
        match record_type {
            RECORD_TYPE_STATUS_REPORT => {
                Ok(AdministrativeRecord::StatusReport(BundleStatusReport::decode(rest)?))
            }
            RECORD_TYPE_CUSTODY_SIGNAL => {
                Ok(AdministrativeRecord::CustodySignal(CustodySignal::decode(rest)?))
            }
            _ => Err(CodecError::MalformedBlock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AdministrativeRecord;
    use crate::administrative_record::{
        bundle_status_report::{BundleStatusFlags, BundleStatusReason, BundleStatusReport},
        custody_signal::CustodySignal,
    };
    use crate::endpoint::Endpoint;

    #[test]
    fn round_trips_status_report() {
        let record = AdministrativeRecord::StatusReport(BundleStatusReport {
            flags: BundleStatusFlags::DELIVERED,
            reason: BundleStatusReason::NoAdditionalInformation,
            source: Endpoint::new(2, 99),
            creation_timestamp: 1,
            creation_sequence: 1,
            fragment_offset: 0,
        });
        assert_eq!(AdministrativeRecord::decode(&record.encode()).unwrap(), record);
    }

    #[test]
    fn round_trips_custody_signal() {
        let record = AdministrativeRecord::CustodySignal(CustodySignal {
            succeeded: true,
            reason: BundleStatusReason::NoAdditionalInformation,
            source: Endpoint::new(2, 99),
            creation_timestamp: 1,
            creation_sequence: 1,
            fragment_offset: 0,
        });
        assert_eq!(AdministrativeRecord::decode(&record.encode()).unwrap(), record);
    }

    #[test]
    fn decode_rejects_unknown_record_type() {
        assert!(AdministrativeRecord::decode(&[0xFF, 0]).is_err());
    }
}
