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

use bp6::{bundle_number::BundleNumber, endpoint::Endpoint};

pub mod agent;
pub mod messages;

/// One bundle this node currently holds custody of, per §4.4. Survives
/// only in memory; a cold restart loses in-flight custody, which matches
/// the storage layer's own `under_custody` flag being non-persistent.
#[derive(Debug, Clone)]
pub struct CustodyRecord {
    pub bundle_number: BundleNumber,
    pub source: Endpoint,
    pub creation_timestamp: u32,
    pub creation_sequence: u32,
    pub fragment_offset: u32,
    pub previous_custodian: Endpoint,
    pub retransmit_deadline: u32,
    pub retransmit_counter: u32,
    /// `report_to` of the held bundle, kept so retransmit-limit exhaustion
    /// can emit the deletion status report §4.5 calls for without reading
    /// the bundle back from storage.
    pub report_to: Endpoint,
    pub wants_deletion_report: bool,
}

#[derive(Debug)]
pub enum CustodyError {
    /// The bounded custody table is already at `custody_max_entries`.
    Full,
}
