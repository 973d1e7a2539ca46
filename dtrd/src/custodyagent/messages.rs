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

use actix::prelude::*;
use bp6::{administrative_record::custody_signal::CustodySignal, bundle_number::BundleNumber, endpoint::Endpoint};

use crate::bundlestorageagent::BundleHandle;

use super::CustodyError;

/// Accepts custody of a bundle being forwarded, per §4.4's decide step.
/// `previous_custodian` is who we owe a success/failure signal to.
#[derive(Message)]
#[rtype(result = "Result<(), CustodyError>")]
pub struct TakeCustody {
    pub handle: BundleHandle,
    pub previous_custodian: Endpoint,
}

/// Releases custody of a bundle, e.g. after local delivery. Authoritative
/// over any in-flight retransmit: it simply removes the record and lets
/// the next timer tick find nothing to do.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ReleaseCustody {
    pub bundle_number: BundleNumber,
}

/// An incoming custody signal from a downstream custodian, matched
/// against the held records by its identifying triple.
#[derive(Message)]
#[rtype(result = "()")]
pub struct HandleCustodySignal {
    pub signal: CustodySignal,
}
