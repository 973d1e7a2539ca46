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
use bp6::bundle_number::BundleNumber;

use super::{BundleHandle, StorageError};

/// Persist a bundle. Idempotent: saving a bundle that hashes to a
/// `bundle_number` already present is a no-op that returns the existing
/// number, per §3/§4.2's de-duplication contract.
#[derive(Message)]
#[rtype(result = "Result<BundleNumber, StorageError>")]
pub struct SaveBundle {
    pub handle: BundleHandle,
}

#[derive(Message)]
#[rtype(result = "Option<BundleHandle>")]
pub struct ReadBundle {
    pub bundle_number: BundleNumber,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct DeleteBundle {
    pub bundle_number: BundleNumber,
}

/// Deletes a bundle unless it is currently held under custody, per the
/// §3 invariant that custody-held bundles are never removed except by
/// custody release or retransmit-limit exhaustion. Used by
/// `processing_finished` handling: a locally delivered bundle that also
/// happens to be stored (e.g. this node was both custodian and final
/// destination) is freed only if nothing still needs it.
#[derive(Message)]
#[rtype(result = "()")]
pub struct DeleteIfNotUnderCustody {
    pub bundle_number: BundleNumber,
}

#[derive(Message)]
#[rtype(result = "usize")]
pub struct FreeSpace {}

#[derive(Message)]
#[rtype(result = "Vec<BundleNumber>")]
pub struct ListBundles {}

/// Exempts (or re-admits) a stored bundle from the eviction sweep while
/// it is under custody, per the §3 invariant that custody-held bundles
/// are never evicted by lifetime/priority alone.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SetUnderCustody {
    pub bundle_number: BundleNumber,
    pub under_custody: bool,
}

/// Posted to the bundle agent once a bundle has been durably saved,
/// triggering a forwarding pass per §4.5.
#[derive(Message)]
#[rtype(result = "()")]
pub struct EventBundleInStorage {
    pub bundle_number: BundleNumber,
}

/// Posted when a sweep evicts a bundle whose lifetime has expired, per
/// §4.5's failure semantics: the bundle agent decides whether a deletion
/// status report is owed to `report_to`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct EventBundleExpired {
    pub handle: BundleHandle,
}

/// Posted when `save` evicts the lowest-priority slot to admit a
/// higher-priority incoming bundle under memory pressure (§4.2's
/// full-store eviction policy). Like `EventBundleExpired`, the bundle
/// agent decides whether a `DepletedStorage` deletion report is owed to
/// `report_to`, per §4.2's cross-reference to `delete(reason)`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct EventBundleDepleted {
    pub handle: BundleHandle,
}
