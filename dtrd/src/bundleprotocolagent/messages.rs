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

//! §6's application and network interface events, plus the internal
//! events the storage and custody agents post back to the bundle agent.

use actix::prelude::*;
use bp6::{administrative_record::AdministrativeRecord, bundle_number::BundleNumber, endpoint::Endpoint};

use crate::bundlestorageagent::BundleHandle;

// ---- Application interface (§6) ----

/// `application_registration`: installs a `service_id → queue` mapping.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ApplicationRegister {
    pub service_id: u32,
    pub queue: Recipient<SubmitDataToApplication>,
    pub active: bool,
}

/// `application_remove`: deletes the mapping for `service_id`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ApplicationRemove {
    pub service_id: u32,
}

/// `application_status`: flips the active flag without touching the queue.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ApplicationStatus {
    pub service_id: u32,
    pub active: bool,
}

/// `send_bundle`: a local application wants to transmit `handle`.
/// `responder`, if set, receives the eventual `BundleSendResult`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SendBundle {
    pub handle: BundleHandle,
    pub responder: Option<Recipient<BundleSendResult>>,
}

/// `processing_finished`: the application has released a delivered handle.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ProcessingFinished {
    pub bundle_number: BundleNumber,
}

/// `submit_data_to_application`: agent → app, handing over an owned
/// handle. The application must post `ProcessingFinished` once done.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SubmitDataToApplication {
    pub handle: BundleHandle,
}

/// `bundle_stored` / `bundle_store_failed` collapsed into one result,
/// posted back to whoever sent the `SendBundle` that triggered it.
#[derive(Message)]
#[rtype(result = "()")]
pub struct BundleSendResult(pub Result<BundleNumber, ()>);

// ---- Network / discovery interface (§6) ----

/// `receive_bundle`: the network delivered a bundle.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ReceiveBundle {
    pub handle: BundleHandle,
}

/// Installs the recipient the agent hands encoded bytes to for
/// transmission. Stands in for the out-of-scope radio MAC/link layer.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RegisterNetworkSink {
    pub sink: Recipient<TransmitBundle>,
}

/// Agent → network: "send these bytes to this neighbor."
#[derive(Message)]
#[rtype(result = "()")]
pub struct TransmitBundle {
    pub neighbor: Endpoint,
    pub bundle_number: BundleNumber,
    pub bytes: Vec<u8>,
}

/// Network → agent: the MAC callback reporting success or failure of a
/// previously requested `TransmitBundle`. Failure leaves the bundle in
/// storage for later retry; success is logged only (§4.5).
#[derive(Message)]
#[rtype(result = "()")]
pub struct TransmitResult {
    pub neighbor: Endpoint,
    pub bundle_number: BundleNumber,
    pub success: bool,
}

/// `beacon` / `peer_alive`, forwarded by the node agent once it has
/// updated its own neighbor table. Either event re-evaluates the store
/// for bundles destined to `node_id`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct EventNeighborUp {
    pub node_id: u32,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct EventNeighborDown {
    pub node_id: u32,
}

// ---- Internal, posted by storage/custody ----

/// Posted by storage once a bundle has been durably saved, per §4.5.
#[derive(Message)]
#[rtype(result = "()")]
pub struct EventBundleInStorage {
    pub bundle_number: BundleNumber,
}

/// Posted by the custody module to emit a generated admin record
/// (custody signal or, in the future, a status report) to `destination`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SendAdminRecord {
    pub destination: Endpoint,
    pub record: AdministrativeRecord,
}

/// Posted by the custody module on retransmit-timer expiry: re-inject
/// the already-stored bundle into the forwarding pass.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RetransmitBundle {
    pub bundle_number: BundleNumber,
}
