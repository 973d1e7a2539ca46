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

use std::collections::{HashMap, HashSet};

use actix::prelude::*;
use bp6::{
    administrative_record::{
        AdministrativeRecord,
        bundle_status_report::{BundleStatusFlags, BundleStatusReason, BundleStatusReport},
    },
    block::hop_count_block::HopCountBlock,
    bundle::Bundle,
    bundle_number::BundleNumber,
    bundleflags::ProcessingFlags,
    endpoint::Endpoint,
    primaryblock::PrimaryBlock,
    time::DtnTime,
};
use log::{debug, info, warn};

use crate::{
    bundlestorageagent::{
        BundleHandle,
        agent::Daemon as StorageDaemon,
        messages::{
            DeleteIfNotUnderCustody, EventBundleDepleted, EventBundleExpired, ListBundles,
            ReadBundle, SaveBundle, SetUnderCustody,
        },
    },
    common::settings::Settings,
    custodyagent::{agent::Daemon as CustodyDaemon, messages::TakeCustody},
    redundancyagent::{
        agent::Daemon as RedundancyDaemon,
        messages::{CheckSeen, MarkSeen},
    },
};

use super::{
    Registration,
    messages::{
        ApplicationRegister, ApplicationRemove, ApplicationStatus, BundleSendResult,
        EventBundleInStorage, EventNeighborDown, EventNeighborUp, ProcessingFinished,
        ReceiveBundle, RegisterNetworkSink, RetransmitBundle, SendAdminRecord, SendBundle,
        SubmitDataToApplication, TransmitBundle, TransmitResult,
    },
};

const ADMIN_RECORD_LIFETIME_SECONDS: u32 = 3600;

pub struct Daemon {
    endpoint: Endpoint,
    epoch_offset_seconds: i64,
    hop_limit: u8,
    queue_depth: usize,
    registrations: HashMap<u32, Registration>,
    neighbors: HashSet<u32>,
    network_sink: Option<Recipient<TransmitBundle>>,
    sent_to: HashSet<(BundleNumber, u32)>,
    admin_sequence: u32,
}

impl Default for Daemon {
    fn default() -> Self {
        let settings = Settings::from_env();
        Daemon {
            endpoint: Endpoint::new(settings.my_node_id, 0),
            epoch_offset_seconds: settings.dtn_epoch_offset_seconds,
            hop_limit: settings.hop_limit,
            queue_depth: settings.bundle_queue_depth,
            registrations: HashMap::new(),
            neighbors: HashSet::new(),
            network_sink: None,
            sent_to: HashSet::new(),
            admin_sequence: 0,
        }
    }
}

impl Actor for Daemon {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        ctx.set_mailbox_capacity(self.queue_depth);
    }
}

impl actix::Supervised for Daemon {}
impl SystemService for Daemon {}

impl Handler<ApplicationRegister> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ApplicationRegister, _ctx: &mut Context<Self>) -> Self::Result {
        debug!("registering application on service {}", msg.service_id);
        self.registrations.insert(
            msg.service_id,
            Registration {
                queue: msg.queue,
                active: msg.active,
            },
        );
    }
}

impl Handler<ApplicationRemove> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ApplicationRemove, _ctx: &mut Context<Self>) -> Self::Result {
        self.registrations.remove(&msg.service_id);
    }
}

impl Handler<ApplicationStatus> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ApplicationStatus, _ctx: &mut Context<Self>) -> Self::Result {
        if let Some(reg) = self.registrations.get_mut(&msg.service_id) {
            reg.active = msg.active;
        }
    }
}

impl Handler<RegisterNetworkSink> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: RegisterNetworkSink, _ctx: &mut Context<Self>) -> Self::Result {
        self.network_sink = Some(msg.sink);
    }
}

impl Handler<ReceiveBundle> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ReceiveBundle, ctx: &mut Context<Self>) -> Self::Result {
        self.dispatch(msg.handle, None, ctx);
    }
}

impl Handler<SendBundle> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: SendBundle, ctx: &mut Context<Self>) -> Self::Result {
        let now = DtnTime::now_with_offset(self.epoch_offset_seconds).0;
        let pb = &msg.handle.bundle.primary_block;
        let elapsed = now.saturating_sub(pb.creation_timestamp.0);
        let adjusted_lifetime = pb.lifetime.saturating_sub(elapsed);
        let handle = if adjusted_lifetime == pb.lifetime {
            msg.handle
        } else {
            let mut bundle = (*msg.handle.bundle).clone();
            bundle.primary_block.lifetime = adjusted_lifetime;
            BundleHandle::new(bundle)
        };
        self.dispatch(handle, msg.responder, ctx);
    }
}

impl Handler<ProcessingFinished> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ProcessingFinished, _ctx: &mut Context<Self>) -> Self::Result {
        debug!("application finished processing bundle {}", msg.bundle_number);
        StorageDaemon::from_registry().do_send(DeleteIfNotUnderCustody {
            bundle_number: msg.bundle_number,
        });
    }
}

impl Handler<EventBundleInStorage> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: EventBundleInStorage, ctx: &mut Context<Self>) -> Self::Result {
        self.forwarding_pass(Some(msg.bundle_number), ctx);
    }
}

impl Handler<EventBundleExpired> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: EventBundleExpired, ctx: &mut Context<Self>) -> Self::Result {
        let bundle_number = msg.handle.bundle_number();
        let pb = msg.handle.bundle.primary_block.clone();
        self.maybe_emit_deletion_report(&pb, BundleStatusReason::LifetimeExpired, ctx);
        debug!("bundle {bundle_number} evicted after lifetime expiry");
    }
}

impl Handler<EventBundleDepleted> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: EventBundleDepleted, ctx: &mut Context<Self>) -> Self::Result {
        let bundle_number = msg.handle.bundle_number();
        let pb = msg.handle.bundle.primary_block.clone();
        self.maybe_emit_deletion_report(&pb, BundleStatusReason::DepletedStorage, ctx);
        debug!("bundle {bundle_number} evicted to make room under storage pressure");
    }
}

impl Handler<EventNeighborUp> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: EventNeighborUp, ctx: &mut Context<Self>) -> Self::Result {
        if self.neighbors.insert(msg.node_id) {
            info!("neighbor {} is now reachable", msg.node_id);
        }
        self.forwarding_pass(None, ctx);
    }
}

impl Handler<EventNeighborDown> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: EventNeighborDown, _ctx: &mut Context<Self>) -> Self::Result {
        self.neighbors.remove(&msg.node_id);
        self.sent_to.retain(|(_, node_id)| *node_id != msg.node_id);
    }
}

impl Handler<TransmitResult> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: TransmitResult, ctx: &mut Context<Self>) -> Self::Result {
        if msg.success {
            debug!(
                "bundle {} delivered to neighbor {}",
                msg.bundle_number, msg.neighbor.node_id
            );
            self.sent_to.insert((msg.bundle_number, msg.neighbor.node_id));
        } else {
            warn!(
                "sending bundle {} to neighbor {} failed, will retry on next pass",
                msg.bundle_number, msg.neighbor.node_id
            );
            self.sent_to.remove(&(msg.bundle_number, msg.neighbor.node_id));
            self.forwarding_pass(Some(msg.bundle_number), ctx);
        }
    }
}

impl Handler<SendAdminRecord> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: SendAdminRecord, ctx: &mut Context<Self>) -> Self::Result {
        let bundle = self.build_admin_bundle(msg.destination, &msg.record);
        self.dispatch(BundleHandle::new(bundle), None, ctx);
    }
}

impl Handler<RetransmitBundle> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: RetransmitBundle, ctx: &mut Context<Self>) -> Self::Result {
        self.sent_to.retain(|(bn, _)| *bn != msg.bundle_number);
        self.forwarding_pass(Some(msg.bundle_number), ctx);
    }
}

impl Daemon {
    /// The dispatch algorithm of §4.5: admin record, else local delivery,
    /// else forwarding (with an optional custody bid first).
    fn dispatch(
        &mut self,
        handle: BundleHandle,
        responder: Option<Recipient<BundleSendResult>>,
        ctx: &mut Context<Self>,
    ) {
        let pb = handle.bundle.primary_block.clone();
        if pb.processing_flags.contains(ProcessingFlags::ADMINISTRATIVE_RECORD)
            && pb.destination.matches_node(&self.endpoint)
        {
            self.dispatch_admin_record(&handle);
            return;
        }
        if pb.destination.matches_node(&self.endpoint) {
            self.dispatch_local_delivery(handle, ctx);
            return;
        }
        self.dispatch_forward(handle, responder, ctx);
    }

    /// Wraps an administrative record (custody signal or status report)
    /// in a bundle addressed to `destination`, sourced from this node.
    fn build_admin_bundle(&mut self, destination: Endpoint, record: &AdministrativeRecord) -> Bundle {
        self.admin_sequence += 1;
        let now = DtnTime::now_with_offset(self.epoch_offset_seconds);
        let payload = record.encode();
        Bundle {
            primary_block: PrimaryBlock {
                processing_flags: ProcessingFlags::ADMINISTRATIVE_RECORD,
                destination,
                source: self.endpoint,
                report_to: Endpoint::null(),
                custodian: Endpoint::null(),
                creation_timestamp: now,
                creation_sequence: self.admin_sequence,
                lifetime: ADMIN_RECORD_LIFETIME_SECONDS,
                fragment: None,
            },
            blocks: vec![bp6::block::CanonicalBlock {
                block: bp6::block::Block::Payload(bp6::block::payload_block::PayloadBlock {
                    data: payload,
                }),
                block_flags: bp6::blockflags::BlockFlags::LAST_BLOCK,
            }],
        }
    }

    fn dispatch_admin_record(&mut self, handle: &BundleHandle) {
        match AdministrativeRecord::decode(&handle.bundle.payload_block().data) {
            Ok(AdministrativeRecord::CustodySignal(signal)) => {
                CustodyDaemon::from_registry()
                    .do_send(crate::custodyagent::messages::HandleCustodySignal { signal });
            }
            Ok(AdministrativeRecord::StatusReport(report)) => {
                info!("received bundle status report: {report:?}");
            }
            Err(e) => {
                warn!("dropping malformed administrative record: {e:?}");
            }
        }
    }

    fn dispatch_local_delivery(&mut self, handle: BundleHandle, ctx: &mut Context<Self>) {
        let destination = handle.bundle.primary_block.destination;
        let queues: Vec<Recipient<SubmitDataToApplication>> = self
            .registrations
            .iter()
            .filter(|(service_id, reg)| **service_id == destination.service_id && reg.active)
            .map(|(_, reg)| reg.queue.clone())
            .collect();
        if queues.is_empty() {
            debug!("no active registration for service {}, dropping", destination.service_id);
            return;
        }
        let bundle_number = handle.bundle_number();
        let fut = RedundancyDaemon::from_registry().send(CheckSeen { bundle_number });
        ctx.spawn(fut.into_actor(self).map(move |res, _act, _ctx| {
            if matches!(res, Ok(true)) {
                debug!("bundle {bundle_number} already delivered, dropping duplicate");
                return;
            }
            for queue in &queues {
                queue.do_send(SubmitDataToApplication {
                    handle: handle.clone(),
                });
            }
            RedundancyDaemon::from_registry().do_send(MarkSeen { bundle_number });
        }));
    }

    fn dispatch_forward(
        &mut self,
        handle: BundleHandle,
        responder: Option<Recipient<BundleSendResult>>,
        ctx: &mut Context<Self>,
    ) {
        let current_hop_count = handle.bundle.hop_count().unwrap_or(HopCountBlock {
            limit: self.hop_limit,
            count: 0,
        });
        if !current_hop_count.can_increment() {
            let pb = handle.bundle.primary_block.clone();
            warn!(
                "bundle {} dropped: hop limit {} exceeded",
                handle.bundle_number(),
                current_hop_count.limit
            );
            self.maybe_emit_deletion_report(&pb, BundleStatusReason::HopLimitExceeded, ctx);
            if let Some(responder) = responder {
                responder.do_send(BundleSendResult(Err(())));
            }
            return;
        }
        let handle = BundleHandle::new(
            handle
                .bundle
                .with_hop_count(current_hop_count.incremented()),
        );

        let pb = &handle.bundle.primary_block;
        let wants_custody = pb.processing_flags.contains(ProcessingFlags::CUSTODY_REQUESTED);
        let source_is_self = pb.source.matches_node(&self.endpoint);
        let custodian_is_self = pb.custodian.matches_node(&self.endpoint);
        let previous_custodian = pb.custodian;

        if wants_custody && (!source_is_self || custodian_is_self) {
            let fut = CustodyDaemon::from_registry().send(TakeCustody {
                handle: handle.clone(),
                previous_custodian,
            });
            ctx.spawn(fut.into_actor(self).map(move |res, act, ctx| {
                let accepted = matches!(res, Ok(Ok(())));
                let final_handle = if accepted {
                    act.rewrite_custodian(&handle)
                } else {
                    handle
                };
                act.save_and_notify(final_handle, accepted, responder, ctx);
            }));
        } else {
            self.save_and_notify(handle, false, responder, ctx);
        }
    }

    /// Emits a bundle status report with `DELETED` flags to `report_to`
    /// when the bundle requested one, the node is not the source, and a
    /// report destination is known. Shared by lifetime expiry and
    /// hop-limit enforcement (§4.5 failure semantics / hop-limit supplement).
    fn maybe_emit_deletion_report(
        &mut self,
        pb: &PrimaryBlock,
        reason: BundleStatusReason,
        ctx: &mut Context<Self>,
    ) {
        let wants_report = pb.processing_flags.contains(ProcessingFlags::DELETION_STATUS_REQUESTED);
        if wants_report && !pb.source.matches_node(&self.endpoint) && !pb.report_to.is_null() {
            let report = AdministrativeRecord::StatusReport(BundleStatusReport {
                flags: BundleStatusFlags::DELETED,
                reason,
                source: pb.source,
                creation_timestamp: pb.creation_timestamp.0,
                creation_sequence: pb.creation_sequence,
                fragment_offset: pb.fragment_offset(),
            });
            let bundle = self.build_admin_bundle(pb.report_to, &report);
            self.dispatch(BundleHandle::new(bundle), None, ctx);
        }
    }

    fn rewrite_custodian(&self, handle: &BundleHandle) -> BundleHandle {
        let mut bundle = (*handle.bundle).clone();
        bundle.primary_block.custodian = self.endpoint;
        BundleHandle::new(bundle)
    }

    /// Saves a forwarded/bid-for bundle, then (when `under_custody` is set
    /// by a successful custody bid) re-marks the freshly created slot as
    /// custody-held. `TakeCustody` flips the flag before the slot exists,
    /// so `SetUnderCustody` would otherwise race ahead of `SaveBundle` and
    /// find nothing to mark — this re-issues it once the slot is real.
    fn save_and_notify(
        &mut self,
        handle: BundleHandle,
        under_custody: bool,
        responder: Option<Recipient<BundleSendResult>>,
        ctx: &mut Context<Self>,
    ) {
        let fut = StorageDaemon::from_registry().send(SaveBundle { handle });
        ctx.spawn(fut.into_actor(self).map(move |res, _act, _ctx| {
            let result = match res {
                Ok(Ok(bundle_number)) => {
                    if under_custody {
                        StorageDaemon::from_registry().do_send(SetUnderCustody {
                            bundle_number,
                            under_custody: true,
                        });
                    }
                    Ok(bundle_number)
                }
                Ok(Err(e)) => {
                    warn!("storage rejected forwarded bundle: {e:?}");
                    Err(())
                }
                Err(_) => Err(()),
            };
            if let Some(responder) = responder {
                responder.do_send(BundleSendResult(result));
            }
        }));
    }

    /// Iterates storage for bundles whose destination is a currently known
    /// neighbor (or a broadcast destination) and hands their bytes to the
    /// network sink. `only`, when set, restricts the pass to one bundle
    /// (the `bundle_in_storage` case); `None` re-evaluates the whole store
    /// (the `beacon`/`peer_alive` case).
    fn forwarding_pass(&mut self, only: Option<BundleNumber>, ctx: &mut Context<Self>) {
        let Some(sink) = self.network_sink.clone() else {
            return;
        };
        let neighbors = self.neighbors.clone();
        let sent_to = self.sent_to.clone();
        let fut = StorageDaemon::from_registry().send(ListBundles {});
        ctx.spawn(fut.into_actor(self).map(move |res, act, ctx| {
            let Ok(list) = res else { return };
            for bundle_number in list {
                if only.is_some_and(|o| o != bundle_number) {
                    continue;
                }
                act.maybe_forward_one(bundle_number, &neighbors, &sent_to, &sink, ctx);
            }
        }));
    }

    fn maybe_forward_one(
        &mut self,
        bundle_number: BundleNumber,
        neighbors: &HashSet<u32>,
        sent_to: &HashSet<(BundleNumber, u32)>,
        sink: &Recipient<TransmitBundle>,
        ctx: &mut Context<Self>,
    ) {
        let sink = sink.clone();
        let fut = StorageDaemon::from_registry().send(ReadBundle { bundle_number });
        let neighbors = neighbors.clone();
        let already_sent: HashSet<u32> = sent_to
            .iter()
            .filter(|(bn, _)| *bn == bundle_number)
            .map(|(_, n)| *n)
            .collect();
        ctx.spawn(fut.into_actor(self).map(move |res, _act, _ctx| {
            let Ok(Some(handle)) = res else { return };
            let destination_node = handle.bundle.primary_block.destination.node_id;
            let targets: Vec<u32> = if destination_node == 0 {
                neighbors.iter().copied().filter(|n| !already_sent.contains(n)).collect()
            } else if neighbors.contains(&destination_node) && !already_sent.contains(&destination_node) {
                vec![destination_node]
            } else {
                Vec::new()
            };
            if targets.is_empty() {
                return;
            }
            let bytes = handle.bundle.encode();
            for node_id in targets {
                sink.do_send(TransmitBundle {
                    neighbor: Endpoint::new(node_id, 0),
                    bundle_number,
                    bytes: bytes.clone(),
                });
            }
        }));
    }
}
