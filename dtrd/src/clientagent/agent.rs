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
use bp6::{
    block::{Block, CanonicalBlock, payload_block::PayloadBlock},
    blockflags::BlockFlags,
    bundle::Bundle,
    bundleflags::ProcessingFlags,
    endpoint::Endpoint,
    primaryblock::PrimaryBlock,
    time::DtnTime,
};
use log::debug;

use crate::{
    bundleprotocolagent::{
        agent::Daemon as BpaDaemon,
        messages::{ApplicationRegister, ApplicationRemove, ApplicationStatus, ProcessingFinished, SendBundle},
    },
    bundlestorageagent::BundleHandle,
    common::settings::Settings,
};

use super::messages::{
    ClientProcessingFinished, ClientRegisterApplication, ClientRemoveApplication, ClientSendBundle,
    ClientSetApplicationStatus,
};

/// `create_bundle()`: builds the primary block for a local send, then hands
/// the assembled bundle to the bundle agent as a single-payload-block
/// bundle. Source and report-to are always this node's endpoint.
pub struct Daemon {
    endpoint: Endpoint,
    epoch_offset_seconds: i64,
    creation_sequence: u32,
    queue_depth: usize,
}

impl Default for Daemon {
    fn default() -> Self {
        let settings = Settings::from_env();
        Daemon {
            endpoint: Endpoint::new(settings.my_node_id, 0),
            epoch_offset_seconds: settings.dtn_epoch_offset_seconds,
            creation_sequence: 0,
            queue_depth: settings.bundle_queue_depth,
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

impl Handler<ClientRegisterApplication> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ClientRegisterApplication, _ctx: &mut Context<Self>) -> Self::Result {
        BpaDaemon::from_registry().do_send(ApplicationRegister {
            service_id: msg.service_id,
            queue: msg.queue,
            active: msg.active,
        });
    }
}

impl Handler<ClientRemoveApplication> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ClientRemoveApplication, _ctx: &mut Context<Self>) -> Self::Result {
        BpaDaemon::from_registry().do_send(ApplicationRemove {
            service_id: msg.service_id,
        });
    }
}

impl Handler<ClientSetApplicationStatus> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ClientSetApplicationStatus, _ctx: &mut Context<Self>) -> Self::Result {
        BpaDaemon::from_registry().do_send(ApplicationStatus {
            service_id: msg.service_id,
            active: msg.active,
        });
    }
}

impl Handler<ClientSendBundle> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ClientSendBundle, _ctx: &mut Context<Self>) -> Self::Result {
        self.creation_sequence += 1;
        let mut processing_flags = ProcessingFlags::empty();
        if msg.request_custody {
            processing_flags |= ProcessingFlags::CUSTODY_REQUESTED;
        }
        if msg.request_reports {
            processing_flags |= ProcessingFlags::RECEPTION_STATUS_REQUESTED
                | ProcessingFlags::DELIVERY_STATUS_REQUESTED;
        }
        let report_to = if msg.request_reports { self.endpoint } else { Endpoint::null() };
        let bundle = Bundle {
            primary_block: PrimaryBlock {
                processing_flags,
                destination: msg.destination,
                source: self.endpoint,
                report_to,
                custodian: self.endpoint,
                creation_timestamp: DtnTime::now_with_offset(self.epoch_offset_seconds),
                creation_sequence: self.creation_sequence,
                lifetime: msg.lifetime,
                fragment: None,
            },
            blocks: vec![CanonicalBlock {
                block: Block::Payload(PayloadBlock { data: msg.payload }),
                block_flags: BlockFlags::LAST_BLOCK,
            }],
        };
        let handle = BundleHandle::new(bundle);
        debug!("application created bundle {}", handle.bundle_number());
        BpaDaemon::from_registry().do_send(SendBundle {
            handle,
            responder: msg.responder,
        });
    }
}

impl Handler<ClientProcessingFinished> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ClientProcessingFinished, _ctx: &mut Context<Self>) -> Self::Result {
        BpaDaemon::from_registry().do_send(ProcessingFinished {
            bundle_number: msg.bundle_number,
        });
    }
}
