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

use std::time::Duration;

use actix::prelude::*;
use bp6::time::DtnTime;
use log::{debug, info};

use crate::{
    bundleprotocolagent::{
        agent::Daemon as BpaDaemon,
        messages::{EventNeighborDown, EventNeighborUp},
    },
    common::settings::Settings,
};

use super::{
    NeighborEntry,
    messages::{Beacon, ListNeighbors, PeerAlive},
};

struct SweepNeighbors {}

impl Message for SweepNeighbors {
    type Result = ();
}

pub struct Daemon {
    neighbors: Vec<NeighborEntry>,
    epoch_offset_seconds: i64,
    timeout_seconds: u32,
    queue_depth: usize,
}

impl Default for Daemon {
    fn default() -> Self {
        let settings = Settings::from_env();
        Daemon {
            neighbors: Vec::new(),
            epoch_offset_seconds: settings.dtn_epoch_offset_seconds,
            timeout_seconds: settings.discovery_neighbour_timeout_seconds as u32,
            queue_depth: settings.bundle_queue_depth,
        }
    }
}

impl Actor for Daemon {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(self.queue_depth);
        ctx.run_interval(Duration::from_secs(30), |_, ctx| {
            ctx.notify(SweepNeighbors {});
        });
    }
}

impl actix::Supervised for Daemon {}
impl SystemService for Daemon {}

impl Daemon {
    fn now(&self) -> u32 {
        DtnTime::now_with_offset(self.epoch_offset_seconds).0
    }

    fn touch(&mut self, node_id: u32, now: u32) -> bool {
        if let Some(entry) = self.neighbors.iter_mut().find(|n| n.node_id == node_id) {
            entry.last_seen = now;
            let became_active = !entry.active;
            entry.active = true;
            became_active
        } else {
            self.neighbors.push(NeighborEntry {
                node_id,
                last_seen: now,
                active: true,
            });
            true
        }
    }
}

impl Handler<Beacon> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: Beacon, _ctx: &mut Context<Self>) -> Self::Result {
        let now = self.now();
        let became_active = self.touch(msg.node_id, now);
        if became_active {
            info!("neighbor {} discovered", msg.node_id);
            BpaDaemon::from_registry().do_send(EventNeighborUp { node_id: msg.node_id });
        }
    }
}

impl Handler<PeerAlive> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: PeerAlive, _ctx: &mut Context<Self>) -> Self::Result {
        let now = self.now();
        let became_active = self.touch(msg.node_id, now);
        if became_active {
            info!("neighbor {} reconfirmed alive", msg.node_id);
            BpaDaemon::from_registry().do_send(EventNeighborUp { node_id: msg.node_id });
        }
    }
}

impl Handler<ListNeighbors> for Daemon {
    type Result = Vec<NeighborEntry>;

    fn handle(&mut self, _msg: ListNeighbors, _ctx: &mut Context<Self>) -> Self::Result {
        self.neighbors.clone()
    }
}

impl Handler<SweepNeighbors> for Daemon {
    type Result = ();

    fn handle(&mut self, _msg: SweepNeighbors, _ctx: &mut Context<Self>) -> Self::Result {
        let now = self.now();
        for entry in self.neighbors.iter_mut().filter(|n| n.active) {
            if now.saturating_sub(entry.last_seen) > self.timeout_seconds {
                debug!("neighbor {} timed out, marking inactive", entry.node_id);
                entry.active = false;
                BpaDaemon::from_registry().do_send(EventNeighborDown { node_id: entry.node_id });
            }
        }
        self.neighbors.retain(|n| n.active || now.saturating_sub(n.last_seen) < self.timeout_seconds * 4);
    }
}
