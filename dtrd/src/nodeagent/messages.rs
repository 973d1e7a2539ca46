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

use super::NeighborEntry;

/// `beacon(neighbor_id)`: discovery reports a peer responding for the
/// first time. Always re-evaluates the forwarding store.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Beacon {
    pub node_id: u32,
}

/// `peer_alive(neighbor_id)`: traffic confirms an already-known peer is
/// still reachable. Refreshes `last_seen` without forcing a forwarding
/// pass for an already-active neighbor.
#[derive(Message)]
#[rtype(result = "()")]
pub struct PeerAlive {
    pub node_id: u32,
}

/// Introspection, used by tests and future operator tooling.
#[derive(Message)]
#[rtype(result = "Vec<NeighborEntry>")]
pub struct ListNeighbors {}
