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

//! Neighbor bookkeeping (§3's `NeighborEntry`, §6's discovery beacon
//! events). Discovery itself is out of scope: this module only consumes
//! `beacon`/`peer_alive` events reported by an opaque discovery
//! collaborator and turns them into `EventNeighborUp`/`EventNeighborDown`
//! for the bundle agent, plus a timeout sweep for stale entries.

pub mod agent;
pub mod messages;

/// `(node_id, last_seen_timestamp, active)` of §3, bounded to the
/// neighbors currently known about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborEntry {
    pub node_id: u32,
    pub last_seen: u32,
    pub active: bool,
}
