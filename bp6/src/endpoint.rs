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

use std::fmt::Display;

/// A receiver identity: a node plus a service running on that node.
///
/// This profile never encodes a dictionary; endpoint IDs are the two
/// numeric fields directly, so `dictionary_length` on the wire is
/// always 0.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
pub struct Endpoint {
    pub node_id: u32,
    pub service_id: u32,
}

impl Endpoint {
    pub fn new(node_id: u32, service_id: u32) -> Self {
        Endpoint {
            node_id,
            service_id,
        }
    }

    /// The null endpoint, used as `report_to` when no report is
    /// desired and as a destination that never matches a real service.
    pub fn null() -> Self {
        Endpoint {
            node_id: 0,
            service_id: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.node_id == 0
    }

    pub fn matches_node(&self, other: &Endpoint) -> bool {
        self.node_id == other.node_id
    }

    /// The node-level endpoint for this endpoint, i.e. with service 0.
    pub fn get_node_endpoint(&self) -> Endpoint {
        Endpoint {
            node_id: self.node_id,
            service_id: 0,
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("ipn:{}.{}", self.node_id, self.service_id))
    }
}

#[cfg(test)]
mod tests {
    use super::Endpoint;

    #[test]
    fn node_endpoint_drops_service() {
        let e = Endpoint::new(7, 42);
        assert_eq!(e.get_node_endpoint(), Endpoint::new(7, 0));
    }

    #[test]
    fn matches_node_ignores_service() {
        assert!(Endpoint::new(7, 1).matches_node(&Endpoint::new(7, 99)));
        assert!(!Endpoint::new(7, 1).matches_node(&Endpoint::new(8, 1)));
    }
}
