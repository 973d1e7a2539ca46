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

use std::collections::VecDeque;

use actix::prelude::*;
use bp6::bundle_number::BundleNumber;
use log::debug;

use crate::common::settings::Settings;

use super::{
    BloomFilter,
    messages::{CheckSeen, MarkSeen},
};

/// A duplicate-suppression filter queried by the bundle protocol agent
/// before delivering a bundle locally. Kept as a trait so tests can swap
/// in a `NullFilter` that never reports false positives, instead of
/// fighting the bloom filter's inherent probabilism.
trait RedundancyFilter: Send {
    fn contains(&self, bundle_number: BundleNumber) -> bool;
    fn insert(&mut self, bundle_number: BundleNumber);
}

/// K rotating bloom filters. Insertions go to the newest filter; once it
/// has taken `rotation_limit` insertions a fresh filter is pushed to the
/// front and the oldest is dropped once there are more than
/// `filter_count` of them. `contains` matches against the union of all
/// currently held filters, so a bundle remains "seen" until it has aged
/// out of every filter.
struct BloomRotation {
    filters: VecDeque<BloomFilter>,
    filter_size_bytes: usize,
    filter_count: usize,
    rotation_limit: u32,
}

impl BloomRotation {
    fn new(total_size_bytes: usize, filter_count: usize, rotation_limit: u32) -> Self {
        let filter_count = filter_count.max(1);
        let filter_size_bytes = (total_size_bytes / filter_count).max(1);
        let mut filters = VecDeque::with_capacity(filter_count);
        filters.push_front(BloomFilter::new(filter_size_bytes));
        BloomRotation {
            filters,
            filter_size_bytes,
            filter_count,
            rotation_limit,
        }
    }
}

impl RedundancyFilter for BloomRotation {
    fn contains(&self, bundle_number: BundleNumber) -> bool {
        self.filters.iter().any(|f| f.contains(bundle_number))
    }

    fn insert(&mut self, bundle_number: BundleNumber) {
        let active = self
            .filters
            .front_mut()
            .expect("BloomRotation always holds at least one filter");
        active.insert(bundle_number);
        if active.insertions >= self.rotation_limit {
            debug!("redundancy filter rotating after {} insertions", active.insertions);
            self.filters.push_front(BloomFilter::new(self.filter_size_bytes));
            while self.filters.len() > self.filter_count {
                self.filters.pop_back();
            }
        }
    }
}

/// Always reports "not seen" and never mutates state. Used by
/// integration tests that need deterministic duplicate-suppression
/// behaviour rather than a probabilistic bloom filter.
struct NullFilter;

impl RedundancyFilter for NullFilter {
    fn contains(&self, _bundle_number: BundleNumber) -> bool {
        false
    }

    fn insert(&mut self, _bundle_number: BundleNumber) {}
}

pub struct Daemon {
    filter: Box<dyn RedundancyFilter>,
    queue_depth: usize,
}

impl Default for Daemon {
    fn default() -> Self {
        let settings = Settings::from_env();
        Daemon {
            filter: Box::new(BloomRotation::new(
                settings.redundance_size_bytes,
                settings.redundance_filter_count,
                settings.redundance_rotation_limit,
            )),
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

impl Handler<CheckSeen> for Daemon {
    type Result = bool;

    fn handle(&mut self, msg: CheckSeen, _ctx: &mut Context<Self>) -> Self::Result {
        self.filter.contains(msg.bundle_number)
    }
}

impl Handler<MarkSeen> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: MarkSeen, _ctx: &mut Context<Self>) -> Self::Result {
        self.filter.insert(msg.bundle_number);
    }
}

#[cfg(test)]
mod tests {
    use super::{BloomRotation, NullFilter, RedundancyFilter};
    use bp6::bundle_number::BundleNumber;

    #[test]
    fn reports_seen_after_insert() {
        let mut filter = BloomRotation::new(128, 2, 100);
        let number = BundleNumber(42);
        assert!(!filter.contains(number));
        filter.insert(number);
        assert!(filter.contains(number));
    }

    #[test]
    fn rotates_out_old_entries_past_the_filter_count() {
        let mut filter = BloomRotation::new(128, 2, 2);
        let first = BundleNumber(1);
        filter.insert(first);
        assert!(filter.contains(first));
        // Fill two full rotations worth of insertions so `first`'s
        // filter is pushed out past the two-filter retention window.
        for n in 100..104 {
            filter.insert(BundleNumber(n));
        }
        assert!(!filter.contains(first));
    }

    #[test]
    fn null_filter_never_reports_seen() {
        let mut filter = NullFilter;
        let number = BundleNumber(7);
        filter.insert(number);
        assert!(!filter.contains(number));
    }
}
