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

use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub my_node_id: u32,
    pub storage_slot_count: usize,
    pub redundance_size_bytes: usize,
    pub redundance_filter_count: usize,
    pub redundance_rotation_limit: u32,
    pub custody_max_entries: usize,
    pub retransmit_interval_seconds: u64,
    pub retransmit_limit: u32,
    pub discovery_neighbour_timeout_seconds: u64,
    pub bundle_queue_depth: usize,
    pub storage_sweep_interval_seconds: u64,
    pub dtn_epoch_offset_seconds: i64,
    pub bundle_storage_path: String,
    pub hop_limit: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            my_node_id: 1,
            storage_slot_count: 20,
            redundance_size_bytes: 128,
            redundance_filter_count: 2,
            redundance_rotation_limit: 100,
            custody_max_entries: 10,
            retransmit_interval_seconds: 1000,
            retransmit_limit: 5,
            discovery_neighbour_timeout_seconds: 120,
            bundle_queue_depth: 16,
            storage_sweep_interval_seconds: 5,
            dtn_epoch_offset_seconds: 946_684_800,
            bundle_storage_path: "./storage".into(),
            hop_limit: 16,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let mut settings = Settings::default();
        if let Ok(setting) = env::var("NODE_ID") {
            settings.my_node_id = setting.parse().expect("NODE_ID must be a u32");
        }
        if let Ok(setting) = env::var("BUNDLE_STORAGE_SIZE") {
            settings.storage_slot_count =
                setting.parse().expect("BUNDLE_STORAGE_SIZE must be a usize");
        }
        if let Ok(setting) = env::var("REDUNDANCE_SIZE") {
            settings.redundance_size_bytes =
                setting.parse().expect("REDUNDANCE_SIZE must be a usize");
        }
        if let Ok(setting) = env::var("REDUNDANCE_NUMBER") {
            settings.redundance_filter_count =
                setting.parse().expect("REDUNDANCE_NUMBER must be a usize");
        }
        if let Ok(setting) = env::var("REDUNDANCE_LIMIT") {
            settings.redundance_rotation_limit =
                setting.parse().expect("REDUNDANCE_LIMIT must be a u32");
        }
        if let Ok(setting) = env::var("CUSTODY_MAX_ENTRIES") {
            settings.custody_max_entries =
                setting.parse().expect("CUSTODY_MAX_ENTRIES must be a usize");
        }
        if let Ok(setting) = env::var("RETRANSMIT_INTERVAL_SECONDS") {
            settings.retransmit_interval_seconds = setting
                .parse()
                .expect("RETRANSMIT_INTERVAL_SECONDS must be a u64");
        }
        if let Ok(setting) = env::var("RETRANSMIT_LIMIT") {
            settings.retransmit_limit = setting.parse().expect("RETRANSMIT_LIMIT must be a u32");
        }
        if let Ok(setting) = env::var("DISCOVERY_NEIGHBOUR_TIMEOUT_SECONDS") {
            settings.discovery_neighbour_timeout_seconds = setting
                .parse()
                .expect("DISCOVERY_NEIGHBOUR_TIMEOUT_SECONDS must be a u64");
        }
        if let Ok(setting) = env::var("BUNDLE_QUEUE_DEPTH") {
            settings.bundle_queue_depth =
                setting.parse().expect("BUNDLE_QUEUE_DEPTH must be a usize");
        }
        if let Ok(setting) = env::var("STORAGE_SWEEP_INTERVAL_SECONDS") {
            settings.storage_sweep_interval_seconds = setting
                .parse()
                .expect("STORAGE_SWEEP_INTERVAL_SECONDS must be a u64");
        }
        if let Ok(setting) = env::var("DTN_EPOCH_OFFSET_SECONDS") {
            settings.dtn_epoch_offset_seconds = setting
                .parse()
                .expect("DTN_EPOCH_OFFSET_SECONDS must be a i64");
        }
        if let Ok(setting) = env::var("BUNDLE_STORAGE_PATH") {
            settings.bundle_storage_path = setting;
        }
        if let Ok(setting) = env::var("HOP_LIMIT") {
            settings.hop_limit = setting.parse().expect("HOP_LIMIT must be a u8");
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn defaults_match_the_reference_node() {
        let settings = Settings::default();
        assert_eq!(settings.storage_slot_count, 20);
        assert_eq!(settings.redundance_filter_count, 2);
        assert_eq!(settings.redundance_size_bytes, 128);
        assert_eq!(settings.dtn_epoch_offset_seconds, 946_684_800);
    }
}
