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

use std::sync::Arc;

use bp6::bundle::Bundle;
use bp6::bundle_number::BundleNumber;

pub mod agent;
pub mod messages;

/// An owning reference to a bundle's in-memory representation, keyed by
/// its content-addressed number. Cheap to clone; the `Arc` is the only
/// owner of the decoded bundle, matching §3's single-owner handle rule.
#[derive(Debug, Clone)]
pub struct BundleHandle {
    pub bundle: Arc<Bundle>,
}

impl BundleHandle {
    pub fn new(bundle: Bundle) -> Self {
        BundleHandle {
            bundle: Arc::new(bundle),
        }
    }

    pub fn bundle_number(&self) -> BundleNumber {
        self.bundle.bundle_number()
    }
}

/// The persisted index record for one stored bundle: bundle_number,
/// creation time (monotonic for eviction), remaining lifetime, on-disk
/// size. Fixed-width, little-endian, exactly as laid out in §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageSlotRecord {
    pub bundle_number: u32,
    pub record_time: u32,
    pub lifetime: u32,
    pub size: u16,
}

pub const STORAGE_SLOT_RECORD_LEN: usize = 4 + 4 + 4 + 2;

impl StorageSlotRecord {
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bundle_number.to_le_bytes());
        out.extend_from_slice(&self.record_time.to_le_bytes());
        out.extend_from_slice(&self.lifetime.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes());
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() != STORAGE_SLOT_RECORD_LEN {
            return None;
        }
        Some(StorageSlotRecord {
            bundle_number: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            record_time: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            lifetime: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            size: u16::from_le_bytes(buf[12..14].try_into().unwrap()),
        })
    }
}

#[derive(Debug)]
pub enum StorageError {
    /// The store is full and no slot could be evicted to make room.
    Full,
    /// The index file could not be parsed; the store was cold-booted
    /// to an empty state.
    IndexCorrupt,
    Io(std::io::Error),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::{STORAGE_SLOT_RECORD_LEN, StorageSlotRecord};

    #[test]
    fn round_trips_through_bytes() {
        let record = StorageSlotRecord {
            bundle_number: 0xdead_beef,
            record_time: 1000,
            lifetime: 3600,
            size: 512,
        };
        let mut buf = Vec::new();
        record.encode(&mut buf);
        assert_eq!(buf.len(), STORAGE_SLOT_RECORD_LEN);
        assert_eq!(StorageSlotRecord::decode(&buf), Some(record));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert_eq!(StorageSlotRecord::decode(&[0u8; 5]), None);
    }
}
