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

use bitflags::bitflags;

bitflags! {
    /// Bundle Processing Control Flags, RFC 5050 §4.2.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ProcessingFlags: u32 {
        const FRAGMENT = 0x0000_0001;
        const ADMINISTRATIVE_RECORD = 0x0000_0002;
        const MUST_NOT_FRAGMENT = 0x0000_0004;
        const CUSTODY_REQUESTED = 0x0000_0008;
        const DESTINATION_IS_SINGLETON = 0x0000_0010;
        const APPLICATION_ACKNOWLEDGEMENT_REQUESTED = 0x0000_0020;
        /// Low bit of the two-bit priority field.
        const PRIORITY_NORMAL = 0x0000_0080;
        /// High bit of the two-bit priority field.
        const PRIORITY_EXPEDITED = 0x0000_0100;
        const RECEPTION_STATUS_REQUESTED = 0x0000_4000;
        const CUSTODY_ACCEPTANCE_STATUS_REQUESTED = 0x0001_0000;
        const FORWARDING_STATUS_REQUESTED = 0x0002_0000;
        const DELIVERY_STATUS_REQUESTED = 0x0004_0000;
        const DELETION_STATUS_REQUESTED = 0x0008_0000;
    }
}

/// The two-bit priority field RFC 5050 packs into `PRIORITY_NORMAL` /
/// `PRIORITY_EXPEDITED`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum Priority {
    Bulk,
    Normal,
    Expedited,
}

impl ProcessingFlags {
    pub fn priority(self) -> Priority {
        match (
            self.contains(ProcessingFlags::PRIORITY_EXPEDITED),
            self.contains(ProcessingFlags::PRIORITY_NORMAL),
        ) {
            (true, _) => Priority::Expedited,
            (false, true) => Priority::Normal,
            (false, false) => Priority::Bulk,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.remove(ProcessingFlags::PRIORITY_NORMAL | ProcessingFlags::PRIORITY_EXPEDITED);
        match priority {
            Priority::Bulk => {}
            Priority::Normal => self.insert(ProcessingFlags::PRIORITY_NORMAL),
            Priority::Expedited => self.insert(ProcessingFlags::PRIORITY_EXPEDITED),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, ProcessingFlags};

    #[test]
    fn priority_defaults_to_bulk() {
        assert_eq!(ProcessingFlags::empty().priority(), Priority::Bulk);
    }

    #[test]
    fn priority_roundtrips_through_flags() {
        for priority in [Priority::Bulk, Priority::Normal, Priority::Expedited] {
            let flags = ProcessingFlags::empty().with_priority(priority);
            assert_eq!(flags.priority(), priority);
        }
    }
}
