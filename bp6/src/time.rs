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

//! `creation_timestamp` is an opaque u32 count of seconds since the DTN
//! epoch (§9 Open Question 4). The crate does not hardcode which wall-clock
//! instant that is; `dtrd::common::settings::Settings::dtn_epoch_offset_seconds`
//! supplies the offset when a real bundle needs to be created.

use std::fmt::Debug;

use chrono::{DateTime, TimeZone, Utc};

/// Reference instant in the absence of an externally configured epoch:
/// 2000-01-01T00:00:00Z, matching the reference implementation.
pub const DEFAULT_EPOCH_OFFSET_SECONDS: i64 = 946_684_800;

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
pub struct DtnTime(pub u32);

impl Debug for DtnTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DtnTime({})", self.0)
    }
}

impl DtnTime {
    /// `now()` under the default (unconfigured) epoch offset. Callers that
    /// honor `Settings::dtn_epoch_offset_seconds` should use
    /// [`DtnTime::now_with_offset`] instead.
    pub fn now() -> Self {
        Self::now_with_offset(DEFAULT_EPOCH_OFFSET_SECONDS)
    }

    pub fn now_with_offset(epoch_offset_seconds: i64) -> Self {
        Self::from_unix_seconds(Utc::now().timestamp(), epoch_offset_seconds)
    }

    pub fn from_unix_seconds(unix_seconds: i64, epoch_offset_seconds: i64) -> Self {
        let dtn_seconds = unix_seconds.saturating_sub(epoch_offset_seconds);
        DtnTime(dtn_seconds.clamp(0, i64::from(u32::MAX)) as u32)
    }

    pub fn to_datetime(self, epoch_offset_seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(i64::from(self.0) + epoch_offset_seconds, 0)
            .single()
            .expect("DtnTime + epoch offset is in range for a valid DateTime")
    }
}

#[cfg(test)]
mod tests {
    use super::DtnTime;

    #[test]
    fn roundtrips_through_unix_seconds() {
        let epoch = super::DEFAULT_EPOCH_OFFSET_SECONDS;
        let dtn = DtnTime::from_unix_seconds(epoch + 1_000, epoch);
        assert_eq!(dtn.0, 1_000);
        let back = dtn.to_datetime(epoch);
        assert_eq!(back.timestamp(), epoch + 1_000);
    }

    #[test]
    fn clamps_times_before_the_epoch_to_zero() {
        let epoch = super::DEFAULT_EPOCH_OFFSET_SECONDS;
        let dtn = DtnTime::from_unix_seconds(epoch - 500, epoch);
        assert_eq!(dtn.0, 0);
    }
}
