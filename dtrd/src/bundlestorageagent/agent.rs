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

use std::{
    fs, io,
    path::PathBuf,
    time::Duration,
};

use actix::prelude::*;
use bp6::{bundle::Bundle, bundle_number::BundleNumber, bundleflags::Priority, time::DtnTime};
use log::{debug, info, warn};

use crate::common::settings::Settings;

use super::{
    BundleHandle, STORAGE_SLOT_RECORD_LEN, StorageError, StorageSlotRecord,
    messages::{
        DeleteBundle, DeleteIfNotUnderCustody, EventBundleDepleted, EventBundleExpired,
        EventBundleInStorage, FreeSpace, ListBundles, ReadBundle, SaveBundle, SetUnderCustody,
    },
};

struct Slot {
    bundle_number: BundleNumber,
    record_time: u32,
    lifetime: u32,
    size: u16,
    handle: BundleHandle,
    under_custody: bool,
}

impl Slot {
    fn priority(&self) -> Priority {
        self.handle.bundle.primary_block.processing_flags.priority()
    }

    fn expires_at(&self) -> u64 {
        u64::from(self.record_time) + u64::from(self.lifetime)
    }
}

pub struct Daemon {
    slots: Vec<Slot>,
    dirty: bool,
    capacity: usize,
    storage_path: PathBuf,
    epoch_offset_seconds: i64,
    queue_depth: usize,
}

impl Default for Daemon {
    fn default() -> Self {
        let settings = Settings::from_env();
        Daemon {
            slots: Vec::new(),
            dirty: false,
            capacity: settings.storage_slot_count,
            storage_path: PathBuf::from(settings.bundle_storage_path),
            epoch_offset_seconds: settings.dtn_epoch_offset_seconds,
            queue_depth: settings.bundle_queue_depth,
        }
    }
}

impl Actor for Daemon {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        ctx.set_mailbox_capacity(self.queue_depth);
        if let Err(e) = self.load_index() {
            warn!("storage index could not be read ({e:?}), cold-booting to empty state");
            self.clear_all();
        }
        let settings = Settings::from_env();
        ctx.run_interval(
            Duration::from_secs(settings.storage_sweep_interval_seconds),
            |act, _ctx| act.sweep(),
        );
    }
}

impl actix::Supervised for Daemon {}
impl SystemService for Daemon {}

impl Handler<SaveBundle> for Daemon {
    type Result = Result<BundleNumber, StorageError>;

    fn handle(&mut self, msg: SaveBundle, ctx: &mut Context<Self>) -> Self::Result {
        let bundle_number = msg.handle.bundle_number();
        if self.slots.iter().any(|s| s.bundle_number == bundle_number) {
            debug!("save: bundle {bundle_number} already stored, de-duplicating");
            return Ok(bundle_number);
        }
        if self.slots.len() >= self.capacity {
            let new_priority = msg.handle.bundle.primary_block.processing_flags.priority();
            if !self.evict_one_for(new_priority) {
                warn!("storage full and no slot could be evicted for bundle {bundle_number}");
                return Err(StorageError::Full);
            }
        }
        let bytes = msg.handle.bundle.encode();
        let size = bytes.len().min(u16::MAX as usize) as u16;
        if let Err(e) = self.write_bundle_file(bundle_number, &bytes) {
            warn!("failed writing bundle file for {bundle_number}: {e:?}");
            return Err(StorageError::Io(e));
        }
        self.slots.push(Slot {
            bundle_number,
            record_time: DtnTime::now_with_offset(self.epoch_offset_seconds).0,
            lifetime: msg.handle.bundle.primary_block.lifetime,
            size,
            handle: msg.handle,
            under_custody: false,
        });
        self.dirty = true;
        debug!("saved bundle {bundle_number}, {} slots in use", self.slots.len());
        ctx.notify(EventBundleInStorageInternal { bundle_number });
        Ok(bundle_number)
    }
}

impl Handler<ReadBundle> for Daemon {
    type Result = Option<BundleHandle>;

    fn handle(&mut self, msg: ReadBundle, _ctx: &mut Context<Self>) -> Self::Result {
        self.slots
            .iter()
            .find(|s| s.bundle_number == msg.bundle_number)
            .map(|s| s.handle.clone())
    }
}

impl Handler<DeleteBundle> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: DeleteBundle, _ctx: &mut Context<Self>) -> Self::Result {
        if let Some(idx) = self
            .slots
            .iter()
            .position(|s| s.bundle_number == msg.bundle_number)
        {
            self.slots.remove(idx);
            self.remove_bundle_file(msg.bundle_number);
            self.dirty = true;
        }
    }
}

impl Handler<DeleteIfNotUnderCustody> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: DeleteIfNotUnderCustody, _ctx: &mut Context<Self>) -> Self::Result {
        if let Some(idx) = self
            .slots
            .iter()
            .position(|s| s.bundle_number == msg.bundle_number)
        {
            if !self.slots[idx].under_custody {
                let slot = self.slots.remove(idx);
                self.remove_bundle_file(slot.bundle_number);
                self.dirty = true;
                debug!("freed bundle {} after processing finished", msg.bundle_number);
            }
        }
    }
}

impl Handler<FreeSpace> for Daemon {
    type Result = usize;

    fn handle(&mut self, _msg: FreeSpace, _ctx: &mut Context<Self>) -> Self::Result {
        self.capacity.saturating_sub(self.slots.len())
    }
}

impl Handler<ListBundles> for Daemon {
    type Result = Vec<BundleNumber>;

    fn handle(&mut self, _msg: ListBundles, _ctx: &mut Context<Self>) -> Self::Result {
        self.slots.iter().map(|s| s.bundle_number).collect()
    }
}

impl Handler<SetUnderCustody> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: SetUnderCustody, _ctx: &mut Context<Self>) -> Self::Result {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.bundle_number == msg.bundle_number)
        {
            slot.under_custody = msg.under_custody;
        }
    }
}

/// Internal notification used to defer `EventBundleInStorage` dispatch to
/// the bundle protocol agent outside the handler that created the slot.
#[derive(Message)]
#[rtype(result = "()")]
struct EventBundleInStorageInternal {
    bundle_number: BundleNumber,
}

impl Handler<EventBundleInStorageInternal> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: EventBundleInStorageInternal, _ctx: &mut Context<Self>) -> Self::Result {
        crate::bundleprotocolagent::agent::Daemon::from_registry().do_send(EventBundleInStorage {
            bundle_number: msg.bundle_number,
        });
    }
}

impl Daemon {
    fn index_path(&self) -> PathBuf {
        self.storage_path.join("bundle_list")
    }

    fn bundle_path(&self, bundle_number: BundleNumber) -> PathBuf {
        self.storage_path.join(format!("{bundle_number}.b"))
    }

    fn write_bundle_file(&self, bundle_number: BundleNumber, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.storage_path)?;
        fs::write(self.bundle_path(bundle_number), bytes)
    }

    fn remove_bundle_file(&self, bundle_number: BundleNumber) {
        let _ = fs::remove_file(self.bundle_path(bundle_number));
    }

    /// Parses the index file in one pass, per §4.2's supplement. Any
    /// record whose backing file is missing, unreadable or fails to
    /// decode is dropped and logged; the dropped record is not rewritten
    /// immediately, only at the next sweep.
    fn load_index(&mut self) -> Result<(), StorageError> {
        let path = self.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.storage_path)?;
                return Ok(());
            }
            Err(e) => return Err(StorageError::Io(e)),
        };
        if bytes.len() % STORAGE_SLOT_RECORD_LEN != 0 {
            return Err(StorageError::IndexCorrupt);
        }
        let mut dropped_any = false;
        for chunk in bytes.chunks(STORAGE_SLOT_RECORD_LEN) {
            let Some(record) = StorageSlotRecord::decode(chunk) else {
                return Err(StorageError::IndexCorrupt);
            };
            let bundle_number = BundleNumber(record.bundle_number);
            match fs::read(self.bundle_path(bundle_number)) {
                Ok(bytes) => match Bundle::decode(&bytes) {
                    Ok(bundle) => self.slots.push(Slot {
                        bundle_number,
                        record_time: record.record_time,
                        lifetime: record.lifetime,
                        size: record.size,
                        handle: BundleHandle::new(bundle),
                        under_custody: false,
                    }),
                    Err(e) => {
                        warn!("dropping slot {bundle_number} from index: decode failed ({e:?})");
                        dropped_any = true;
                    }
                },
                Err(e) => {
                    warn!("dropping slot {bundle_number} from index: backing file missing ({e:?})");
                    dropped_any = true;
                }
            }
        }
        self.dirty = dropped_any;
        info!("storage cold start: {} bundles recovered", self.slots.len());
        Ok(())
    }

    /// Clears the store to empty state. Used only when the index itself
    /// could not be parsed, per §7's clean-cold-boot policy.
    fn clear_all(&mut self) {
        self.slots.clear();
        self.dirty = true;
    }

    fn write_index(&self) {
        let mut bytes = Vec::with_capacity(self.slots.len() * STORAGE_SLOT_RECORD_LEN);
        for slot in &self.slots {
            StorageSlotRecord {
                bundle_number: slot.bundle_number.0,
                record_time: slot.record_time,
                lifetime: slot.lifetime,
                size: slot.size,
            }
            .encode(&mut bytes);
        }
        if let Err(e) = fs::create_dir_all(&self.storage_path).and_then(|()| fs::write(self.index_path(), bytes)) {
            warn!("failed rewriting storage index: {e:?}");
        }
    }

    fn sweep(&mut self) {
        let now = DtnTime::now_with_offset(self.epoch_offset_seconds).0 as u64;
        let before = self.slots.len();
        let mut expired = Vec::new();
        self.slots.retain(|slot| {
            let keep = slot.under_custody || slot.expires_at() > now;
            if !keep {
                expired.push(slot.handle.clone());
            }
            keep
        });
        if self.slots.len() != before {
            for handle in expired {
                let bundle_number = handle.bundle_number();
                self.remove_bundle_file(bundle_number);
                debug!("evicted expired bundle {bundle_number}");
                crate::bundleprotocolagent::agent::Daemon::from_registry()
                    .do_send(EventBundleExpired { handle });
            }
            self.dirty = true;
        }
        if self.dirty {
            self.write_index();
            self.dirty = false;
        }
    }

    /// Evicts the lowest-priority, oldest (FIFO tie-break per Open
    /// Question 3) non-custody-held slot, but only when `candidate_priority`
    /// is strictly higher than that slot's priority — a full store denies
    /// an incoming bundle with no higher priority than anything already
    /// held. Returns `true` if a slot was freed.
    fn evict_one_for(&mut self, candidate_priority: Priority) -> bool {
        let victim = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.under_custody && s.priority() < candidate_priority)
            .min_by_key(|(_, s)| (s.priority(), s.record_time))
            .map(|(idx, _)| idx);
        match victim {
            Some(idx) => {
                let slot = self.slots.remove(idx);
                self.remove_bundle_file(slot.bundle_number);
                debug!("evicted bundle {} to make room", slot.bundle_number);
                self.dirty = true;
                crate::bundleprotocolagent::agent::Daemon::from_registry()
                    .do_send(EventBundleDepleted { handle: slot.handle });
                true
            }
            None => false,
        }
    }
}
