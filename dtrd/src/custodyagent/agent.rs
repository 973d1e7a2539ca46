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
use bp6::{
    administrative_record::{
        AdministrativeRecord,
        bundle_status_report::{BundleStatusFlags, BundleStatusReason, BundleStatusReport},
        custody_signal::CustodySignal,
    },
    bundle_number::BundleNumber,
    bundleflags::ProcessingFlags,
};
use log::{debug, info, warn};

use crate::{
    bundleprotocolagent::messages::{RetransmitBundle, SendAdminRecord},
    bundlestorageagent::{
        agent::Daemon as StorageDaemon,
        messages::{DeleteBundle, SetUnderCustody},
    },
    common::settings::Settings,
};

use super::{
    CustodyError, CustodyRecord,
    messages::{HandleCustodySignal, ReleaseCustody, TakeCustody},
};

pub struct Daemon {
    records: Vec<CustodyRecord>,
    max_entries: usize,
    retransmit_interval_seconds: u64,
    retransmit_limit: u32,
    epoch_offset_seconds: i64,
    queue_depth: usize,
}

impl Default for Daemon {
    fn default() -> Self {
        let settings = Settings::from_env();
        Daemon {
            records: Vec::new(),
            max_entries: settings.custody_max_entries,
            retransmit_interval_seconds: settings.retransmit_interval_seconds,
            retransmit_limit: settings.retransmit_limit,
            epoch_offset_seconds: settings.dtn_epoch_offset_seconds,
            queue_depth: settings.bundle_queue_depth,
        }
    }
}

impl Actor for Daemon {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        ctx.set_mailbox_capacity(self.queue_depth);
        ctx.run_interval(
            Duration::from_secs(self.retransmit_interval_seconds),
            |act, _ctx| act.check_deadlines(),
        );
    }
}

impl actix::Supervised for Daemon {}
impl SystemService for Daemon {}

impl Handler<TakeCustody> for Daemon {
    type Result = Result<(), CustodyError>;

    fn handle(&mut self, msg: TakeCustody, _ctx: &mut Context<Self>) -> Self::Result {
        let bundle_number = msg.handle.bundle_number();
        if self.records.iter().any(|r| r.bundle_number == bundle_number) {
            return Ok(());
        }
        if self.records.len() >= self.max_entries {
            warn!("custody table full, refusing custody of {bundle_number}");
            return Err(CustodyError::Full);
        }
        let pb = &msg.handle.bundle.primary_block;
        self.records.push(CustodyRecord {
            bundle_number,
            source: pb.source,
            creation_timestamp: pb.creation_timestamp.0,
            creation_sequence: pb.creation_sequence,
            fragment_offset: pb.fragment_offset(),
            previous_custodian: msg.previous_custodian,
            retransmit_deadline: self.now() + self.retransmit_interval_seconds as u32,
            retransmit_counter: 0,
            report_to: pb.report_to,
            wants_deletion_report: pb.processing_flags.contains(ProcessingFlags::DELETION_STATUS_REQUESTED),
        });
        StorageDaemon::from_registry().do_send(SetUnderCustody {
            bundle_number,
            under_custody: true,
        });
        if !msg.previous_custodian.is_null() {
            self.send_signal(msg.previous_custodian, bundle_number, true, BundleStatusReason::NoAdditionalInformation);
        }
        info!("accepted custody of bundle {bundle_number}");
        Ok(())
    }
}

impl Handler<ReleaseCustody> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: ReleaseCustody, _ctx: &mut Context<Self>) -> Self::Result {
        if let Some(idx) = self
            .records
            .iter()
            .position(|r| r.bundle_number == msg.bundle_number)
        {
            self.records.remove(idx);
            StorageDaemon::from_registry().do_send(SetUnderCustody {
                bundle_number: msg.bundle_number,
                under_custody: false,
            });
            debug!("released custody of bundle {}", msg.bundle_number);
        }
    }
}

impl Handler<HandleCustodySignal> for Daemon {
    type Result = ();

    fn handle(&mut self, msg: HandleCustodySignal, ctx: &mut Context<Self>) -> Self::Result {
        let signal = msg.signal;
        if let Some(record) = self.records.iter().find(|r| {
            signal.matches(r.source, r.creation_timestamp, r.creation_sequence, r.fragment_offset)
        }) {
            let bundle_number = record.bundle_number;
            if signal.succeeded {
                ctx.address().do_send(ReleaseCustody { bundle_number });
            } else {
                warn!("downstream custodian rejected bundle {bundle_number}: {:?}", signal.reason);
                self.retransmit(bundle_number);
            }
        }
    }
}

impl Daemon {
    fn now(&self) -> u32 {
        bp6::time::DtnTime::now_with_offset(self.epoch_offset_seconds).0
    }

    fn send_signal(
        &self,
        to: bp6::endpoint::Endpoint,
        bundle_number: BundleNumber,
        succeeded: bool,
        reason: BundleStatusReason,
    ) {
        let record = self
            .records
            .iter()
            .find(|r| r.bundle_number == bundle_number);
        let Some(record) = record else { return };
        let signal = CustodySignal {
            succeeded,
            reason,
            source: record.source,
            creation_timestamp: record.creation_timestamp,
            creation_sequence: record.creation_sequence,
            fragment_offset: record.fragment_offset,
        };
        crate::bundleprotocolagent::agent::Daemon::from_registry().do_send(SendAdminRecord {
            destination: to,
            record: AdministrativeRecord::CustodySignal(signal),
        });
    }

    fn retransmit(&mut self, bundle_number: BundleNumber) {
        let Some(record) = self.records.iter_mut().find(|r| r.bundle_number == bundle_number) else {
            return;
        };
        record.retransmit_counter += 1;
        if record.retransmit_counter > self.retransmit_limit {
            warn!("bundle {bundle_number} exceeded retransmit limit, giving up custody");
            let record = record.clone();
            self.records.retain(|r| r.bundle_number != bundle_number);
            if record.wants_deletion_report && !record.report_to.is_null() {
                let report = BundleStatusReport {
                    flags: BundleStatusFlags::DELETED,
                    reason: BundleStatusReason::NoAdditionalInformation,
                    source: record.source,
                    creation_timestamp: record.creation_timestamp,
                    creation_sequence: record.creation_sequence,
                    fragment_offset: record.fragment_offset,
                };
                crate::bundleprotocolagent::agent::Daemon::from_registry().do_send(SendAdminRecord {
                    destination: record.report_to,
                    record: AdministrativeRecord::StatusReport(report),
                });
            }
            StorageDaemon::from_registry().do_send(SetUnderCustody {
                bundle_number,
                under_custody: false,
            });
            StorageDaemon::from_registry().do_send(DeleteBundle { bundle_number });
            return;
        }
        record.retransmit_deadline = self.now() + self.retransmit_interval_seconds as u32;
        debug!(
            "retransmitting bundle {bundle_number}, attempt {}",
            record.retransmit_counter
        );
        crate::bundleprotocolagent::agent::Daemon::from_registry()
            .do_send(RetransmitBundle { bundle_number });
    }

    fn check_deadlines(&mut self) {
        let now = self.now();
        let expired: Vec<BundleNumber> = self
            .records
            .iter()
            .filter(|r| r.retransmit_deadline <= now)
            .map(|r| r.bundle_number)
            .collect();
        for bundle_number in expired {
            self.retransmit(bundle_number);
        }
    }
}
