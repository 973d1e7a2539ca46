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

//! End-to-end scenarios driven straight against the actor tree, in place
//! of the reference node's subprocess-and-gRPC harness: this crate has no
//! client-facing RPC surface, so the network and application interfaces
//! are exercised by registering fake actors as their recipients.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use actix::prelude::*;
use bp6::{
    block::{Block, CanonicalBlock, payload_block::PayloadBlock},
    blockflags::BlockFlags,
    bundle::Bundle,
    bundle_number::BundleNumber,
    bundleflags::ProcessingFlags,
    endpoint::Endpoint,
    primaryblock::PrimaryBlock,
    time::DtnTime,
};
use dtrd::{
    bundleprotocolagent::{
        agent::Daemon as BpaDaemon,
        messages::{
            ApplicationRegister, EventNeighborUp, ProcessingFinished, ReceiveBundle,
            RegisterNetworkSink, SubmitDataToApplication, TransmitBundle,
        },
    },
    bundlestorageagent::{
        BundleHandle,
        agent::Daemon as StorageDaemon,
        messages::{ListBundles, ReadBundle, SaveBundle},
    },
};
use serial_test::serial;
use tempfile::tempdir;

const EPOCH_OFFSET: &str = "946684800";

/// Resets every setting the agents read from the environment to a fixed
/// baseline, then applies `overrides`. Tests run `#[serial]` because the
/// settings layer is process-wide `env::var` state.
fn configure(storage_dir: &std::path::Path, overrides: &[(&str, &str)]) {
    let defaults: &[(&str, &str)] = &[
        ("NODE_ID", "1"),
        ("BUNDLE_STORAGE_SIZE", "20"),
        ("REDUNDANCE_SIZE", "128"),
        ("REDUNDANCE_NUMBER", "2"),
        ("REDUNDANCE_LIMIT", "100"),
        ("CUSTODY_MAX_ENTRIES", "10"),
        ("RETRANSMIT_INTERVAL_SECONDS", "1000"),
        ("RETRANSMIT_LIMIT", "5"),
        ("DISCOVERY_NEIGHBOUR_TIMEOUT_SECONDS", "120"),
        ("BUNDLE_QUEUE_DEPTH", "16"),
        ("STORAGE_SWEEP_INTERVAL_SECONDS", "5"),
        ("DTN_EPOCH_OFFSET_SECONDS", EPOCH_OFFSET),
        ("HOP_LIMIT", "16"),
    ];
    for (key, value) in defaults {
        unsafe { std::env::set_var(key, value) };
    }
    unsafe { std::env::set_var("BUNDLE_STORAGE_PATH", storage_dir.to_str().unwrap()) };
    for (key, value) in overrides {
        unsafe { std::env::set_var(key, value) };
    }
}

fn sample_bundle(
    source: Endpoint,
    destination: Endpoint,
    report_to: Endpoint,
    flags: ProcessingFlags,
    lifetime: u32,
    creation_sequence: u32,
    payload: Vec<u8>,
) -> Bundle {
    Bundle {
        primary_block: PrimaryBlock {
            processing_flags: flags,
            destination,
            source,
            report_to,
            custodian: Endpoint::null(),
            creation_timestamp: DtnTime::now_with_offset(946_684_800),
            creation_sequence,
            lifetime,
            fragment: None,
        },
        blocks: vec![CanonicalBlock {
            block: Block::Payload(PayloadBlock { data: payload }),
            block_flags: BlockFlags::LAST_BLOCK,
        }],
    }
}

struct TestApp {
    received: Arc<Mutex<Vec<BundleHandle>>>,
}

impl Actor for TestApp {
    type Context = Context<Self>;
}

impl Handler<SubmitDataToApplication> for TestApp {
    type Result = ();

    fn handle(&mut self, msg: SubmitDataToApplication, _ctx: &mut Context<Self>) -> Self::Result {
        let bundle_number = msg.handle.bundle_number();
        self.received.lock().unwrap().push(msg.handle);
        BpaDaemon::from_registry().do_send(ProcessingFinished { bundle_number });
    }
}

struct TestSink {
    sent: Arc<Mutex<Vec<(Endpoint, BundleNumber)>>>,
}

impl Actor for TestSink {
    type Context = Context<Self>;
}

impl Handler<TransmitBundle> for TestSink {
    type Result = ();

    fn handle(&mut self, msg: TransmitBundle, _ctx: &mut Context<Self>) -> Self::Result {
        self.sent.lock().unwrap().push((msg.neighbor, msg.bundle_number));
    }
}

#[actix_rt::test]
#[serial]
async fn local_delivery_reaches_registered_application() {
    let storage = tempdir().unwrap();
    configure(storage.path(), &[]);

    let received = Arc::new(Mutex::new(Vec::new()));
    let app = TestApp { received: received.clone() }.start();
    BpaDaemon::from_registry()
        .send(ApplicationRegister { service_id: 25, queue: app.recipient(), active: true })
        .await
        .unwrap();

    let bundle = sample_bundle(
        Endpoint::new(2, 99),
        Endpoint::new(1, 25),
        Endpoint::new(2, 99),
        ProcessingFlags::empty(),
        3600,
        0,
        (0..60).map(|i: u32| i as u8).collect(),
    );
    BpaDaemon::from_registry()
        .send(ReceiveBundle { handle: BundleHandle::new(bundle) })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(received.lock().unwrap().len(), 1);
}

#[actix_rt::test]
#[serial]
async fn duplicate_bundles_are_delivered_only_once() {
    let storage = tempdir().unwrap();
    configure(storage.path(), &[]);

    let received = Arc::new(Mutex::new(Vec::new()));
    let app = TestApp { received: received.clone() }.start();
    BpaDaemon::from_registry()
        .send(ApplicationRegister { service_id: 25, queue: app.recipient(), active: true })
        .await
        .unwrap();

    let bundle = sample_bundle(
        Endpoint::new(2, 99),
        Endpoint::new(1, 25),
        Endpoint::new(2, 99),
        ProcessingFlags::empty(),
        3600,
        7,
        vec![1, 2, 3, 4],
    );
    for _ in 0..2 {
        BpaDaemon::from_registry()
            .send(ReceiveBundle { handle: BundleHandle::new(bundle.clone()) })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(received.lock().unwrap().len(), 1);
}

#[actix_rt::test]
#[serial]
async fn forwarding_hands_bundle_to_known_neighbor() {
    let storage = tempdir().unwrap();
    configure(storage.path(), &[]);

    let sent = Arc::new(Mutex::new(Vec::new()));
    let sink = TestSink { sent: sent.clone() }.start();
    BpaDaemon::from_registry()
        .send(RegisterNetworkSink { sink: sink.recipient() })
        .await
        .unwrap();
    BpaDaemon::from_registry()
        .send(EventNeighborUp { node_id: 3 })
        .await
        .unwrap();

    let bundle = sample_bundle(
        Endpoint::new(2, 99),
        Endpoint::new(3, 7),
        Endpoint::new(2, 99),
        ProcessingFlags::empty(),
        3600,
        0,
        vec![9, 9, 9],
    );
    BpaDaemon::from_registry()
        .send(ReceiveBundle { handle: BundleHandle::new(bundle) })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, Endpoint::new(3, 0));
}

#[actix_rt::test]
#[serial]
async fn custody_transfer_retransmits_on_deadline() {
    let storage = tempdir().unwrap();
    configure(
        storage.path(),
        &[("RETRANSMIT_INTERVAL_SECONDS", "1"), ("RETRANSMIT_LIMIT", "5")],
    );

    let sent = Arc::new(Mutex::new(Vec::new()));
    let sink = TestSink { sent: sent.clone() }.start();
    BpaDaemon::from_registry()
        .send(RegisterNetworkSink { sink: sink.recipient() })
        .await
        .unwrap();
    BpaDaemon::from_registry()
        .send(EventNeighborUp { node_id: 2 })
        .await
        .unwrap();

    let bundle = sample_bundle(
        Endpoint::new(5, 1),
        Endpoint::new(2, 9),
        Endpoint::new(5, 1),
        ProcessingFlags::CUSTODY_REQUESTED,
        3600,
        0,
        vec![4, 5, 6],
    );
    BpaDaemon::from_registry()
        .send(ReceiveBundle { handle: BundleHandle::new(bundle) })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(sent.lock().unwrap().len(), 1, "expected the initial forward");

    // No custody signal ever arrives, so the retransmit deadline fires.
    tokio::time::sleep(Duration::from_millis(1300)).await;
    assert!(
        sent.lock().unwrap().len() >= 2,
        "expected a retransmit once the custody deadline elapsed"
    );
}

#[actix_rt::test]
#[serial]
async fn custody_held_bundle_is_not_evicted_by_lifetime_expiry() {
    // Regression test for the §3 invariant "a bundle in custody storage
    // is never deleted by lifetime alone until custody is released or
    // retransmit limit exceeded": a short-lived, custody-requested
    // bundle must still be present in storage after its lifetime and a
    // sweep interval have elapsed, with no retransmit limit exhausted.
    let storage = tempdir().unwrap();
    configure(
        storage.path(),
        &[
            ("STORAGE_SWEEP_INTERVAL_SECONDS", "1"),
            ("RETRANSMIT_INTERVAL_SECONDS", "1000"),
        ],
    );

    let bundle = sample_bundle(
        Endpoint::new(5, 1),
        Endpoint::new(2, 9),
        Endpoint::new(5, 1),
        ProcessingFlags::CUSTODY_REQUESTED,
        1,
        0,
        vec![4, 5, 6],
    );
    let handle = BundleHandle::new(bundle);
    let bundle_number = handle.bundle_number();
    BpaDaemon::from_registry()
        .send(ReceiveBundle { handle })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let listed = StorageDaemon::from_registry().send(ListBundles {}).await.unwrap();
    assert!(
        listed.contains(&bundle_number),
        "custody-held bundle must survive a lifetime-expiry sweep"
    );
}

#[actix_rt::test]
#[serial]
async fn lifetime_expiry_reports_deletion_to_report_to() {
    let storage = tempdir().unwrap();
    configure(storage.path(), &[("STORAGE_SWEEP_INTERVAL_SECONDS", "1")]);

    let sent = Arc::new(Mutex::new(Vec::new()));
    let sink = TestSink { sent: sent.clone() }.start();
    BpaDaemon::from_registry()
        .send(RegisterNetworkSink { sink: sink.recipient() })
        .await
        .unwrap();
    // Neighbor 9 (the bundle's destination) is never reachable, so it sits
    // in storage until its lifetime expires. Neighbor 8 (report_to) is
    // reachable, so the deletion report it causes gets forwarded out.
    BpaDaemon::from_registry()
        .send(EventNeighborUp { node_id: 8 })
        .await
        .unwrap();

    let bundle = sample_bundle(
        Endpoint::new(5, 1),
        Endpoint::new(9, 1),
        Endpoint::new(8, 2),
        ProcessingFlags::DELETION_STATUS_REQUESTED,
        1,
        0,
        vec![1],
    );
    BpaDaemon::from_registry()
        .send(ReceiveBundle { handle: BundleHandle::new(bundle) })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let sent = sent.lock().unwrap();
    assert!(
        sent.iter().any(|(neighbor, _)| *neighbor == Endpoint::new(8, 0)),
        "expected a deletion status report forwarded to report_to's node"
    );
}

#[actix_rt::test]
#[serial]
async fn bundles_survive_a_cold_restart_of_the_storage_agent() {
    let storage = tempdir().unwrap();
    configure(storage.path(), &[("STORAGE_SWEEP_INTERVAL_SECONDS", "1")]);

    let bundle = sample_bundle(
        Endpoint::new(2, 99),
        Endpoint::new(1, 25),
        Endpoint::new(2, 99),
        ProcessingFlags::empty(),
        3600,
        0,
        vec![42; 16],
    );
    let handle = BundleHandle::new(bundle);
    let bundle_number = handle.bundle_number();
    let saved = StorageDaemon::from_registry()
        .send(SaveBundle { handle: handle.clone() })
        .await
        .unwrap();
    assert_eq!(saved.unwrap(), bundle_number);

    // Give the sweep a chance to run so the index is flushed to disk;
    // only then does a fresh daemon reading the same directory see it.
    tokio::time::sleep(Duration::from_millis(1300)).await;

    let restarted = StorageDaemon::default().start();
    let listed = restarted.send(ListBundles {}).await.unwrap();
    assert!(listed.contains(&bundle_number));

    let reread = restarted.send(ReadBundle { bundle_number }).await.unwrap();
    assert_eq!(reread.unwrap().bundle.encode(), handle.bundle.encode());
}
