// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log pipeline specs: mutation output flows through the aggregator and
//! reaches subscribers as debounced snapshots.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn mutation_output_is_ingested_per_stream() {
    let host = Host::new();
    host.stub(
        "asdf",
        "echo 'Downloading nodejs 20.11.1'; echo 'gpg warning' >&2",
    );
    host.manager("asdf").install(Some("nodejs"), Some("20.11.1"), None).await.unwrap();

    let entries = host.logs.entries();
    assert!(entries
        .iter()
        .any(|e| e.level == LogLevel::Info && e.message.contains("Downloading nodejs")));
    assert!(entries
        .iter()
        .any(|e| e.level == LogLevel::Error && e.message.contains("gpg warning")));
    assert!(entries.iter().all(|e| e.source == "install"));
}

#[tokio::test]
async fn subscribers_receive_a_snapshot_after_the_quiet_period() {
    let host = Host::new();
    host.stub("asdf", "echo one; echo two; echo three");
    // Short cadence so the spec does not sit out the default second.
    host.logs.configure(100, Duration::from_millis(50));
    let mut watcher = host.logs.subscribe();
    watcher.mark_unchanged();

    host.manager("asdf").install(None, None, None).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), watcher.changed())
        .await
        .expect("snapshot published within the timeout")
        .expect("aggregator alive");
    let snapshot = watcher.borrow_and_update().clone();
    assert!(snapshot.iter().any(|e| e.message.contains("one")));
}

#[tokio::test]
async fn consecutive_mutations_share_the_aggregator() {
    let host = Host::new();
    host.stub("asdf", &format!("echo step-$1 >> {}/calls\necho ran $1", host.path().display()));
    let manager = host.manager("asdf");

    manager.reshim(None, None).await.unwrap();
    manager.plugin_update_all().await.unwrap();

    let entries = host.logs.entries();
    assert!(entries.iter().any(|e| e.source == "reshim"));
    assert!(entries.iter().any(|e| e.source == "plugin update"));
}

#[tokio::test]
async fn clear_empties_the_published_snapshot_immediately() {
    let host = Host::new();
    host.stub("asdf", "echo noisy output");
    host.manager("asdf").reshim(None, None).await.unwrap();
    assert!(!host.logs.entries().is_empty());

    host.logs.clear();
    assert!(host.logs.entries().is_empty());
    assert!(host.logs.snapshot().is_empty());
}
