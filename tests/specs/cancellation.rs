// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellation specs: a fired token interrupts the whole process tree and
//! the call resolves distinctly from failure.

use crate::prelude::*;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn pre_cancelled_install_resolves_without_spawning() {
    let host = Host::new();
    host.stub("asdf", &recording_stub(&host));
    let manager = host.manager("asdf");

    let token = CancellationToken::new();
    token.cancel();
    let err = manager.install(Some("nodejs"), None, Some(token)).await.unwrap_err();

    assert!(err.is_cancellation());
    assert!(recorded_calls(&host).is_empty());
}

#[tokio::test]
async fn cancel_interrupts_a_long_running_install() {
    let host = Host::new();
    // Long-running download standing in for a real build.
    host.stub("asdf", "sleep 30");
    let manager = host.manager("asdf");

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = manager.install(Some("nodejs"), None, Some(token)).await.unwrap_err();

    assert!(err.is_cancellation());
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "cancellation must not wait for the tool to finish"
    );
}

#[tokio::test]
async fn cancel_reaches_spawned_child_processes() {
    let host = Host::new();
    // The stub forks two workers, like a plugin build script would.
    host.stub("asdf", "sleep 30 & sleep 30 &\nwait");
    let manager = host.manager("asdf");

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = manager.install(None, None, Some(token)).await.unwrap_err();

    assert!(err.is_cancellation());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn cancellation_is_not_reported_as_a_tool_failure() {
    let host = Host::new();
    host.stub("asdf", "sleep 30");
    let manager = host.manager("asdf");

    let token = CancellationToken::new();
    token.cancel();
    let err = manager.install(None, None, Some(token)).await.unwrap_err();

    assert!(matches!(err, OpError::Process(ProcessError::Cancelled)));
    assert!(!matches!(err, OpError::Tool { .. }));
}
