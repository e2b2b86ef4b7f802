// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process tree resolution and interrupt fan-out.
//!
//! Cancelling a command must kill not just the direct child but everything
//! it spawned. The resolver snapshots the OS process table once, folds it
//! into a parent→children map and walks breadth-first from the root. The
//! snapshot is recomputed on every call: children appear and disappear
//! between observations, so caching would hand cancellation a stale tree.

use std::collections::{HashMap, HashSet};

/// Walk depth guard. Process trees are acyclic in the host OS model, but a
/// torn snapshot can contain reparenting loops; stop here and signal what
/// was discovered so far.
pub const MAX_DEPTH: usize = 256;

/// All live descendants of `root`, root first.
///
/// The root pid is always present even when enumeration finds nothing, so
/// cancellation always has at least one target. Order beyond the root is
/// unspecified.
pub fn descendants_of(root: u32) -> Vec<u32> {
    let system = sysinfo::System::new_all();
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for (pid, process) in system.processes() {
        if let Some(parent) = process.parent() {
            children.entry(parent.as_u32()).or_default().push(pid.as_u32());
        }
    }
    collect_descendants(root, &children)
}

/// Breadth-first walk of a parent→children map from `root`, de-duplicating
/// pids observed via more than one path and bounded by [`MAX_DEPTH`].
pub fn collect_descendants(root: u32, children: &HashMap<u32, Vec<u32>>) -> Vec<u32> {
    let mut seen: HashSet<u32> = HashSet::new();
    seen.insert(root);
    let mut collected = vec![root];
    let mut frontier = vec![root];

    let mut depth = 0;
    while !frontier.is_empty() && depth < MAX_DEPTH {
        let mut next = Vec::new();
        for pid in frontier {
            let direct = children.get(&pid).map(Vec::as_slice).unwrap_or(&[]);
            for &child in direct {
                if seen.insert(child) {
                    collected.push(child);
                    next.push(child);
                }
            }
        }
        frontier = next;
        depth += 1;
    }
    collected
}

/// Outcome of one interrupt send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The pid exited between discovery and signalling; a no-op, not an
    /// error.
    AlreadyExited,
}

/// Interrupt delivery reached no target at all.
#[derive(Debug, thiserror::Error)]
#[error("interrupt delivery failed for every target: {}", failures.join("; "))]
pub struct InterruptError {
    /// Per-pid failure descriptions.
    pub failures: Vec<String>,
}

/// Send an interrupt to every pid, best-effort.
///
/// Failures are collected rather than aborting the fan-out; the call only
/// errors when no pid accepted the signal (and at least one refused), which
/// is the "your cancel may have leaked a process" case. Generic over the
/// send function so tests can inject outcomes.
pub fn dispatch_interrupts<F>(pids: &[u32], mut send: F) -> Result<usize, InterruptError>
where
    F: FnMut(u32) -> Result<Delivery, String>,
{
    let mut reached = 0usize;
    let mut failures = Vec::new();
    for &pid in pids {
        match send(pid) {
            Ok(_) => reached += 1,
            Err(message) => failures.push(format!("pid {pid}: {message}")),
        }
    }
    if reached == 0 && !failures.is_empty() {
        return Err(InterruptError { failures });
    }
    Ok(reached)
}

/// Send SIGINT to one process, matching the graceful interrupt the external
/// tool expects from a terminal. Unix only; the host application does not
/// ship process teardown on other platforms.
#[cfg(unix)]
pub fn send_interrupt(pid: u32) -> Result<Delivery, String> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid as i32), Signal::SIGINT) {
        Ok(()) => Ok(Delivery::Delivered),
        Err(nix::errno::Errno::ESRCH) => Ok(Delivery::AlreadyExited),
        Err(e) => Err(e.to_string()),
    }
}

/// No graceful interrupt exists here; report the failure so the caller
/// surfaces `CancelFailed` instead of pretending delivery happened.
#[cfg(not(unix))]
pub fn send_interrupt(pid: u32) -> Result<Delivery, String> {
    Err(format!("no interrupt signal available for pid {pid} on this platform"))
}

#[cfg(test)]
#[path = "proctree_tests.rs"]
mod tests;
