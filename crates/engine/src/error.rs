// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for process supervision.

use thiserror::Error;

/// Errors produced by a supervised command invocation.
///
/// A cancelled command is deliberately distinct from a failed one so
/// callers can avoid presenting user-requested teardown as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The external program could not be started at all (not found,
    /// permission denied). Never retried.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        message: String,
    },

    /// I/O failure while reading process output; the invocation is
    /// abandoned and the child killed best-effort.
    #[error("stream error: {message}")]
    Stream { message: String },

    /// The caller's cancel signal fired and interrupts were dispatched to
    /// the process tree.
    #[error("command cancelled")]
    Cancelled,

    /// The cancel signal fired but interrupt delivery reached no live
    /// target, so a process may have leaked.
    #[error("cancel failed, a process may have leaked: {failures}")]
    CancelFailed {
        /// Per-pid delivery failures, joined for display.
        failures: String,
    },
}

impl ProcessError {
    /// True for both cancellation outcomes (`Cancelled` and `CancelFailed`).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::CancelFailed { .. })
    }
}
