// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log entry value types published by the engine's log aggregator.

use serde::{Deserialize, Serialize};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

/// One captured line (or chunk) of external-tool output.
///
/// Immutable after creation; the aggregator only ever appends and evicts
/// whole entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Source label, typically the command or operation name.
    pub source: String,
    pub message: String,
    pub level: LogLevel,
}

impl LogEntry {
    pub fn new(
        timestamp: u64,
        source: impl Into<String>,
        message: impl Into<String>,
        level: LogLevel,
    ) -> Self {
        Self { timestamp, source: source.into(), message: message.into(), level }
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
