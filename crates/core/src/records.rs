// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed records parsed from the external version manager's stdout.
//!
//! These are stateless projections of command output: no identity beyond
//! value equality, recreated on every parse. Field names serialize in
//! camelCase because the records cross the GUI boundary as JSON.

use serde::{Deserialize, Serialize};

/// One installed version of a runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
    pub version: String,
    /// True when the version carried the in-use marker (`*`).
    pub in_use: bool,
}

/// A runtime (tool) and its installed versions, as reported by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runtime {
    pub name: String,
    pub versions: Vec<RuntimeVersion>,
}

/// The currently selected version of a runtime, as reported by `current`.
///
/// `version` is `None` when the tool prints its unset sentinel; in that
/// case no source location is reported either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRuntime {
    pub name: String,
    pub version: Option<String>,
    /// Path of the `.tool-versions` file that selected the version,
    /// `~`-relative when under the user's home directory.
    pub source_location: Option<String>,
}

/// A plugin row from `plugin list`, with its repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub name: String,
    pub url: String,
    pub installed: bool,
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
