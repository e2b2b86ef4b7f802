// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsers for the external version manager's line-oriented output.
//!
//! Pure functions from raw stdout text (plus an optional context value,
//! e.g. the user's home directory) to typed records. The format carries no
//! schema guarantee, so parsing is tolerant of blank lines and spacing but
//! strict about structure: a malformed line aborts the whole parse, never
//! a partial result.

use std::collections::BTreeMap;
use thiserror::Error;
use toolup_core::{CurrentRuntime, Plugin, Runtime, RuntimeVersion};

/// Marker prefix the tool prints on the currently active version or plugin.
const IN_USE_MARKER: char = '*';

/// Sentinel the tool prints in `current` output when no version is set.
const VERSION_UNSET: &str = "______";

/// Progress text emitted mid-listing by `plugin list all`; lines carrying
/// it are kept so multi-line progress output does not shift row alignment.
const IN_PROGRESS_MARKER: &str = "updating plugin repository";

/// Errors from parsing external-tool output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The same tool name opened two groups in one listing.
    #[error("duplicate tool '{name}' in runtime list")]
    DuplicateTool {
        /// The repeated tool name.
        name: String,
    },

    /// An indented version line appeared before any tool header.
    #[error("version line with no preceding tool: '{line}'")]
    OrphanLine {
        /// The offending line, trimmed.
        line: String,
    },

    /// A line had fewer fields than the format requires.
    #[error("malformed line: '{line}'")]
    MalformedLine {
        /// The offending line, trimmed.
        line: String,
    },
}

/// Parse `list` output: tool headers at column zero, indented version
/// lines below them, the in-use marker on the active version.
///
/// `tool_name` pre-opens a group for single-tool listings, where the tool
/// omits its own header line. Groups come back sorted by name
/// (case-sensitive lexicographic).
pub fn runtime_list(input: &str, tool_name: Option<&str>) -> Result<Vec<Runtime>, ParseError> {
    let mut groups: BTreeMap<String, Vec<RuntimeVersion>> = BTreeMap::new();
    let mut current: Option<String> = None;

    if let Some(name) = tool_name {
        groups.insert(name.to_string(), Vec::new());
        current = Some(name.to_string());
    }

    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            let versions = current
                .as_ref()
                .and_then(|tool| groups.get_mut(tool))
                .ok_or_else(|| ParseError::OrphanLine { line: trimmed.to_string() })?;
            let (version, in_use) = match trimmed.strip_prefix(IN_USE_MARKER) {
                Some(rest) => (rest.trim(), true),
                None => (trimmed, false),
            };
            versions.push(RuntimeVersion { version: version.to_string(), in_use });
        } else {
            if groups.contains_key(trimmed) {
                return Err(ParseError::DuplicateTool { name: trimmed.to_string() });
            }
            groups.insert(trimmed.to_string(), Vec::new());
            current = Some(trimmed.to_string());
        }
    }

    Ok(groups
        .into_iter()
        .map(|(name, versions)| Runtime { name, versions })
        .collect())
}

/// Parse `list all` output into newest-first order.
///
/// The tool lists oldest-first; the engine's contract is the reverse.
pub fn version_list(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .rev()
        .map(String::from)
        .collect()
}

/// Parse `current` output: one `name version location...` row per line.
///
/// The unset sentinel maps version and location to `None`; a location
/// under `home` is rewritten `~`-relative. Sorted by name.
pub fn current_runtimes(
    input: &str,
    home: Option<&str>,
) -> Result<Vec<CurrentRuntime>, ParseError> {
    let mut records = Vec::new();
    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut tokens = trimmed.split_whitespace();
        let (Some(name), Some(version)) = (tokens.next(), tokens.next()) else {
            return Err(ParseError::MalformedLine { line: trimmed.to_string() });
        };
        let (version, location) = if version == VERSION_UNSET {
            (None, None)
        } else {
            let rest = tokens.collect::<Vec<_>>().join(" ");
            let location = if rest.is_empty() { None } else { Some(elide_home(&rest, home)) };
            (Some(version.to_string()), location)
        };
        records.push(CurrentRuntime {
            name: name.to_string(),
            version,
            source_location: location,
        });
    }
    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

/// Parse `plugin list` output: one `name url` row per line.
///
/// With `assume_installed` every row is an installed plugin (the `--urls`
/// listing carries no marker); otherwise a url prefixed with the in-use
/// marker denotes an installed plugin. Sorted by name.
pub fn plugin_list(input: &str, assume_installed: bool) -> Result<Vec<Plugin>, ParseError> {
    let mut plugins = Vec::new();
    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() && !line.contains(IN_PROGRESS_MARKER) {
            continue;
        }
        let mut tokens = trimmed.split_whitespace();
        let (Some(name), Some(url)) = (tokens.next(), tokens.next()) else {
            return Err(ParseError::MalformedLine { line: trimmed.to_string() });
        };
        let (url, installed) = if assume_installed {
            (url, true)
        } else {
            match url.strip_prefix(IN_USE_MARKER) {
                Some(rest) => (rest, true),
                None => (url, false),
            }
        };
        plugins.push(Plugin { name: name.to_string(), url: url.to_string(), installed });
    }
    plugins.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(plugins)
}

/// Split a filesystem path into display segments, eliding `home` to `~`.
pub fn path_segments(input: &str, home: Option<&str>) -> Vec<String> {
    let trimmed = input.trim();
    let rewritten = elide_home(trimmed, home);
    rewritten
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect()
}

/// Rewrite a path under `home` to a `~`-relative form.
fn elide_home(path: &str, home: Option<&str>) -> String {
    match home {
        Some(home) if !home.is_empty() => match path.strip_prefix(home) {
            Some(rest) => format!("~/{}", rest.trim_start_matches('/')),
            None => path.to_string(),
        },
        _ => path.to_string(),
    }
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
