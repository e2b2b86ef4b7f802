// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! toolup-engine: the CLI integration engine behind the toolup GUI.
//!
//! The engine spawns external version-manager commands, streams their
//! output while in flight, supports cooperative cancellation that tears
//! down the whole descendant process tree, republishes output as bounded,
//! debounced log entries, and parses the tool's free-form stdout into the
//! typed records in [`toolup_core`].

pub mod error;
pub mod facade;
pub mod invocation;
pub mod logs;
pub mod parse;
pub mod proctree;
pub mod supervisor;

pub use error::ProcessError;
pub use facade::{CommandOptions, ExitPolicy, OpError, Refresh, ToolManager};
pub use invocation::CommandInvocation;
pub use logs::LogAggregator;
pub use parse::ParseError;
pub use supervisor::{run, run_with_logs, CommandOutput, StreamHandlers};
