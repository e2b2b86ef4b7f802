// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! toolup-core: domain value types shared by the toolup engine and its
//! GUI host — log entries and the typed records parsed from the external
//! version-manager CLI's output.

pub mod clock;
pub mod log;
pub mod records;

pub use clock::{Clock, FakeClock, SystemClock};
pub use log::{LogEntry, LogLevel};
pub use records::{CurrentRuntime, Plugin, Runtime, RuntimeVersion};
