// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervision — spawn one external command, stream its output,
//! and tear down the whole process tree on cancellation.

use crate::error::ProcessError;
use crate::invocation::CommandInvocation;
use crate::logs::LogAggregator;
use crate::proctree;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio_util::sync::CancellationToken;
use toolup_core::{Clock, LogLevel};

/// Captured output of a completed command.
///
/// Completion is reported regardless of the tool's own exit code; deciding
/// whether a nonzero code is a failure belongs to the facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

type ChunkHandler<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Per-invocation stream callbacks, invoked inline as chunks arrive.
///
/// Each stream preserves its own arrival order; stdout and stderr carry no
/// combined ordering guarantee. Handlers are only ever invoked before the
/// call resolves, never after.
#[derive(Default)]
pub struct StreamHandlers<'a> {
    on_stdout: Option<ChunkHandler<'a>>,
    on_stderr: Option<ChunkHandler<'a>>,
}

impl<'a> StreamHandlers<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_stdout(mut self, handler: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_stdout = Some(Box::new(handler));
        self
    }

    pub fn on_stderr(mut self, handler: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_stderr = Some(Box::new(handler));
        self
    }

    fn emit_stdout(&mut self, chunk: &str) {
        if let Some(handler) = self.on_stdout.as_mut() {
            handler(chunk);
        }
    }

    fn emit_stderr(&mut self, chunk: &str) {
        if let Some(handler) = self.on_stderr.as_mut() {
            handler(chunk);
        }
    }
}

/// Run one external command to completion, failure or cancellation.
///
/// Resolves exactly once. While the command is in flight, stdout/stderr
/// chunks are handed to `handlers` and accumulated for the final
/// [`CommandOutput`]. If the invocation carries a cancel token and it fires
/// first, the child's whole process tree is interrupted and the call
/// rejects with [`ProcessError::Cancelled`] (or
/// [`ProcessError::CancelFailed`] when no interrupt reached a target)
/// without waiting for the OS to confirm termination.
pub async fn run(
    invocation: CommandInvocation,
    mut handlers: StreamHandlers<'_>,
) -> Result<CommandOutput, ProcessError> {
    let cancel = invocation.cancel.clone().unwrap_or_default();
    if cancel.is_cancelled() {
        // Cancelled before spawn: still resolves, never hangs.
        return Err(ProcessError::Cancelled);
    }

    let mut cmd = tokio::process::Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .envs(&invocation.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(ref dir) = invocation.cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|e| ProcessError::Spawn {
        program: invocation.program.clone(),
        message: e.to_string(),
    })?;
    let pid = child.id();
    tracing::debug!(program = %invocation.program, pid, "process spawned");

    let mut stdout = child.stdout.take().ok_or_else(|| ProcessError::Stream {
        message: "stdout pipe missing".to_string(),
    })?;
    let mut stderr = child.stderr.take().ok_or_else(|| ProcessError::Stream {
        message: "stderr pipe missing".to_string(),
    })?;

    let mut out_acc: Vec<u8> = Vec::new();
    let mut err_acc: Vec<u8> = Vec::new();
    let mut out_buf = [0u8; 4096];
    let mut err_buf = [0u8; 4096];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => match read {
                Ok(0) => out_open = false,
                Ok(n) => {
                    handlers.emit_stdout(&String::from_utf8_lossy(&out_buf[..n]));
                    out_acc.extend_from_slice(&out_buf[..n]);
                }
                Err(e) => return Err(abandon(child, e.to_string())),
            },
            read = stderr.read(&mut err_buf), if err_open => match read {
                Ok(0) => err_open = false,
                Ok(n) => {
                    handlers.emit_stderr(&String::from_utf8_lossy(&err_buf[..n]));
                    err_acc.extend_from_slice(&err_buf[..n]);
                }
                Err(e) => return Err(abandon(child, e.to_string())),
            },
            _ = cancel.cancelled() => return Err(interrupt_tree(child, pid)),
        }
    }

    // Streams are drained; the child may still be running if it closed its
    // pipes early, so cancellation stays live until the exit status lands.
    tokio::select! {
        status = child.wait() => {
            let status = status
                .map_err(|e| ProcessError::Stream { message: e.to_string() })?;
            let output = CommandOutput {
                stdout: String::from_utf8_lossy(&out_acc).into_owned(),
                stderr: String::from_utf8_lossy(&err_acc).into_owned(),
                code: status.code(),
            };
            tracing::debug!(program = %invocation.program, pid, code = ?output.code, "process exited");
            Ok(output)
        }
        _ = cancel.cancelled() => Err(interrupt_tree(child, pid)),
    }
}

/// Run a command and republish its output into the log aggregator: stdout
/// chunks as info entries, stderr chunks as error entries, labelled with
/// `source`.
pub async fn run_with_logs<C: Clock>(
    source: &str,
    invocation: CommandInvocation,
    logs: &LogAggregator<C>,
) -> Result<CommandOutput, ProcessError> {
    let out_logs = logs.clone();
    let err_logs = logs.clone();
    let out_source = source.to_string();
    let err_source = source.to_string();
    let handlers = StreamHandlers::new()
        .on_stdout(move |chunk| out_logs.ingest(&out_source, chunk, LogLevel::Info))
        .on_stderr(move |chunk| err_logs.ingest(&err_source, chunk, LogLevel::Error));
    run(invocation, handlers).await
}

/// Interrupt the child's whole process tree and classify the outcome.
///
/// Signals are dispatched root first; the call does not wait for the OS to
/// confirm termination, because forced-kill confirmation is not observable
/// in finite time. A detached reaper collects the exit status.
fn interrupt_tree(child: Child, pid: Option<u32>) -> ProcessError {
    let error = match pid {
        Some(root) => {
            let targets = proctree::descendants_of(root);
            tracing::info!(root, targets = targets.len(), "interrupting process tree");
            match proctree::dispatch_interrupts(&targets, proctree::send_interrupt) {
                Ok(reached) => {
                    tracing::debug!(root, reached, "interrupts dispatched");
                    ProcessError::Cancelled
                }
                Err(e) => {
                    tracing::warn!(root, error = %e, "interrupt delivery reached no target");
                    ProcessError::CancelFailed { failures: e.failures.join("; ") }
                }
            }
        }
        // Already exited before we could look it up.
        None => ProcessError::Cancelled,
    };
    reap(child);
    error
}

/// Kill and reap a child whose invocation hit a stream error.
fn abandon(mut child: Child, message: String) -> ProcessError {
    tracing::warn!(error = %message, "stream error, abandoning invocation");
    let _ = child.start_kill();
    reap(child);
    ProcessError::Stream { message }
}

/// Collect the exit status in the background to avoid leaving a zombie.
fn reap(mut child: Child) {
    tokio::spawn(async move {
        let _ = child.wait().await;
    });
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
