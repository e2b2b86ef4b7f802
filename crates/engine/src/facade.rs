// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named operations against the external version-manager CLI.
//!
//! [`ToolManager`] composes the supervisor and the parsers into the calls
//! the GUI makes: list runtimes, install, switch versions, manage plugins.
//! Exit-code interpretation is explicit per operation via [`ExitPolicy`],
//! and every mutation reports which query kinds it invalidates so the UI
//! layer knows what to refresh.

use crate::error::ProcessError;
use crate::invocation::CommandInvocation;
use crate::logs::LogAggregator;
use crate::parse::{self, ParseError};
use crate::supervisor::{self, CommandOutput, StreamHandlers};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use toolup_core::{CurrentRuntime, Plugin, Runtime};

/// Default external tool binary.
const DEFAULT_PROGRAM: &str = "asdf";

/// Repository and ref used by [`ToolManager::bootstrap`].
const TOOL_REPO_URL: &str = "https://github.com/asdf-vm/asdf.git";
const TOOL_REPO_REF: &str = "v0.14.0";

/// Errors surfaced by facade operations.
#[derive(Debug, Error)]
pub enum OpError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The external tool ran but reported a real failure.
    #[error("tool exited with code {code}: {stderr}")]
    Tool { code: i32, stderr: String },
}

impl OpError {
    /// True when the operation ended because the caller cancelled it.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Process(e) if e.is_cancellation())
    }
}

/// Named mapping from exit codes to dispositions.
///
/// The external tool reuses a handful of nonzero codes for benign "nothing
/// configured" states; each operation declares which codes it considers
/// benign instead of sprinkling magic numbers at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPolicy {
    benign: &'static [i32],
}

impl ExitPolicy {
    /// Only exit code 0 is acceptable.
    pub const STRICT: ExitPolicy = ExitPolicy { benign: &[] };

    /// `current` exits 126 when no version is configured for a tool; the
    /// output is still parseable (it carries the unset sentinel).
    pub const ALLOW_UNCONFIGURED: ExitPolicy = ExitPolicy { benign: &[126] };

    /// Whether a completed command should be treated as usable output.
    pub fn accepts(&self, code: Option<i32>) -> bool {
        match code {
            Some(0) => true,
            Some(code) => self.benign.contains(&code),
            // Signal death is never benign.
            None => false,
        }
    }
}

/// Query kinds a mutation invalidates; the UI refreshes these after the
/// operation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    RuntimeList,
    CurrentRuntimes,
    InstallPath,
    ShimPath,
    PluginList,
    PluginListAll,
}

impl Refresh {
    pub const AFTER_INSTALL: &'static [Refresh] = &[
        Refresh::RuntimeList,
        Refresh::CurrentRuntimes,
        Refresh::InstallPath,
        Refresh::ShimPath,
    ];
    pub const AFTER_GLOBAL: &'static [Refresh] =
        &[Refresh::RuntimeList, Refresh::CurrentRuntimes, Refresh::InstallPath];
    pub const AFTER_RESHIM: &'static [Refresh] = &[Refresh::ShimPath];
    pub const AFTER_PLUGIN_CHANGE: &'static [Refresh] =
        &[Refresh::PluginList, Refresh::PluginListAll];
    pub const AFTER_PLUGIN_REMOVE: &'static [Refresh] = &[
        Refresh::PluginList,
        Refresh::PluginListAll,
        Refresh::RuntimeList,
        Refresh::CurrentRuntimes,
        Refresh::InstallPath,
        Refresh::ShimPath,
    ];
    pub const AFTER_BOOTSTRAP: &'static [Refresh] =
        &[Refresh::RuntimeList, Refresh::CurrentRuntimes];
}

/// Pass-through execution context for every spawned command.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

/// Facade over the external version manager.
///
/// Holds the injected log aggregator and the caller-supplied execution
/// context; each operation is one supervised command invocation plus the
/// matching parser.
#[derive(Clone)]
pub struct ToolManager {
    program: String,
    options: CommandOptions,
    logs: LogAggregator,
    home: Option<String>,
}

impl ToolManager {
    pub fn new(logs: LogAggregator) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            options: CommandOptions::default(),
            logs,
            home: dirs::home_dir().map(|p| p.to_string_lossy().into_owned()),
        }
    }

    /// Override the tool binary (tests point this at stub scripts).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the home directory used for `~`-eliding.
    pub fn with_home(mut self, home: impl Into<String>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Shell-profile block the host application writes to enable the tool.
    pub fn profile_snippet() -> String {
        "export ASDF_DIR=\"$HOME/.asdf\"\n. \"$HOME/.asdf/asdf.sh\"".to_string()
    }

    fn invocation(&self, program: &str, args: &[&str]) -> CommandInvocation {
        let mut invocation = CommandInvocation::new(program).args(args.iter().copied());
        if let Some(ref cwd) = self.options.cwd {
            invocation = invocation.cwd(cwd.clone());
        }
        invocation.envs(self.options.env.clone())
    }

    /// Run a read-only query and hand back its output when the exit code
    /// is acceptable under `policy`.
    async fn query(&self, args: &[&str], policy: ExitPolicy) -> Result<CommandOutput, OpError> {
        let output = supervisor::run(self.invocation(&self.program, args), StreamHandlers::new())
            .await?;
        self.accept(args, policy, output)
    }

    /// Run a mutation with its output republished to the log viewer.
    async fn mutate(
        &self,
        label: &str,
        args: &[&str],
        cancel: Option<CancellationToken>,
    ) -> Result<(), OpError> {
        let mut invocation = self.invocation(&self.program, args);
        if let Some(token) = cancel {
            invocation = invocation.cancel(token);
        }
        let output = supervisor::run_with_logs(label, invocation, &self.logs).await?;
        self.accept(args, ExitPolicy::STRICT, output).map(|_| ())
    }

    fn accept(
        &self,
        args: &[&str],
        policy: ExitPolicy,
        output: CommandOutput,
    ) -> Result<CommandOutput, OpError> {
        if policy.accepts(output.code) {
            return Ok(output);
        }
        let code = output.code.unwrap_or(-1);
        tracing::warn!(program = %self.program, ?args, code, "tool reported failure");
        Err(OpError::Tool { code, stderr: output.stderr })
    }

    // --- runtime queries ---

    pub async fn help(&self) -> Result<String, OpError> {
        Ok(self.query(&["--help"], ExitPolicy::STRICT).await?.stdout)
    }

    /// Installed runtimes, optionally narrowed to one tool.
    pub async fn list(&self, tool: Option<&str>) -> Result<Vec<Runtime>, OpError> {
        let mut args = vec!["list"];
        args.extend(tool);
        let output = self.query(&args, ExitPolicy::STRICT).await?;
        Ok(parse::runtime_list(&output.stdout, tool)?)
    }

    /// Every version available for installation, newest first.
    pub async fn list_all(&self, tool: &str) -> Result<Vec<String>, OpError> {
        let output = self.query(&["list", "all", tool], ExitPolicy::STRICT).await?;
        Ok(parse::version_list(&output.stdout))
    }

    /// Currently selected versions; a tool with none configured comes back
    /// with `version: None` rather than failing.
    pub async fn current(&self, tool: Option<&str>) -> Result<Vec<CurrentRuntime>, OpError> {
        let mut args = vec!["current"];
        args.extend(tool);
        let output = self.query(&args, ExitPolicy::ALLOW_UNCONFIGURED).await?;
        Ok(parse::current_runtimes(&output.stdout, self.home.as_deref())?)
    }

    /// Install location of a tool (or one of its versions), as display
    /// segments.
    pub async fn where_installed(
        &self,
        tool: &str,
        version: Option<&str>,
    ) -> Result<Vec<String>, OpError> {
        let mut args = vec!["where", tool];
        args.extend(version);
        let output = self.query(&args, ExitPolicy::STRICT).await?;
        Ok(parse::path_segments(&output.stdout, self.home.as_deref()))
    }

    /// Path of the shim the tool resolves to, as display segments.
    pub async fn which_shim(&self, tool: &str) -> Result<Vec<String>, OpError> {
        let output = self.query(&["which", tool], ExitPolicy::STRICT).await?;
        Ok(parse::path_segments(&output.stdout, self.home.as_deref()))
    }

    // --- runtime mutations ---

    pub async fn install(
        &self,
        tool: Option<&str>,
        version: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> Result<&'static [Refresh], OpError> {
        let mut args = vec!["install"];
        args.extend(tool);
        args.extend(version);
        self.mutate("install", &args, cancel).await?;
        Ok(Refresh::AFTER_INSTALL)
    }

    pub async fn uninstall(
        &self,
        tool: &str,
        version: Option<&str>,
    ) -> Result<&'static [Refresh], OpError> {
        let mut args = vec!["uninstall", tool];
        args.extend(version);
        self.mutate("uninstall", &args, None).await?;
        Ok(Refresh::AFTER_INSTALL)
    }

    /// Switch the globally selected version of a tool.
    pub async fn set_global(
        &self,
        tool: &str,
        version: &str,
    ) -> Result<&'static [Refresh], OpError> {
        self.mutate("global", &["global", tool, version], None).await?;
        Ok(Refresh::AFTER_GLOBAL)
    }

    pub async fn reshim(
        &self,
        tool: Option<&str>,
        version: Option<&str>,
    ) -> Result<&'static [Refresh], OpError> {
        let mut args = vec!["reshim"];
        args.extend(tool);
        args.extend(version);
        self.mutate("reshim", &args, None).await?;
        Ok(Refresh::AFTER_RESHIM)
    }

    // --- plugins ---

    /// Installed plugins with their repository URLs.
    pub async fn plugin_list(&self) -> Result<Vec<Plugin>, OpError> {
        let output = self.query(&["plugin", "list", "--urls"], ExitPolicy::STRICT).await?;
        Ok(parse::plugin_list(&output.stdout, true)?)
    }

    /// The full plugin registry; installed entries carry the in-use marker.
    pub async fn plugin_list_all(&self) -> Result<Vec<Plugin>, OpError> {
        let output = self.query(&["plugin", "list", "all"], ExitPolicy::STRICT).await?;
        Ok(parse::plugin_list(&output.stdout, false)?)
    }

    pub async fn plugin_add(
        &self,
        name: &str,
        url: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> Result<&'static [Refresh], OpError> {
        let mut args = vec!["plugin", "add", name];
        args.extend(url);
        self.mutate("plugin add", &args, cancel).await?;
        Ok(Refresh::AFTER_PLUGIN_CHANGE)
    }

    pub async fn plugin_remove(&self, name: &str) -> Result<&'static [Refresh], OpError> {
        self.mutate("plugin remove", &["plugin", "remove", name], None).await?;
        Ok(Refresh::AFTER_PLUGIN_REMOVE)
    }

    pub async fn plugin_update(
        &self,
        name: &str,
        git_ref: Option<&str>,
    ) -> Result<&'static [Refresh], OpError> {
        let mut args = vec!["plugin", "update", name];
        args.extend(git_ref);
        self.mutate("plugin update", &args, None).await?;
        Ok(Refresh::AFTER_PLUGIN_CHANGE)
    }

    pub async fn plugin_update_all(&self) -> Result<&'static [Refresh], OpError> {
        self.mutate("plugin update", &["plugin", "update", "--all"], None).await?;
        Ok(Refresh::AFTER_PLUGIN_CHANGE)
    }

    // --- bootstrap ---

    /// Clone the version manager itself into `~/.asdf` at a pinned ref.
    pub async fn bootstrap(
        &self,
        cancel: Option<CancellationToken>,
    ) -> Result<&'static [Refresh], OpError> {
        let home = self.home.clone().unwrap_or_default();
        let target = format!("{home}/.asdf");
        let mut invocation = self.invocation(
            "git",
            &["clone", TOOL_REPO_URL, &target, "--branch", TOOL_REPO_REF],
        );
        if let Some(token) = cancel {
            invocation = invocation.cancel(token);
        }
        let output = supervisor::run_with_logs("bootstrap", invocation, &self.logs).await?;
        self.accept(&["clone"], ExitPolicy::STRICT, output)?;
        Ok(Refresh::AFTER_BOOTSTRAP)
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
