//! External command execution for the Postgres client tools.

use std::process::{Command, Stdio};

use tracing::{debug, error, warn};

/// How a command's output and exit status are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPolicy {
    /// Suppress stdout/stderr and ignore the exit status.
    ///
    /// Used for steps whose failure must not halt the pipeline, like
    /// dropping a table that does not exist yet.
    Silent,
    /// Inherit stdout/stderr so the operator sees the tool's output.
    Visible,
}

/// Outcome of one external command invocation.
///
/// Outcomes are informational; the pipeline never aborts on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Process completed with a zero exit status
    Success,
    /// Process completed with a non-zero exit status
    Failed,
    /// Process could not be spawned (tool missing, permission denied)
    SpawnFailed,
}

/// A fully-formed external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    /// Program name, resolved through PATH
    pub program: String,
    /// Arguments, already split (no shell involved)
    pub args: Vec<String>,
}

impl Cmd {
    /// Creates a command line with no arguments.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Single-line rendering for logs and test assertions.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Executes command lines against the database client tools.
///
/// The trait seam lets tests drive the pipeline against a fake runner
/// instead of real child processes.
pub trait CommandRunner {
    /// Runs `cmd` to completion under `policy`.
    fn run(&self, cmd: &Cmd, policy: RunPolicy) -> RunOutcome;
}

/// Runner backed by real child processes.
#[derive(Debug, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, cmd: &Cmd, policy: RunPolicy) -> RunOutcome {
        let mut child = Command::new(&cmd.program);
        child.args(&cmd.args);
        if policy == RunPolicy::Silent {
            child.stdout(Stdio::null()).stderr(Stdio::null());
        }

        match child.status() {
            Ok(status) if status.success() => RunOutcome::Success,
            Ok(status) => {
                match policy {
                    RunPolicy::Silent => {
                        debug!("{} exited with {} (ignored)", cmd.program, status)
                    }
                    RunPolicy::Visible => warn!("{} exited with {}", cmd.program, status),
                }
                RunOutcome::Failed
            }
            Err(err) => {
                error!("failed to spawn {}: {}", cmd.program, err);
                RunOutcome::SpawnFailed
            }
        }
    }
}
