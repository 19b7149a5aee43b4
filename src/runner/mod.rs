//! Child-process execution: spawn, capture stdout, classify the exit.
//!
//! An [`Invocation`] describes what to run; a [`ProcessRunner`] runs it to
//! completion and resolves with the child's trimmed stdout, or a
//! [`RunError`] naming exactly how the run failed. Arguments are passed as
//! an argument vector; nothing is ever routed through a shell.

pub mod error;
pub mod mock;

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::debug;

pub use error::RunError;

/// An immutable description of one child process to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    command: String,
    args: Vec<String>,
}

impl Invocation {
    /// Describe a run of `command` with no arguments yet.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument. The child receives it verbatim.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments, in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

/// Configuration for [`ProcessRunner`].
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Kill the child and fail with [`RunError::TimedOut`] once this much
    /// time has passed. `None` waits as long as the child takes.
    pub timeout: Option<Duration>,
}

/// Something that can execute an [`Invocation`] to completion.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run the invocation and resolve with the child's trimmed stdout.
    async fn run(&self, invocation: &Invocation) -> Result<String, RunError>;
}

/// Executes invocations as real OS child processes.
///
/// Every call spawns exactly one process; there is no queuing, no retry,
/// and no shared state between runs.
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Like [`Runner::run`], but also aborts when `cancel` observes `true`.
    /// The child is killed and the run fails with [`RunError::Cancelled`].
    pub async fn run_with_cancel(
        &self,
        invocation: &Invocation,
        cancel: watch::Receiver<bool>,
    ) -> Result<String, RunError> {
        self.bounded(invocation, self.execute(invocation, Some(cancel)))
            .await
    }

    /// Apply the configured timeout to `work`. Dropping `work` on expiry is
    /// what kills the child (it is spawned with kill-on-drop).
    async fn bounded<F>(&self, invocation: &Invocation, work: F) -> Result<String, RunError>
    where
        F: Future<Output = Result<String, RunError>>,
    {
        match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RunError::TimedOut {
                    command: invocation.command().to_string(),
                    limit,
                }),
            },
            None => work.await,
        }
    }

    async fn execute(
        &self,
        invocation: &Invocation,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<String, RunError> {
        let mut command = Command::new(invocation.command());
        command
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| RunError::Startup {
            command: invocation.command().to_string(),
            source,
        })?;

        debug!(command = %invocation.command(), "child process started");

        tokio::select! {
            output = child.wait_with_output() => {
                let output = output.map_err(|source| RunError::Startup {
                    command: invocation.command().to_string(),
                    source,
                })?;
                debug!(command = %invocation.command(), status = ?output.status, "child process finished");
                classify(invocation, output)
            }
            _ = cancelled(cancel) => {
                debug!(command = %invocation.command(), "cancellation requested, killing child");
                Err(RunError::Cancelled {
                    command: invocation.command().to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl Runner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<String, RunError> {
        self.bounded(invocation, self.execute(invocation, None)).await
    }
}

/// Resolves once `cancel` observes `true`. Pends forever when there is no
/// cancellation signal, or when the sender went away without cancelling.
async fn cancelled(cancel: Option<watch::Receiver<bool>>) {
    match cancel {
        Some(mut rx) => {
            if rx.wait_for(|requested| *requested).await.is_ok() {
                return;
            }
            std::future::pending::<()>().await
        }
        None => std::future::pending::<()>().await,
    }
}

fn classify(invocation: &Invocation, output: std::process::Output) -> Result<String, RunError> {
    let command = invocation.command().to_string();
    match output.status.code() {
        Some(0) => Ok(String::from_utf8_lossy(&output.stdout).trim().to_string()),
        Some(code) => Err(RunError::NonZeroExit {
            command,
            code,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        None => Err(RunError::SignalTermination {
            command,
            signal: termination_signal(&output.status),
        }),
    }
}

#[cfg(unix)]
fn termination_signal(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().unwrap_or(0)
}

#[cfg(not(unix))]
fn termination_signal(_status: &std::process::ExitStatus) -> i32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_builder_preserves_argument_order() {
        let invocation = Invocation::new("python3")
            .arg("query_data.py")
            .args(["first", "second"]);

        assert_eq!(invocation.command(), "python3");
        assert_eq!(invocation.arguments(), &["query_data.py", "first", "second"]);
    }

    #[test]
    fn invocations_compare_by_value() {
        let a = Invocation::new("echo").arg("hi");
        let b = Invocation::new("echo").arg("hi");
        assert_eq!(a, b);
    }

    #[test]
    fn default_config_has_no_timeout() {
        assert!(RunnerConfig::default().timeout.is_none());
    }

    #[cfg(unix)]
    fn output(raw_status: i32, stdout: &str, stderr: &str) -> std::process::Output {
        use std::os::unix::process::ExitStatusExt;
        std::process::Output {
            status: std::process::ExitStatus::from_raw(raw_status),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_resolves_with_trimmed_stdout() {
        let invocation = Invocation::new("cmd");
        let result = classify(&invocation, output(0, "  Hello\n", "")).unwrap();
        assert_eq!(result, "Hello");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_discards_partial_stdout() {
        let invocation = Invocation::new("cmd");
        // Raw wait status: exit code lives in the high byte.
        let error = classify(&invocation, output(2 << 8, "partial output", "broken")).unwrap_err();
        match error {
            RunError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, 2);
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn signal_death_is_not_an_exit_code() {
        let invocation = Invocation::new("cmd");
        let error = classify(&invocation, output(9, "", "")).unwrap_err();
        match error {
            RunError::SignalTermination { signal, .. } => assert_eq!(signal, 9),
            other => panic!("expected SignalTermination, got {other:?}"),
        }
    }
}
