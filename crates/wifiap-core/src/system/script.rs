// ── Process-backed collaborators ──

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_stream::wrappers::LinesStream;
use tracing::debug;

use super::{CommandRunner, EventFeed, EventSource, Probe, SystemCommand, count_stations};
use crate::error::RunnerError;

// ── ScriptRunner ─────────────────────────────────────────────────────

/// Runs commands through the setup script as `script KEYWORD iface [arg]`.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    script: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptRunner {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            timeout: None,
        }
    }

    /// Kill any command still running after `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    async fn bounded<T, F>(&self, program: &str, fut: F) -> Result<T, RunnerError>
    where
        F: Future<Output = std::io::Result<T>> + Send,
    {
        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| {
                RunnerError::Timeout {
                    program: program.to_owned(),
                    timeout,
                }
            })?,
            None => fut.await,
        };
        result.map_err(|source| RunnerError::Spawn {
            program: program.to_owned(),
            source,
        })
    }

    async fn status(&self, program: &str, mut cmd: Command) -> Result<ExitStatus, RunnerError> {
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        self.bounded(program, cmd.status()).await
    }
}

#[async_trait]
impl CommandRunner for ScriptRunner {
    async fn run(&self, command: &SystemCommand) -> Result<i32, RunnerError> {
        let program = self.script.display().to_string();
        let mut cmd = Command::new(&self.script);
        cmd.arg(command.keyword()).args(command.args());

        let status = self.status(&program, cmd).await?;
        let code = status
            .code()
            .ok_or(RunnerError::Signaled { program })?;
        debug!(command = %command, code, "setup script finished");
        Ok(code)
    }

    async fn probe(&self, probe: Probe) -> bool {
        let (program, args): (&str, &[&str]) = match probe {
            Probe::NetworkManager => ("nmcli", &["-v"]),
            Probe::Firewalld => ("pgrep", &["firewalld"]),
        };
        let mut cmd = Command::new(program);
        cmd.args(args).stdout(Stdio::null()).stderr(Stdio::null());

        match self.status(program, cmd).await {
            Ok(status) => status.success(),
            Err(e) => {
                debug!(%probe, error = %e, "probe failed to run");
                false
            }
        }
    }

    async fn station_count(&self, interface: &str) -> Result<u32, RunnerError> {
        let mut cmd = Command::new("iw");
        cmd.args(["dev", interface, "station", "dump"])
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let output = self.bounded("iw", cmd.output()).await?;
        Ok(count_stations(&String::from_utf8_lossy(&output.stdout)))
    }
}

// ── IwEventSource ────────────────────────────────────────────────────

/// Streams `iw event` output. The feed reports every interface; the
/// monitor filters by name.
#[derive(Debug, Clone, Default)]
pub struct IwEventSource;

#[async_trait]
impl EventSource for IwEventSource {
    async fn open(&self, interface: &str) -> Result<EventFeed, RunnerError> {
        let mut child = Command::new("iw")
            .arg("event")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: "iw".into(),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill().await;
            return Err(RunnerError::Spawn {
                program: "iw".into(),
                source: std::io::Error::other("stdout not captured"),
            });
        };

        debug!(interface, pid = child.id(), "listening for station events");
        let lines = LinesStream::new(BufReader::new(stdout).lines()).boxed();
        Ok(EventFeed::with_child(lines, child))
    }
}
