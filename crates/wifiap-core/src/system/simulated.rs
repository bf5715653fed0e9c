// ── In-process collaborators ──
//
// Used by `serve --simulate` and by tests: no processes are spawned,
// every command is recorded, exit codes can be scripted per keyword.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::StreamExt;
use tokio::sync::{Mutex, broadcast};
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use super::{CommandRunner, EventFeed, EventSource, Probe, SystemCommand};
use crate::error::RunnerError;

const SIMULATED_EVENT_CAPACITY: usize = 64;

// ── RecordingRunner ──────────────────────────────────────────────────

/// A runner that logs commands and answers with scripted exit codes.
///
/// Unscripted keywords exit 0; probes report absent unless enabled.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    exit_codes: DashMap<&'static str, i32>,
    present: DashMap<Probe, bool>,
    stations: AtomicU32,
    calls: Mutex<Vec<SystemCommand>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command with `keyword` exit with `code`.
    pub fn set_exit_code(&self, keyword: &'static str, code: i32) {
        self.exit_codes.insert(keyword, code);
    }

    pub fn set_present(&self, probe: Probe, present: bool) {
        self.present.insert(probe, present);
    }

    pub fn set_station_count(&self, count: u32) {
        self.stations.store(count, Ordering::Relaxed);
    }

    /// Every command run so far, in order.
    pub async fn calls(&self) -> Vec<SystemCommand> {
        self.calls.lock().await.clone()
    }

    /// Keywords of every command run so far, in order.
    pub async fn keywords(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .await
            .iter()
            .map(SystemCommand::keyword)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &SystemCommand) -> Result<i32, RunnerError> {
        let code = self
            .exit_codes
            .get(command.keyword())
            .map_or(0, |entry| *entry.value());
        info!(command = %command, code, "simulated command");
        self.calls.lock().await.push(command.clone());
        Ok(code)
    }

    async fn probe(&self, probe: Probe) -> bool {
        self.present
            .get(&probe)
            .is_some_and(|entry| *entry.value())
    }

    async fn station_count(&self, _interface: &str) -> Result<u32, RunnerError> {
        Ok(self.stations.load(Ordering::Relaxed))
    }
}

// ── SimulatedEvents ──────────────────────────────────────────────────

/// An event source fed by [`SimulatedEvents::emit`]. Each `open` gets
/// its own subscription; lines emitted with no open feed are dropped.
#[derive(Debug, Clone)]
pub struct SimulatedEvents {
    tx: broadcast::Sender<String>,
    opened: Arc<AtomicUsize>,
}

impl Default for SimulatedEvents {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(SIMULATED_EVENT_CAPACITY);
        Self {
            tx,
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SimulatedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one line to every open feed. Returns how many feeds received it.
    pub fn emit(&self, line: impl Into<String>) -> usize {
        self.tx.send(line.into()).unwrap_or(0)
    }

    /// Number of feeds currently open.
    pub fn open_feeds(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Total number of times a feed was opened.
    pub fn times_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for SimulatedEvents {
    async fn open(&self, _interface: &str) -> Result<EventFeed, RunnerError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let lines = BroadcastStream::new(self.tx.subscribe())
            .filter_map(|item| async move { item.ok().map(Ok::<_, std::io::Error>) })
            .boxed();
        Ok(EventFeed::new(lines))
    }
}
