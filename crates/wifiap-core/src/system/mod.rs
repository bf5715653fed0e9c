// ── External collaborators ──
//
// The controller never spawns processes directly. It talks to a
// `CommandRunner` for one-shot commands and to an `EventSource` for the
// long-running station notification feed. Production implementations
// live in `script`; `simulated` provides in-process stand-ins.

pub mod script;
pub mod simulated;

use std::fmt;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use tokio::process::Child;
use tracing::warn;

use crate::error::RunnerError;

pub use script::{IwEventSource, ScriptRunner};
pub use simulated::{RecordingRunner, SimulatedEvents};

// ── SystemCommand ────────────────────────────────────────────────────

/// A command executed through the setup script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCommand {
    HardwareStart { interface: String },
    HardwareStop { interface: String },
    DaemonStart { interface: String },
    DaemonStop { interface: String },
    InterfaceUp { interface: String, address: Ipv4Addr },
    NmUnmanage { interface: String },
    FirewallAllow { interface: String },
    DnsRestart { interface: String, address: Ipv4Addr, cidr: u8 },
    UnsetEvent { interface: String },
}

impl SystemCommand {
    /// Keyword the setup script dispatches on.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::HardwareStart { .. } => "WIFI_START",
            Self::HardwareStop { .. } => "WIFI_STOP",
            Self::DaemonStart { .. } => "WIFIAP_HOSTAPD_START",
            Self::DaemonStop { .. } => "WIFIAP_HOSTAPD_STOP",
            Self::InterfaceUp { .. } => "WIFIAP_WLAN_UP",
            Self::NmUnmanage { .. } => "WIFI_NM_UNMANAGE",
            Self::FirewallAllow { .. } => "WIFI_FIREWALLD_ALLOW",
            Self::DnsRestart { .. } => "DNSMASQ_RESTART",
            Self::UnsetEvent { .. } => "WIFI_UNSET_EVENT",
        }
    }

    pub fn interface(&self) -> &str {
        match self {
            Self::HardwareStart { interface }
            | Self::HardwareStop { interface }
            | Self::DaemonStart { interface }
            | Self::DaemonStop { interface }
            | Self::InterfaceUp { interface, .. }
            | Self::NmUnmanage { interface }
            | Self::FirewallAllow { interface }
            | Self::DnsRestart { interface, .. }
            | Self::UnsetEvent { interface } => interface,
        }
    }

    /// Script arguments following the keyword.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.interface().to_owned()];
        match self {
            Self::InterfaceUp { address, .. } => args.push(address.to_string()),
            Self::DnsRestart { address, cidr, .. } => args.push(format!("{address}/{cidr}")),
            _ => {}
        }
        args
    }
}

impl fmt::Display for SystemCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword(), self.args().join(" "))
    }
}

/// Presence checks run before touching other network daemons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Probe {
    NetworkManager,
    Firewalld,
}

// ── Traits ───────────────────────────────────────────────────────────

/// Runs external commands and reports their exit status.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`, returning its exit code.
    async fn run(&self, command: &SystemCommand) -> Result<i32, RunnerError>;

    /// Whether the daemon named by `probe` is present on this system.
    async fn probe(&self, probe: Probe) -> bool;

    /// Number of stations currently associated on `interface`.
    async fn station_count(&self, interface: &str) -> Result<u32, RunnerError>;
}

/// Opens the feed of interface event lines.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn open(&self, interface: &str) -> Result<EventFeed, RunnerError>;
}

/// Lines from an event source plus the process producing them, if any.
pub struct EventFeed {
    pub lines: BoxStream<'static, std::io::Result<String>>,
    child: Option<Child>,
}

impl EventFeed {
    pub fn new(lines: BoxStream<'static, std::io::Result<String>>) -> Self {
        Self { lines, child: None }
    }

    pub fn with_child(lines: BoxStream<'static, std::io::Result<String>>, child: Child) -> Self {
        Self {
            lines,
            child: Some(child),
        }
    }

    /// Kill and reap the feeding process.
    pub async fn close(mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill event source process (non-fatal)");
            }
        }
    }
}

impl fmt::Debug for EventFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFeed")
            .field("child", &self.child.as_ref().and_then(Child::id))
            .finish_non_exhaustive()
    }
}

/// Count `Station ` lines in `iw dev <iface> station dump` output.
pub fn count_stations(dump: &str) -> u32 {
    let count = dump.lines().filter(|line| line.contains("Station ")).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
