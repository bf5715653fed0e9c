// ── Core error types ──
//
// Every fallible operation in wifiap-core returns one of these. Validator
// failures leave the configuration untouched; start/stop failures carry a
// stable negative code so callers can tell the nine start failures apart.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Start(#[from] StartError),

    #[error(transparent)]
    Stop(#[from] StopError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Unable to list connected stations: {0}")]
    Stations(#[source] CommandError),

    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Parameter validation ─────────────────────────────────────────────

/// Rejection from a parameter validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("{field} is too short (minimum {min} characters)")]
    TooSmall { field: &'static str, min: usize },

    #[error("{field} is too long (maximum {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be exactly {expected} characters")]
    InvalidLength {
        field: &'static str,
        expected: usize,
    },

    #[error("invalid {field}: '{value}'")]
    Invalid { field: &'static str, value: String },

    #[error("{field} {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("no hardware mode (a, b, g or ad) selected")]
    NoHardwareMode,

    #[error("only one hardware mode (a, b, g or ad) may be selected")]
    MultipleHardwareModes,

    #[error("802.11ac requires hardware mode a")]
    AcRequiresA,

    #[error("802.11h requires 802.11d")]
    HRequiresD,

    #[error("{field} is not a valid IPv4 address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("access point address {ap} lies inside the lease range {start}-{stop}")]
    ApInRange {
        ap: Ipv4Addr,
        start: Ipv4Addr,
        stop: Ipv4Addr,
    },
}

// ── External commands ────────────────────────────────────────────────

/// Failure to run an external command at all.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} was terminated by a signal")]
    Signaled { program: String },

    #[error("{program} did not finish within {}s", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
}

/// An external command that ran and failed, or could not run.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{keyword} exited with status {status}")]
    Exit { keyword: &'static str, status: i32 },

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

// ── Start ────────────────────────────────────────────────────────────

/// Why `start` failed. Each variant maps to a distinct negative code.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("No valid SSID provided")]
    NoSsid,

    #[error("No valid channel number provided (channel {channel}, allowed {min}-{max})")]
    NoValidChannel { channel: u16, min: u16, max: u16 },

    #[error("Failed to generate hostapd.conf")]
    ConfigGenFailed(#[from] ConfigGenError),

    #[error("WiFi card is not inserted")]
    CardNotInserted,

    #[error("Unable to reset WiFi card")]
    CardResetFailed,

    #[error("Failed to start WiFi AP command")]
    HwStartFailed(#[source] CommandError),

    #[error("Failed to start hostapd")]
    DaemonStartFailed(#[source] CommandError),

    #[error("Failed to start Dnsmasq")]
    DnsmasqSetupFailed(#[from] DnsmasqError),

    #[error("Failed to clean previous wifiAp configuration")]
    CleanupFailed(#[source] CommandError),
}

impl StartError {
    /// Stable numeric code reported alongside the message.
    pub fn code(&self) -> i32 {
        match self {
            Self::NoSsid => -1,
            Self::NoValidChannel { .. } => -2,
            Self::ConfigGenFailed(_) => -3,
            Self::CardNotInserted => -4,
            Self::CardResetFailed => -5,
            Self::HwStartFailed(_) => -6,
            Self::DaemonStartFailed(_) => -7,
            Self::DnsmasqSetupFailed(_) => -8,
            Self::CleanupFailed(_) => -9,
        }
    }
}

/// Failure inside the DNS/DHCP setup sub-procedure.
#[derive(Debug, Error)]
pub enum DnsmasqError {
    #[error("{field} is not set")]
    MissingAddress { field: &'static str },

    #[error(transparent)]
    Address(#[from] ParamError),

    #[error("failed to bring the interface up: {0}")]
    InterfaceUp(#[source] CommandError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restart dnsmasq: {0}")]
    Restart(#[source] CommandError),
}

/// Failure while generating the hostapd configuration.
#[derive(Debug, Error)]
pub enum ConfigGenError {
    #[error("WPA2 requires a passphrase or a pre-shared key")]
    SecurityParamsMissing,

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Stop ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StopError {
    #[error("Failed to stop hostapd: {0}")]
    DaemonStopFailed(#[source] CommandError),

    #[error("Failed to stop WiFi hardware: {0}")]
    HwStopFailed(#[source] CommandError),

    #[error("Client monitor did not shut down: {reason}")]
    WorkerJoinFailed { reason: String },
}

impl StopError {
    pub fn code(&self) -> i32 {
        match self {
            Self::DaemonStopFailed(_) => -1,
            Self::HwStopFailed(_) => -2,
            Self::WorkerJoinFailed { .. } => -3,
        }
    }
}

// ── Events ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("unknown event '{name}'")]
    UnknownEvent { name: String },
}
