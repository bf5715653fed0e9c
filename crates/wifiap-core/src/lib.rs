// wifiap-core: access point configuration, validation and lifecycle control.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod model;
pub mod monitor;
pub mod render;
pub mod system;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_MAX_CLIENTS_CAP, GeneratedPaths, RuntimeConfig};
pub use controller::{AccessPoint, StartOutcome};
pub use error::{
    CommandError, ConfigGenError, CoreError, DnsmasqError, EventError, ParamError, RunnerError,
    StartError, StopError,
};
pub use events::{EventRegistry, Subscription};
pub use model::{
    AccessPointConfig, AddressPlan, ApEvent, ApStatus, CLIENT_STATE_EVENT, ChannelRange,
    ClientStateEvent, ConfigSummary, HardwareMode, IeeeStandard, ResolvedPlan, SecurityProtocol,
    StationChange, netmask_to_cidr,
};
pub use system::{
    CommandRunner, EventFeed, EventSource, IwEventSource, Probe, RecordingRunner, ScriptRunner,
    SimulatedEvents, SystemCommand,
};
