// ── Domain model ──

pub mod access_point;
pub mod address;
pub mod event;
pub mod ieee;

pub use access_point::{AccessPointConfig, ApStatus, ConfigSummary, SecurityProtocol};
pub use address::{AddressPlan, ResolvedPlan, netmask_to_cidr};
pub use event::{ApEvent, CLIENT_STATE_EVENT, ClientStateEvent, StationChange};
pub use ieee::{ChannelRange, HardwareMode, IeeeStandard};
