// ── Events pushed to subscribers ──

use serde::{Deserialize, Serialize};
use strum::Display;

/// Name of the event carrying station join/leave notifications.
pub const CLIENT_STATE_EVENT: &str = "client-state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StationChange {
    Connected,
    Disconnected,
}

/// Payload of the `client-state` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStateEvent {
    pub event: StationChange,
    #[serde(rename = "number-client")]
    pub number_client: u32,
}

/// Anything published through the event registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApEvent {
    ClientState(ClientStateEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_state_wire_shape() {
        let event = ApEvent::ClientState(ClientStateEvent {
            event: StationChange::Connected,
            number_client: 3,
        });
        assert_eq!(
            serde_json::to_value(&event).ok(),
            Some(serde_json::json!({"event": "connected", "number-client": 3}))
        );
    }
}
