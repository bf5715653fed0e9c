// ── Client monitor ──
//
// Background worker that follows station join/leave notifications for
// the AP interface and publishes the running client count on the
// `client-state` event.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{RunnerError, StopError};
use crate::events::EventRegistry;
use crate::model::{ApEvent, CLIENT_STATE_EVENT, ClientStateEvent, StationChange};
use crate::system::{CommandRunner, EventFeed, EventSource, SystemCommand};

const NEW_STATION: &str = "new station";
const DEL_STATION: &str = "del station";

/// Classify one event line for `interface`.
///
/// Lines look like `wlan0: new station 12:34:56:78:9a:bc`; the first word
/// before the first `:` must be the interface name. An empty interface
/// matches nothing.
pub fn parse_station_line(line: &str, interface: &str) -> Option<StationChange> {
    let change = if line.contains(DEL_STATION) {
        StationChange::Disconnected
    } else if line.contains(NEW_STATION) {
        StationChange::Connected
    } else {
        return None;
    };
    let (prefix, _) = line.split_once(':')?;
    let device = prefix.split_whitespace().next()?;
    (device == interface).then_some(change)
}

/// Handle to a running monitor task.
#[derive(Debug)]
pub struct ClientMonitor {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ClientMonitor {
    /// Open the event feed and start following it.
    pub async fn spawn(
        interface: &str,
        source: &dyn EventSource,
        runner: Arc<dyn CommandRunner>,
        events: EventRegistry,
    ) -> Result<Self, RunnerError> {
        let feed = source.open(interface).await?;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor_task(
            interface.to_owned(),
            feed,
            runner,
            events,
            cancel.clone(),
        ));
        info!(interface, "client monitor started");
        Ok(Self { cancel, handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task and wait up to `timeout` for it to exit.
    pub async fn shutdown(self, timeout: Duration) -> Result<(), StopError> {
        let Self { cancel, mut handle } = self;
        cancel.cancel();

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => {
                debug!("client monitor joined");
                Ok(())
            }
            Ok(Err(e)) => Err(StopError::WorkerJoinFailed {
                reason: e.to_string(),
            }),
            Err(_) => {
                handle.abort();
                Err(StopError::WorkerJoinFailed {
                    reason: format!("still running after {}ms", timeout.as_millis()),
                })
            }
        }
    }
}

async fn monitor_task(
    interface: String,
    mut feed: EventFeed,
    runner: Arc<dyn CommandRunner>,
    events: EventRegistry,
    cancel: CancellationToken,
) {
    let mut clients: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            line = feed.lines.next() => match line {
                Some(Ok(line)) => {
                    let Some(change) = parse_station_line(&line, &interface) else {
                        continue;
                    };
                    clients = match change {
                        StationChange::Connected => clients.saturating_add(1),
                        StationChange::Disconnected => clients.saturating_sub(1),
                    };
                    debug!(%change, clients, "station event");
                    let event = ApEvent::ClientState(ClientStateEvent {
                        event: change,
                        number_client: clients,
                    });
                    if let Err(e) = events.publish(CLIENT_STATE_EVENT, event) {
                        warn!(error = %e, "failed to publish client state (non-fatal)");
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "event source read failed");
                    break;
                }
                None => {
                    debug!("event source closed");
                    break;
                }
            },
        }
    }

    feed.close().await;

    let teardown = SystemCommand::UnsetEvent { interface };
    match runner.run(&teardown).await {
        Ok(0) => {}
        Ok(code) => warn!(command = %teardown, code, "event teardown failed (non-fatal)"),
        Err(e) => warn!(error = %e, "event teardown failed (non-fatal)"),
    }
    info!("client monitor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_and_leave() {
        assert_eq!(
            parse_station_line("wlan0: new station 12:34:56:78:9a:bc", "wlan0"),
            Some(StationChange::Connected)
        );
        assert_eq!(
            parse_station_line("wlan0: del station 12:34:56:78:9a:bc", "wlan0"),
            Some(StationChange::Disconnected)
        );
    }

    #[test]
    fn ignores_other_interfaces_and_events() {
        assert_eq!(
            parse_station_line("wlan1: new station 12:34:56:78:9a:bc", "wlan0"),
            None
        );
        assert_eq!(parse_station_line("wlan0 (phy #0): scan started", "wlan0"), None);
        assert_eq!(parse_station_line("new station without prefix", "wlan0"), None);
        assert_eq!(
            parse_station_line("wlan01: new station 12:34:56:78:9a:bc", "wlan0"),
            None
        );
    }

    #[test]
    fn empty_interface_matches_nothing() {
        assert_eq!(
            parse_station_line("wlan0: new station 12:34:56:78:9a:bc", ""),
            None
        );
        assert_eq!(parse_station_line(": new station 12:34:56:78:9a:bc", ""), None);
    }

    #[test]
    fn interface_must_precede_colon() {
        assert_eq!(
            parse_station_line("phy0: new station on wlan0", "wlan0"),
            None
        );
        assert_eq!(
            parse_station_line("wlan0 (phy #1): new station 02:00:00:00:00:01", "wlan0"),
            Some(StationChange::Connected)
        );
    }
}
