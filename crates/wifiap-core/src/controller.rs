// ── Access point controller ──
//
// Owns the configuration record, the lifecycle status and the client
// monitor. Every verb of the binding surface ends up here.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, error, info, warn};

use crate::config::RuntimeConfig;
use crate::error::{CommandError, CoreError, DnsmasqError, ParamError, StartError, StopError};
use crate::events::EventRegistry;
use crate::model::{AccessPointConfig, ApStatus, CLIENT_STATE_EVENT, IeeeStandard};
use crate::monitor::ClientMonitor;
use crate::render;
use crate::system::{CommandRunner, EventSource, Probe, SystemCommand};

/// Hardware start exit code meaning no WiFi card was found.
const EXIT_CARD_NOT_INSERTED: i32 = 50;
/// Hardware start exit code meaning the card could not be reset.
const EXIT_CARD_RESET_FAILED: i32 = 100;

/// What a successful `start` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyStarted,
}

// ── AccessPoint ──────────────────────────────────────────────────

/// The access point context handed to the binding layer.
///
/// Cheaply cloneable via `Arc<AccessPointInner>`. Configuration lives
/// behind one `RwLock`; status is published through a `watch` channel so
/// readers never wait on a running `start`. `start`, `stop` and `restart`
/// serialize on the monitor slot.
#[derive(Clone)]
pub struct AccessPoint {
    inner: Arc<AccessPointInner>,
}

struct AccessPointInner {
    runtime: RuntimeConfig,
    config: RwLock<AccessPointConfig>,
    status: watch::Sender<ApStatus>,
    runner: Arc<dyn CommandRunner>,
    source: Arc<dyn EventSource>,
    events: EventRegistry,
    monitor: Mutex<Option<ClientMonitor>>,
}

impl AccessPoint {
    /// Create the controller and register the `client-state` event.
    pub fn new(
        runtime: RuntimeConfig,
        config: AccessPointConfig,
        runner: Arc<dyn CommandRunner>,
        source: Arc<dyn EventSource>,
    ) -> Result<Self, CoreError> {
        let events = EventRegistry::new();
        events.register(CLIENT_STATE_EVENT)?;
        let (status, _) = watch::channel(ApStatus::Initializing);

        Ok(Self {
            inner: Arc::new(AccessPointInner {
                runtime,
                config: RwLock::new(config),
                status,
                runner,
                source,
                events,
                monitor: Mutex::new(None),
            }),
        })
    }

    pub fn runtime(&self) -> &RuntimeConfig {
        &self.inner.runtime
    }

    pub fn events(&self) -> &EventRegistry {
        &self.inner.events
    }

    // ── Configuration ────────────────────────────────────────────

    /// Apply one validator under the write lock.
    pub async fn update<T>(
        &self,
        apply: impl FnOnce(&mut AccessPointConfig) -> Result<T, ParamError>,
    ) -> Result<T, CoreError> {
        let mut config = self.inner.config.write().await;
        Ok(apply(&mut *config)?)
    }

    /// `set_max_clients` bounded by the configured cap.
    pub async fn set_max_clients(&self, value: u32) -> Result<(), CoreError> {
        let cap = self.inner.runtime.max_clients_cap;
        self.update(|cfg| cfg.set_max_clients(value, cap)).await
    }

    /// A copy of the current configuration.
    pub async fn snapshot(&self) -> AccessPointConfig {
        self.inner.config.read().await.clone()
    }

    pub async fn ieee_standard(&self) -> IeeeStandard {
        self.inner.config.read().await.ieee_standard
    }

    // ── Status ───────────────────────────────────────────────────

    pub fn status(&self) -> ApStatus {
        *self.inner.status.borrow()
    }

    /// Subscribe to status changes.
    pub fn status_changes(&self) -> watch::Receiver<ApStatus> {
        self.inner.status.subscribe()
    }

    fn set_status(&self, status: ApStatus) {
        let previous = self.inner.status.send_replace(status);
        if previous != status {
            debug!(from = %previous, to = %status, "status changed");
        }
    }

    /// Whether a client monitor task is currently attached.
    pub async fn monitor_running(&self) -> bool {
        self.inner
            .monitor
            .lock()
            .await
            .as_ref()
            .is_some_and(|m| !m.is_finished())
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Bring the access point up. A started AP is left untouched.
    pub async fn start(&self) -> Result<StartOutcome, CoreError> {
        let mut monitor = self.inner.monitor.lock().await;
        if self.status() == ApStatus::Started {
            info!("access point already started");
            return Ok(StartOutcome::AlreadyStarted);
        }
        self.start_locked(&mut monitor).await?;
        Ok(StartOutcome::Started)
    }

    /// Run the full start sequence whatever the current status.
    pub async fn restart(&self) -> Result<(), CoreError> {
        let mut monitor = self.inner.monitor.lock().await;
        info!("restarting access point");
        self.start_locked(&mut monitor).await?;
        Ok(())
    }

    /// Bring the access point down.
    pub async fn stop(&self) -> Result<(), CoreError> {
        let mut monitor = self.inner.monitor.lock().await;
        match self.stop_locked(&mut monitor).await {
            Ok(()) => {
                self.set_status(ApStatus::Stopped);
                info!("access point stopped");
                Ok(())
            }
            Err(e) => {
                self.set_status(ApStatus::Failure);
                error!(code = e.code(), error = %e, "stop failed");
                Err(e.into())
            }
        }
    }

    /// Count stations associated with the AP interface right now.
    pub async fn client_count(&self) -> Result<u32, CoreError> {
        let interface = self.inner.config.read().await.interface_name.clone();
        self.inner
            .runner
            .station_count(&interface)
            .await
            .map_err(|e| CoreError::Stations(e.into()))
    }

    async fn start_locked(&self, monitor: &mut Option<ClientMonitor>) -> Result<(), StartError> {
        self.set_status(ApStatus::InProgress);
        if let Some(previous) = monitor.take() {
            if let Err(e) = previous.shutdown(self.inner.runtime.worker_join_timeout).await {
                warn!(error = %e, "previous client monitor did not stop cleanly (non-fatal)");
            }
        }
        let config = self.snapshot().await;
        info!(interface = %config.interface_name, ssid = %config.ssid, "starting access point");

        match self.bring_up(&config).await {
            Ok(started) => {
                *monitor = started;
                self.set_status(ApStatus::Started);
                info!("access point started");
                Ok(())
            }
            Err(e) => {
                self.set_status(ApStatus::Failure);
                error!(code = e.code(), error = %e, "start failed");
                Err(e)
            }
        }
    }

    async fn bring_up(
        &self,
        config: &AccessPointConfig,
    ) -> Result<Option<ClientMonitor>, StartError> {
        let paths = &self.inner.runtime.paths;
        let interface = config.interface_name.clone();

        if paths.dnsmasq_conf.exists() || paths.hosts.exists() {
            warn!("cleaning up configuration left by a previous run");
            self.run_checked(SystemCommand::DaemonStop {
                interface: interface.clone(),
            })
            .await
            .map_err(StartError::CleanupFailed)?;
        }

        self.setup_dnsmasq(config).await?;

        if config.ssid.is_empty() {
            return Err(StartError::NoSsid);
        }
        if !config.channel_bounds.contains(config.channel) {
            return Err(StartError::NoValidChannel {
                channel: config.channel,
                min: config.channel_bounds.min,
                max: config.channel_bounds.max,
            });
        }

        self.release_from_network_manager(&interface).await;
        self.open_firewall(&interface).await;

        render::write_hostapd_config(config, &paths.hostapd_conf)?;

        let hardware = SystemCommand::HardwareStart {
            interface: interface.clone(),
        };
        match self.inner.runner.run(&hardware).await {
            Ok(0) => {}
            Ok(EXIT_CARD_NOT_INSERTED) => return Err(StartError::CardNotInserted),
            Ok(EXIT_CARD_RESET_FAILED) => return Err(StartError::CardResetFailed),
            Ok(status) => {
                return Err(StartError::HwStartFailed(CommandError::Exit {
                    keyword: hardware.keyword(),
                    status,
                }));
            }
            Err(e) => return Err(StartError::HwStartFailed(e.into())),
        }

        if let Err(e) = self
            .run_checked(SystemCommand::DaemonStart {
                interface: interface.clone(),
            })
            .await
        {
            remove_generated(&paths.hostapd_conf);
            return Err(StartError::DaemonStartFailed(e));
        }

        match ClientMonitor::spawn(
            &interface,
            self.inner.source.as_ref(),
            Arc::clone(&self.inner.runner),
            self.inner.events.clone(),
        )
        .await
        {
            Ok(monitor) => Ok(Some(monitor)),
            Err(e) => {
                error!(error = %e, "unable to start client monitor, client events disabled");
                Ok(None)
            }
        }
    }

    async fn setup_dnsmasq(&self, config: &AccessPointConfig) -> Result<(), DnsmasqError> {
        let paths = &self.inner.runtime.paths;
        let plan = config.addresses.resolve()?;
        let cidr = plan.cidr();
        debug!(ap = %plan.ap, start = %plan.start, stop = %plan.stop, cidr, "address plan");

        self.run_checked(SystemCommand::InterfaceUp {
            interface: config.interface_name.clone(),
            address: plan.ap,
        })
        .await
        .map_err(DnsmasqError::InterfaceUp)?;

        render::write_or_remove(&paths.hosts, &render::hosts_file(plan.ap, &config.host_name))
            .map_err(|source| DnsmasqError::Write {
                path: paths.hosts.clone(),
                source,
            })?;

        let dnsmasq = render::dnsmasq_config(&plan, &config.domain_name, &paths.hosts);
        render::write_or_remove(&paths.dnsmasq_conf, &dnsmasq).map_err(|source| {
            DnsmasqError::Write {
                path: paths.dnsmasq_conf.clone(),
                source,
            }
        })?;

        self.run_checked(SystemCommand::DnsRestart {
            interface: config.interface_name.clone(),
            address: plan.ap,
            cidr,
        })
        .await
        .map_err(DnsmasqError::Restart)?;

        info!("dnsmasq configured");
        Ok(())
    }

    async fn release_from_network_manager(&self, interface: &str) {
        if !self.inner.runner.probe(Probe::NetworkManager).await {
            debug!("NetworkManager not present");
            return;
        }
        let rules = render::polkit_network_manager_rule(&self.inner.runtime.polkit_user);
        let path = &self.inner.runtime.paths.polkit_network_manager;
        if let Err(e) = render::write_or_remove(path, &rules) {
            warn!(error = %e, path = %path.display(), "failed to write polkit rules (non-fatal)");
        }
        let cmd = SystemCommand::NmUnmanage {
            interface: interface.to_owned(),
        };
        if let Err(e) = self.run_checked(cmd).await {
            warn!(error = %e, "failed to unmanage interface (non-fatal)");
        }
    }

    async fn open_firewall(&self, interface: &str) {
        if !self.inner.runner.probe(Probe::Firewalld).await {
            debug!("firewalld not running");
            return;
        }
        let rules = render::polkit_firewalld_rule(&self.inner.runtime.polkit_user);
        let path = &self.inner.runtime.paths.polkit_firewalld;
        if let Err(e) = render::write_or_remove(path, &rules) {
            warn!(error = %e, path = %path.display(), "failed to write polkit rules (non-fatal)");
        }
        let cmd = SystemCommand::FirewallAllow {
            interface: interface.to_owned(),
        };
        if let Err(e) = self.run_checked(cmd).await {
            warn!(error = %e, "failed to open firewall for DHCP (non-fatal)");
        }
    }

    async fn stop_locked(&self, monitor: &mut Option<ClientMonitor>) -> Result<(), StopError> {
        let interface = self.inner.config.read().await.interface_name.clone();

        self.run_checked(SystemCommand::DaemonStop {
            interface: interface.clone(),
        })
        .await
        .map_err(StopError::DaemonStopFailed)?;

        self.run_checked(SystemCommand::HardwareStop { interface })
            .await
            .map_err(StopError::HwStopFailed)?;

        if let Some(running) = monitor.take() {
            running
                .shutdown(self.inner.runtime.worker_join_timeout)
                .await?;
        }
        Ok(())
    }

    /// Run a command where anything but exit 0 is a failure.
    async fn run_checked(&self, command: SystemCommand) -> Result<(), CommandError> {
        match self.inner.runner.run(&command).await? {
            0 => Ok(()),
            status => Err(CommandError::Exit {
                keyword: command.keyword(),
                status,
            }),
        }
    }
}

impl std::fmt::Debug for AccessPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessPoint")
            .field("status", &self.status())
            .field("runtime", &self.inner.runtime)
            .finish_non_exhaustive()
    }
}

fn remove_generated(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(error = %e, path = %path.display(), "failed to remove generated file (non-fatal)");
    }
}
