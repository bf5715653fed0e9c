// ── Runtime configuration ──
//
// Where generated files live, which script drives the system, and the
// tunables of the lifecycle. Built by the binary (or by tests) and handed
// in; core never reads config files.

use std::path::PathBuf;
use std::time::Duration;

/// Default upper bound for `set_max_clients`.
pub const DEFAULT_MAX_CLIENTS_CAP: u32 = 1000;

/// Paths of every file the controller writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPaths {
    pub hostapd_conf: PathBuf,
    pub dnsmasq_conf: PathBuf,
    pub hosts: PathBuf,
    pub polkit_network_manager: PathBuf,
    pub polkit_firewalld: PathBuf,
}

impl Default for GeneratedPaths {
    fn default() -> Self {
        Self {
            hostapd_conf: PathBuf::from("/tmp/hostapd.conf"),
            dnsmasq_conf: PathBuf::from("/tmp/dnsmasq.wlan.conf"),
            hosts: PathBuf::from("/tmp/add_hosts"),
            polkit_network_manager: PathBuf::from(
                "/etc/polkit-1/rules.d/50-wifiap-networkmanager.rules",
            ),
            polkit_firewalld: PathBuf::from("/etc/polkit-1/rules.d/50-wifiap-firewalld.rules"),
        }
    }
}

/// Lifecycle settings for an [`AccessPoint`](crate::AccessPoint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Setup script dispatching on a keyword argument.
    pub script: PathBuf,
    pub paths: GeneratedPaths,
    /// User granted NetworkManager/firewalld access by the polkit rules.
    pub polkit_user: String,
    /// Upper bound accepted by `set_max_clients`.
    pub max_clients_cap: u32,
    /// Kill external commands running longer than this. `None` waits forever.
    pub command_timeout: Option<Duration>,
    /// How long `stop` waits for the client monitor to exit.
    pub worker_join_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::from("/usr/libexec/wifiap/wifi_setup.sh"),
            paths: GeneratedPaths::default(),
            polkit_user: "wifiap".into(),
            max_clients_cap: DEFAULT_MAX_CLIENTS_CAP,
            command_timeout: None,
            worker_join_timeout: Duration::from_secs(5),
        }
    }
}
