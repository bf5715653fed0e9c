//! Configuration document for the wifiap binding.
//!
//! A JSON (or TOML) file with a required `config` object holding the
//! initial access point settings and an optional `runtime` object, layered
//! with `WIFIAP_*` environment overrides. Initial values go through the
//! same validators as the binding verbs before the core ever sees them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wifiap_core::{
    AccessPointConfig, DEFAULT_MAX_CLIENTS_CAP, GeneratedPaths, IeeeStandard, ParamError,
    RuntimeConfig,
};

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "WIFIAP_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Document structs ────────────────────────────────────────────────

/// The whole configuration document.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    /// Initial access point settings. Required.
    pub config: InitialConfig,

    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// Initial access point values, keyed the way the binding names them.
/// Empty strings and absent numbers leave the core default in place.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct InitialConfig {
    #[serde(rename = "interfaceName")]
    pub interface_name: String,
    #[serde(rename = "domaine_name", alias = "domainName")]
    pub domain_name: String,
    #[serde(rename = "hostname")]
    pub host_name: String,
    pub ip_ap: String,
    pub ip_start: String,
    pub ip_stop: String,
    pub ip_netmask: String,
    pub ssid: String,
    pub passphrase: String,
    #[serde(rename = "presharedKey")]
    pub preshared_key: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
    #[serde(rename = "securityProtocol")]
    pub security_protocol: String,
    #[serde(rename = "channelNumber")]
    pub channel: Option<u32>,
    pub discoverable: Option<bool>,
    #[serde(rename = "maxNumberClient")]
    pub max_clients: Option<u32>,
    #[serde(rename = "IeeeStdMask")]
    pub ieee_standard: Option<u32>,
}

impl fmt::Debug for InitialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitialConfig")
            .field("interface_name", &self.interface_name)
            .field("ssid", &self.ssid)
            .field("passphrase_set", &!self.passphrase.is_empty())
            .field("preshared_key_set", &!self.preshared_key.is_empty())
            .field("security_protocol", &self.security_protocol)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Paths and tunables of the running binding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeSection {
    pub script: PathBuf,
    pub hostapd_conf: PathBuf,
    pub dnsmasq_conf: PathBuf,
    pub hosts_file: PathBuf,
    pub polkit_network_manager: PathBuf,
    pub polkit_firewalld: PathBuf,
    pub polkit_user: String,
    pub max_clients_cap: u32,
    /// Kill setup commands after this many seconds. Unset waits forever.
    pub command_timeout_secs: Option<u64>,
    pub worker_join_timeout_secs: u64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        let core = RuntimeConfig::default();
        Self {
            script: core.script,
            hostapd_conf: core.paths.hostapd_conf,
            dnsmasq_conf: core.paths.dnsmasq_conf,
            hosts_file: core.paths.hosts,
            polkit_network_manager: core.paths.polkit_network_manager,
            polkit_firewalld: core.paths.polkit_firewalld,
            polkit_user: core.polkit_user,
            max_clients_cap: DEFAULT_MAX_CLIENTS_CAP,
            command_timeout_secs: core.command_timeout.map(|d| d.as_secs()),
            worker_join_timeout_secs: core.worker_join_timeout.as_secs(),
        }
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the document at `path`, then apply `WIFIAP_*` overrides.
///
/// `.toml` files are read as TOML, anything else as JSON.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::Missing {
            path: path.to_path_buf(),
        });
    }

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let mut figment =
        Figment::new().merge(Serialized::default("runtime", RuntimeSection::default()));
    figment = if is_toml {
        figment.merge(Toml::file(path))
    } else {
        figment.merge(Json::file(path))
    };
    // WIFIAP_CONFIG names the file itself, not the `config` object.
    figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));

    let file: ConfigFile = figment.extract()?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(file)
}

// ── Translation to core types ───────────────────────────────────────

impl RuntimeSection {
    pub fn to_core(&self) -> Result<RuntimeConfig, ConfigError> {
        if self.max_clients_cap == 0 {
            return Err(invalid("runtime.max_clients_cap", "must be at least 1"));
        }
        if self.worker_join_timeout_secs == 0 {
            return Err(invalid("runtime.worker_join_timeout_secs", "must be at least 1"));
        }
        if self.command_timeout_secs == Some(0) {
            return Err(invalid("runtime.command_timeout_secs", "must be at least 1"));
        }

        Ok(RuntimeConfig {
            script: self.script.clone(),
            paths: GeneratedPaths {
                hostapd_conf: self.hostapd_conf.clone(),
                dnsmasq_conf: self.dnsmasq_conf.clone(),
                hosts: self.hosts_file.clone(),
                polkit_network_manager: self.polkit_network_manager.clone(),
                polkit_firewalld: self.polkit_firewalld.clone(),
            },
            polkit_user: self.polkit_user.clone(),
            max_clients_cap: self.max_clients_cap,
            command_timeout: self.command_timeout_secs.map(Duration::from_secs),
            worker_join_timeout: Duration::from_secs(self.worker_join_timeout_secs),
        })
    }
}

impl InitialConfig {
    /// Build the initial record, validating every non-empty value.
    ///
    /// The IEEE mask is applied before the channel so the channel is
    /// checked against the configured hardware mode.
    pub fn to_core(&self, max_clients_cap: u32) -> Result<AccessPointConfig, ConfigError> {
        let mut cfg = AccessPointConfig::default();

        let text_fields: [(&str, &String, Setter); 7] = [
            ("interfaceName", &self.interface_name, AccessPointConfig::set_interface_name),
            ("hostname", &self.host_name, AccessPointConfig::set_host_name),
            ("domaine_name", &self.domain_name, AccessPointConfig::set_domain_name),
            ("ssid", &self.ssid, AccessPointConfig::set_ssid),
            ("passphrase", &self.passphrase, AccessPointConfig::set_passphrase),
            ("presharedKey", &self.preshared_key, AccessPointConfig::set_preshared_key),
            ("countryCode", &self.country_code, AccessPointConfig::set_country_code),
        ];
        for (key, value, setter) in text_fields {
            if !value.is_empty() {
                check(key, setter(&mut cfg, value))?;
            }
        }

        if !self.security_protocol.is_empty() {
            check(
                "securityProtocol",
                cfg.set_security_protocol(&self.security_protocol),
            )?;
        }
        if let Some(mask) = self.ieee_standard {
            check(
                "IeeeStdMask",
                cfg.set_ieee_standard(IeeeStandard::from_bits_retain(mask)),
            )?;
        }
        if let Some(channel) = self.channel {
            check("channelNumber", cfg.set_channel(channel))?;
        }
        if let Some(max) = self.max_clients {
            check("maxNumberClient", cfg.set_max_clients(max, max_clients_cap))?;
        }
        if let Some(discoverable) = self.discoverable {
            cfg.set_discoverable(discoverable);
        }

        let addresses = [&self.ip_ap, &self.ip_start, &self.ip_stop, &self.ip_netmask];
        if addresses.iter().any(|a| !a.is_empty()) {
            cfg.set_ip_range(&self.ip_ap, &self.ip_start, &self.ip_stop, &self.ip_netmask)
                .map_err(|e| match &e {
                    ParamError::InvalidAddress { field, .. } => invalid(field, e.to_string()),
                    _ => invalid("ip_ap", e.to_string()),
                })?;
        }

        Ok(cfg)
    }
}

impl ConfigFile {
    /// Split into the core's runtime settings and initial record.
    pub fn into_core(self) -> Result<(AccessPointConfig, RuntimeConfig), ConfigError> {
        let runtime = self.runtime.to_core()?;
        let config = self.config.to_core(runtime.max_clients_cap)?;
        Ok((config, runtime))
    }
}

type Setter = fn(&mut AccessPointConfig, &str) -> Result<(), ParamError>;

fn check<T>(field: &str, result: Result<T, ParamError>) -> Result<T, ConfigError> {
    result.map_err(|e| invalid(field, e.to_string()))
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use wifiap_core::{HardwareMode, SecurityProtocol};

    const FULL: &str = r#"{
        "config": {
            "interfaceName": "wlan0",
            "domaine_name": "lan",
            "hostname": "gateway",
            "ip_ap": "192.168.1.1",
            "ip_start": "192.168.1.50",
            "ip_stop": "192.168.1.10",
            "ip_netmask": "255.255.255.0",
            "ssid": "MyNet",
            "passphrase": "abcdefgh",
            "securityProtocol": "wpa2",
            "IeeeStdMask": 1,
            "channelNumber": 36,
            "maxNumberClient": 20,
            "discoverable": false
        }
    }"#;

    fn load(jail: &Jail, name: &str) -> Result<ConfigFile, ConfigError> {
        load_config(&jail.directory().join(name))
    }

    #[test]
    fn full_document_translates() {
        Jail::expect_with(|jail| {
            jail.create_file("wifiap.json", FULL)?;
            let (cfg, runtime) = load(jail, "wifiap.json")
                .and_then(ConfigFile::into_core)
                .map_err(|e| e.to_string())?;

            assert_eq!(cfg.interface_name, "wlan0");
            assert_eq!(cfg.domain_name, "lan");
            assert_eq!(cfg.host_name, "gateway");
            assert_eq!(cfg.ssid, "MyNet");
            assert!(cfg.has_passphrase());
            assert_eq!(cfg.security_protocol, SecurityProtocol::Wpa2);
            assert_eq!(cfg.ieee_standard.hardware_mode(), Some(HardwareMode::A));
            assert_eq!(cfg.channel, 36);
            assert_eq!(cfg.max_clients, 20);
            assert!(!cfg.discoverable);
            assert_eq!(cfg.addresses.ip_start, "192.168.1.10");
            assert_eq!(cfg.addresses.ip_stop, "192.168.1.50");
            assert_eq!(runtime, RuntimeConfig::default());
            Ok(())
        });
    }

    #[test]
    fn empty_values_stay_unset() {
        Jail::expect_with(|jail| {
            jail.create_file("wifiap.json", r#"{"config": {"ssid": "", "interfaceName": "wlan0"}}"#)?;
            let (cfg, _) = load(jail, "wifiap.json")
                .and_then(ConfigFile::into_core)
                .map_err(|e| e.to_string())?;
            assert!(cfg.ssid.is_empty());
            assert!(cfg.addresses.is_empty());
            assert_eq!(cfg.channel, 1);
            Ok(())
        });
    }

    #[test]
    fn domain_name_alias_is_accepted() {
        Jail::expect_with(|jail| {
            jail.create_file("wifiap.json", r#"{"config": {"domainName": "home"}}"#)?;
            let file = load(jail, "wifiap.json").map_err(|e| e.to_string())?;
            assert_eq!(file.config.domain_name, "home");
            Ok(())
        });
    }

    #[test]
    fn invalid_value_names_the_key() {
        Jail::expect_with(|jail| {
            jail.create_file("wifiap.json", r#"{"config": {"channelNumber": 40}}"#)?;
            let file = load(jail, "wifiap.json").map_err(|e| e.to_string())?;
            match file.into_core() {
                Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "channelNumber"),
                other => panic!("expected a validation error, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn bad_address_names_its_field() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "wifiap.json",
                r#"{"config": {"ip_ap": "192.168.1.1", "ip_start": "nope",
                    "ip_stop": "192.168.1.9", "ip_netmask": "255.255.255.0"}}"#,
            )?;
            let file = load(jail, "wifiap.json").map_err(|e| e.to_string())?;
            match file.into_core() {
                Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "ip_start"),
                other => panic!("expected a validation error, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn missing_config_object_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("wifiap.json", r#"{"runtime": {}}"#)?;
            assert!(matches!(
                load(jail, "wifiap.json"),
                Err(ConfigError::Figment(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_reported() {
        Jail::expect_with(|jail| {
            assert!(matches!(
                load(jail, "absent.json"),
                Err(ConfigError::Missing { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn malformed_json_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("wifiap.json", "{ not json")?;
            assert!(matches!(
                load(jail, "wifiap.json"),
                Err(ConfigError::Figment(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn toml_documents_are_supported() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "wifiap.toml",
                "[config]\nssid = \"TomlNet\"\n\n[runtime]\nmax_clients_cap = 50\n",
            )?;
            let file = load(jail, "wifiap.toml").map_err(|e| e.to_string())?;
            assert_eq!(file.config.ssid, "TomlNet");
            assert_eq!(file.runtime.max_clients_cap, 50);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_the_file() {
        Jail::expect_with(|jail| {
            jail.create_file("wifiap.json", FULL)?;
            jail.set_env("WIFIAP_CONFIG", "ignored.json");
            jail.set_env("WIFIAP_CONFIG__SSID", "FromEnv");
            jail.set_env("WIFIAP_RUNTIME__POLKIT_USER", "netadmin");
            jail.set_env("WIFIAP_RUNTIME__MAX_CLIENTS_CAP", "15");

            let file = load(jail, "wifiap.json").map_err(|e| e.to_string())?;
            assert_eq!(file.config.ssid, "FromEnv");
            assert_eq!(file.runtime.polkit_user, "netadmin");
            assert_eq!(file.runtime.max_clients_cap, 15);

            // maxNumberClient 20 now exceeds the cap.
            assert!(matches!(
                file.into_core(),
                Err(ConfigError::Validation { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn runtime_section_translates() {
        let section = RuntimeSection {
            command_timeout_secs: Some(30),
            worker_join_timeout_secs: 2,
            ..RuntimeSection::default()
        };
        let runtime = section.to_core().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(runtime.command_timeout, Some(Duration::from_secs(30)));
        assert_eq!(runtime.worker_join_timeout, Duration::from_secs(2));

        let zero_cap = RuntimeSection {
            max_clients_cap: 0,
            ..RuntimeSection::default()
        };
        assert!(zero_cap.to_core().is_err());
    }
}
