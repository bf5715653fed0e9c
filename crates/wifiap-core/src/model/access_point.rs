// ── Access point configuration record ──

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::address::AddressPlan;
use super::ieee::{ChannelRange, IeeeStandard};

/// WPA mode written into the hostapd configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SecurityProtocol {
    #[default]
    #[strum(serialize = "none")]
    #[serde(rename = "none")]
    None,
    #[strum(serialize = "WPA2")]
    #[serde(rename = "WPA2")]
    Wpa2,
}

/// Lifecycle status of the access point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ApStatus {
    #[default]
    Initializing,
    InProgress,
    Started,
    Stopped,
    Failure,
}

/// Every setting of the access point.
///
/// Fields are public for reading; writes go through the validating
/// setters so the record's invariants hold after every successful call.
#[derive(Debug, Clone)]
pub struct AccessPointConfig {
    pub interface_name: String,
    pub host_name: String,
    pub domain_name: String,
    pub ssid: String,
    pub passphrase: SecretString,
    pub preshared_key: SecretString,
    pub country_code: Option<String>,
    pub security_protocol: SecurityProtocol,
    pub ieee_standard: IeeeStandard,
    pub channel: u16,
    /// Bounds recorded by the last successful `set_channel` for the mode then active.
    pub channel_bounds: ChannelRange,
    pub max_clients: u32,
    pub discoverable: bool,
    pub addresses: AddressPlan,
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        Self {
            interface_name: String::new(),
            host_name: String::new(),
            domain_name: String::new(),
            ssid: String::new(),
            passphrase: SecretString::from(String::new()),
            preshared_key: SecretString::from(String::new()),
            country_code: None,
            security_protocol: SecurityProtocol::None,
            ieee_standard: IeeeStandard::default(),
            channel: 1,
            channel_bounds: ChannelRange::default(),
            max_clients: 10,
            discoverable: true,
            addresses: AddressPlan::default(),
        }
    }
}

impl AccessPointConfig {
    pub fn has_passphrase(&self) -> bool {
        !self.passphrase.expose_secret().is_empty()
    }

    pub fn has_preshared_key(&self) -> bool {
        !self.preshared_key.expose_secret().is_empty()
    }

    /// A serializable view with secrets reduced to "is set" flags.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            interface_name: self.interface_name.clone(),
            host_name: self.host_name.clone(),
            domain_name: self.domain_name.clone(),
            ssid: self.ssid.clone(),
            passphrase_set: self.has_passphrase(),
            preshared_key_set: self.has_preshared_key(),
            country_code: self.country_code.clone(),
            security_protocol: self.security_protocol,
            ieee_standard: self.ieee_standard.bits(),
            channel: self.channel,
            max_clients: self.max_clients,
            discoverable: self.discoverable,
            ip_ap: self.addresses.ip_ap.clone(),
            ip_start: self.addresses.ip_start.clone(),
            ip_stop: self.addresses.ip_stop.clone(),
            ip_netmask: self.addresses.ip_netmask.clone(),
        }
    }
}

/// Display/serialization view of [`AccessPointConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub interface_name: String,
    pub host_name: String,
    pub domain_name: String,
    pub ssid: String,
    pub passphrase_set: bool,
    pub preshared_key_set: bool,
    pub country_code: Option<String>,
    pub security_protocol: SecurityProtocol,
    pub ieee_standard: u32,
    pub channel: u16,
    pub max_clients: u32,
    pub discoverable: bool,
    pub ip_ap: String,
    pub ip_start: String,
    pub ip_stop: String,
    pub ip_netmask: String,
}
