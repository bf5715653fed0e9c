//! The verb table.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Every verb `serve` understands, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum Verb {
    Start,
    Stop,
    Restart,
    SetSsid,
    SetInterfaceName,
    SetHostName,
    SetDomainName,
    SetPassPhrase,
    SetDiscoverable,
    SetIeeeStandard,
    GetIeeeStandard,
    SetChannel,
    SetSecurityProtocol,
    SetPreSharedKey,
    SetIpRange,
    SetCountryCode,
    #[strum(to_string = "setMaxNumberClients", serialize = "SetMaxNumberClients")]
    SetMaxNumberClients,
    Subscribe,
    Unsubscribe,
    #[strum(serialize = "getAPclientsNumber")]
    GetApClientsNumber,
    GetWifiApStatus,
}

/// Shape of a verb's single argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ArgKind {
    None,
    String,
    Integer,
    Boolean,
    IpRange,
    EventName,
}

impl Verb {
    pub fn arg_kind(self) -> ArgKind {
        match self {
            Self::Start
            | Self::Stop
            | Self::Restart
            | Self::GetIeeeStandard
            | Self::GetApClientsNumber
            | Self::GetWifiApStatus => ArgKind::None,
            Self::SetSsid
            | Self::SetInterfaceName
            | Self::SetHostName
            | Self::SetDomainName
            | Self::SetPassPhrase
            | Self::SetSecurityProtocol
            | Self::SetPreSharedKey
            | Self::SetCountryCode => ArgKind::String,
            Self::SetIeeeStandard | Self::SetChannel | Self::SetMaxNumberClients => {
                ArgKind::Integer
            }
            Self::SetDiscoverable => ArgKind::Boolean,
            Self::SetIpRange => ArgKind::IpRange,
            Self::Subscribe | Self::Unsubscribe => ArgKind::EventName,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Start => "start the WiFi access point service",
            Self::Stop => "stop the WiFi access point service",
            Self::Restart => "restart the WiFi access point service",
            Self::SetSsid => "set the access point SSID",
            Self::SetInterfaceName => "set the name of the interface to be used as access point",
            Self::SetHostName => "set the access point's hostname",
            Self::SetDomainName => "set the access point domain name",
            Self::SetPassPhrase => "set the WPA2 passphrase",
            Self::SetDiscoverable => "set whether the access point announces its SSID",
            Self::SetIeeeStandard => "set which IEEE standard bits to use",
            Self::GetIeeeStandard => "get the IEEE standard bits in use",
            Self::SetChannel => "set which WiFi channel to use",
            Self::SetSecurityProtocol => "set the security protocol (none or WPA2)",
            Self::SetPreSharedKey => "set the WPA2 pre-shared key",
            Self::SetIpRange => "set the access point address and the client address range",
            Self::SetCountryCode => "set the country code for the regulatory domain",
            Self::SetMaxNumberClients => "set the maximum number of simultaneous clients",
            Self::Subscribe => "subscribe to an access point event",
            Self::Unsubscribe => "unsubscribe from an access point event",
            Self::GetApClientsNumber => "get the number of clients connected to the access point",
            Self::GetWifiApStatus => "get the status of the access point",
        }
    }
}
