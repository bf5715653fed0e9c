// ── Parameter validators ──
//
// Each setter either commits its field and returns Ok, or returns a
// ParamError and leaves the record exactly as it was.

use secrecy::SecretString;
use tracing::warn;

use crate::error::ParamError;
use crate::model::{AccessPointConfig, IeeeStandard, ResolvedPlan, SecurityProtocol};

pub const SSID_MAX_LEN: usize = 32;
pub const PASSPHRASE_MIN_LEN: usize = 8;
pub const PASSPHRASE_MAX_LEN: usize = 63;
pub const PSK_MAX_LEN: usize = 64;
pub const COUNTRY_CODE_LEN: usize = 2;

impl AccessPointConfig {
    pub fn set_ssid(&mut self, value: &str) -> Result<(), ParamError> {
        if value.is_empty() {
            return Err(ParamError::TooSmall {
                field: "ssid",
                min: 1,
            });
        }
        if value.len() > SSID_MAX_LEN {
            return Err(ParamError::TooLong {
                field: "ssid",
                max: SSID_MAX_LEN,
            });
        }
        value.clone_into(&mut self.ssid);
        Ok(())
    }

    pub fn set_passphrase(&mut self, value: &str) -> Result<(), ParamError> {
        if value.len() < PASSPHRASE_MIN_LEN {
            return Err(ParamError::TooSmall {
                field: "passphrase",
                min: PASSPHRASE_MIN_LEN,
            });
        }
        if value.len() > PASSPHRASE_MAX_LEN {
            return Err(ParamError::TooLong {
                field: "passphrase",
                max: PASSPHRASE_MAX_LEN,
            });
        }
        self.passphrase = SecretString::from(value.to_owned());
        Ok(())
    }

    pub fn set_preshared_key(&mut self, value: &str) -> Result<(), ParamError> {
        if value.len() > PSK_MAX_LEN {
            return Err(ParamError::TooLong {
                field: "preshared key",
                max: PSK_MAX_LEN,
            });
        }
        self.preshared_key = SecretString::from(value.to_owned());
        Ok(())
    }

    pub fn set_country_code(&mut self, value: &str) -> Result<(), ParamError> {
        if value.len() != COUNTRY_CODE_LEN {
            return Err(ParamError::InvalidLength {
                field: "country code",
                expected: COUNTRY_CODE_LEN,
            });
        }
        self.country_code = Some(value.to_owned());
        Ok(())
    }

    /// Accepts `none` or `WPA2` in any case.
    pub fn set_security_protocol(&mut self, value: &str) -> Result<SecurityProtocol, ParamError> {
        let protocol: SecurityProtocol = value.parse().map_err(|_| ParamError::Invalid {
            field: "security protocol",
            value: value.to_owned(),
        })?;
        self.security_protocol = protocol;
        Ok(protocol)
    }

    pub fn set_max_clients(&mut self, value: u32, cap: u32) -> Result<(), ParamError> {
        if value == 0 || value > cap {
            return Err(ParamError::OutOfRange {
                field: "max number of clients",
                value: value.into(),
                min: 1,
                max: cap.into(),
            });
        }
        self.max_clients = value;
        Ok(())
    }

    pub fn set_ieee_standard(&mut self, mask: IeeeStandard) -> Result<(), ParamError> {
        let hw = mask.hardware_bits().bits();
        if hw == 0 {
            return Err(ParamError::NoHardwareMode);
        }
        if hw.count_ones() > 1 {
            return Err(ParamError::MultipleHardwareModes);
        }
        if mask.contains(IeeeStandard::AC) && !mask.contains(IeeeStandard::A) {
            return Err(ParamError::AcRequiresA);
        }
        if mask.contains(IeeeStandard::H) && !mask.contains(IeeeStandard::D) {
            return Err(ParamError::HRequiresD);
        }
        self.ieee_standard = mask;
        Ok(())
    }

    /// Validates against the range of the active hardware mode and records
    /// that range for the pre-flight check in `start`.
    pub fn set_channel(&mut self, value: u32) -> Result<(), ParamError> {
        let bounds = match self.ieee_standard.hardware_mode() {
            Some(mode) => mode.channel_range(),
            None => {
                warn!(
                    mask = %self.ieee_standard,
                    "unrecognized hardware mode, keeping stored channel bounds"
                );
                self.channel_bounds
            }
        };

        let channel = u16::try_from(value)
            .ok()
            .filter(|c| bounds.contains(*c))
            .ok_or(ParamError::OutOfRange {
                field: "channel",
                value: value.into(),
                min: bounds.min.into(),
                max: bounds.max.into(),
            })?;

        self.channel = channel;
        self.channel_bounds = bounds;
        Ok(())
    }

    /// Parses all four addresses; a reversed range is stored ascending.
    pub fn set_ip_range(
        &mut self,
        ap: &str,
        start: &str,
        stop: &str,
        netmask: &str,
    ) -> Result<ResolvedPlan, ParamError> {
        let plan = ResolvedPlan::parse(ap, start, stop, netmask)?;
        self.addresses = plan.to_plan();
        Ok(plan)
    }

    pub fn set_interface_name(&mut self, value: &str) -> Result<(), ParamError> {
        self.interface_name = non_empty("interface name", value)?;
        Ok(())
    }

    pub fn set_host_name(&mut self, value: &str) -> Result<(), ParamError> {
        self.host_name = non_empty("host name", value)?;
        Ok(())
    }

    pub fn set_domain_name(&mut self, value: &str) -> Result<(), ParamError> {
        self.domain_name = non_empty("domain name", value)?;
        Ok(())
    }

    pub fn set_discoverable(&mut self, value: bool) {
        self.discoverable = value;
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, ParamError> {
    if value.is_empty() {
        return Err(ParamError::Invalid {
            field,
            value: String::new(),
        });
    }
    Ok(value.to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::model::ChannelRange;

    #[test]
    fn ssid_length_bounds() {
        let mut cfg = AccessPointConfig::default();
        assert!(cfg.set_ssid("a").is_ok());
        assert!(cfg.set_ssid(&"x".repeat(32)).is_ok());
        assert_eq!(cfg.ssid, "x".repeat(32));

        assert_eq!(
            cfg.set_ssid(""),
            Err(ParamError::TooSmall {
                field: "ssid",
                min: 1
            })
        );
        assert_eq!(
            cfg.set_ssid(&"x".repeat(33)),
            Err(ParamError::TooLong {
                field: "ssid",
                max: 32
            })
        );
        assert_eq!(cfg.ssid, "x".repeat(32), "failed set must not modify");
    }

    #[test]
    fn ssid_stored_exactly() {
        let mut cfg = AccessPointConfig::default();
        assert!(cfg.set_ssid("My Net ✓").is_ok());
        assert_eq!(cfg.ssid, "My Net ✓");
    }

    #[test]
    fn passphrase_length_bounds() {
        let mut cfg = AccessPointConfig::default();
        assert!(matches!(
            cfg.set_passphrase("short"),
            Err(ParamError::TooSmall { .. })
        ));
        assert!(matches!(
            cfg.set_passphrase(""),
            Err(ParamError::TooSmall { .. })
        ));
        assert!(matches!(
            cfg.set_passphrase(&"p".repeat(64)),
            Err(ParamError::TooLong { .. })
        ));
        assert!(!cfg.has_passphrase());

        assert!(cfg.set_passphrase("abcdefgh").is_ok());
        assert!(cfg.set_passphrase(&"p".repeat(63)).is_ok());
        assert_eq!(cfg.passphrase.expose_secret(), "p".repeat(63));
    }

    #[test]
    fn preshared_key_length() {
        let mut cfg = AccessPointConfig::default();
        assert!(cfg.set_preshared_key(&"a".repeat(64)).is_ok());
        assert!(matches!(
            cfg.set_preshared_key(&"a".repeat(65)),
            Err(ParamError::TooLong { .. })
        ));
        assert_eq!(cfg.preshared_key.expose_secret().len(), 64);
    }

    #[test]
    fn country_code_exactly_two() {
        let mut cfg = AccessPointConfig::default();
        assert!(matches!(
            cfg.set_country_code("USA"),
            Err(ParamError::InvalidLength { expected: 2, .. })
        ));
        assert!(matches!(
            cfg.set_country_code("U"),
            Err(ParamError::InvalidLength { .. })
        ));
        assert_eq!(cfg.country_code, None);
        assert!(cfg.set_country_code("FR").is_ok());
        assert_eq!(cfg.country_code.as_deref(), Some("FR"));
    }

    #[test]
    fn security_protocol_selection() {
        let mut cfg = AccessPointConfig::default();
        assert_eq!(cfg.set_security_protocol("wpa2"), Ok(SecurityProtocol::Wpa2));
        assert_eq!(cfg.security_protocol, SecurityProtocol::Wpa2);
        assert!(matches!(
            cfg.set_security_protocol("wep"),
            Err(ParamError::Invalid { .. })
        ));
        assert_eq!(cfg.security_protocol, SecurityProtocol::Wpa2);
        assert_eq!(cfg.set_security_protocol("None"), Ok(SecurityProtocol::None));
    }

    #[test]
    fn max_clients_respects_cap() {
        let mut cfg = AccessPointConfig::default();
        assert!(cfg.set_max_clients(1, 1000).is_ok());
        assert!(cfg.set_max_clients(1000, 1000).is_ok());
        assert!(matches!(
            cfg.set_max_clients(0, 1000),
            Err(ParamError::OutOfRange { .. })
        ));
        assert!(matches!(
            cfg.set_max_clients(11, 10),
            Err(ParamError::OutOfRange { max: 10, .. })
        ));
        assert_eq!(cfg.max_clients, 1000);
    }

    #[test]
    fn ieee_standard_rules() {
        let mut cfg = AccessPointConfig::default();
        assert!(cfg.set_ieee_standard(IeeeStandard::G).is_ok());
        assert!(cfg
            .set_ieee_standard(IeeeStandard::A | IeeeStandard::AC | IeeeStandard::N)
            .is_ok());
        assert!(cfg
            .set_ieee_standard(IeeeStandard::G | IeeeStandard::D | IeeeStandard::H)
            .is_ok());

        assert_eq!(
            cfg.set_ieee_standard(IeeeStandard::N),
            Err(ParamError::NoHardwareMode)
        );
        assert_eq!(
            cfg.set_ieee_standard(IeeeStandard::A | IeeeStandard::B),
            Err(ParamError::MultipleHardwareModes)
        );
        assert_eq!(
            cfg.set_ieee_standard(IeeeStandard::G | IeeeStandard::AC),
            Err(ParamError::AcRequiresA)
        );
        assert_eq!(
            cfg.set_ieee_standard(IeeeStandard::G | IeeeStandard::H),
            Err(ParamError::HRequiresD)
        );
        assert_eq!(
            cfg.ieee_standard,
            IeeeStandard::G | IeeeStandard::D | IeeeStandard::H
        );
    }

    #[test]
    fn channel_range_follows_hardware_mode() {
        let mut cfg = AccessPointConfig::default();
        for (mode, ok, bad) in [
            (IeeeStandard::A, [7, 196], [6, 197]),
            (IeeeStandard::B, [1, 14], [0, 15]),
            (IeeeStandard::G, [1, 14], [0, 15]),
            (IeeeStandard::AD, [1, 6], [0, 7]),
        ] {
            assert!(cfg.set_ieee_standard(mode).is_ok());
            for c in ok {
                assert!(cfg.set_channel(c).is_ok(), "{mode}: {c} should be accepted");
                assert_eq!(u32::from(cfg.channel), c);
            }
            for c in bad {
                assert!(
                    matches!(cfg.set_channel(c), Err(ParamError::OutOfRange { .. })),
                    "{mode}: {c} should be rejected"
                );
            }
        }
        assert!(cfg.set_channel(70_000).is_err());
    }

    #[test]
    fn channel_records_bounds() {
        let mut cfg = AccessPointConfig::default();
        assert!(cfg.set_ieee_standard(IeeeStandard::A).is_ok());
        assert!(cfg.set_channel(36).is_ok());
        assert_eq!(cfg.channel_bounds, ChannelRange { min: 7, max: 196 });
    }

    #[test]
    fn channel_with_unrecognized_mode_uses_stored_bounds() {
        let mut cfg = AccessPointConfig {
            ieee_standard: IeeeStandard::from_bits_retain(0),
            channel_bounds: ChannelRange { min: 3, max: 5 },
            ..AccessPointConfig::default()
        };
        assert!(cfg.set_channel(4).is_ok());
        assert!(cfg.set_channel(6).is_err());
        assert_eq!(cfg.channel_bounds, ChannelRange { min: 3, max: 5 });
    }

    #[test]
    fn ip_range_swaps_and_stores() {
        let mut cfg = AccessPointConfig::default();
        let result =
            cfg.set_ip_range("192.168.1.1", "192.168.1.50", "192.168.1.10", "255.255.255.0");
        assert!(result.is_ok());
        assert_eq!(cfg.addresses.ip_start, "192.168.1.10");
        assert_eq!(cfg.addresses.ip_stop, "192.168.1.50");
        assert_eq!(cfg.addresses.ip_ap, "192.168.1.1");
        assert_eq!(cfg.addresses.ip_netmask, "255.255.255.0");
    }

    #[test]
    fn ip_range_rejects_ap_in_range() {
        let mut cfg = AccessPointConfig::default();
        let result =
            cfg.set_ip_range("192.168.1.20", "192.168.1.10", "192.168.1.50", "255.255.255.0");
        assert!(matches!(result, Err(ParamError::ApInRange { .. })));
        assert!(cfg.addresses.is_empty());
    }

    #[test]
    fn ip_range_rejects_garbage() {
        let mut cfg = AccessPointConfig::default();
        assert!(matches!(
            cfg.set_ip_range("192.168.1.1", "192.168.1.10", "192.168.1.50", "255.255.255.0.0"),
            Err(ParamError::InvalidAddress {
                field: "ip_netmask",
                ..
            })
        ));
    }

    #[test]
    fn names_reject_empty() {
        let mut cfg = AccessPointConfig::default();
        assert!(matches!(
            cfg.set_interface_name(""),
            Err(ParamError::Invalid { .. })
        ));
        assert!(cfg.set_interface_name("wlan0").is_ok());
        assert!(cfg.set_host_name("gateway").is_ok());
        assert!(cfg.set_domain_name("lan").is_ok());
        assert_eq!(cfg.interface_name, "wlan0");
        assert_eq!(cfg.host_name, "gateway");
        assert_eq!(cfg.domain_name, "lan");
    }
}
