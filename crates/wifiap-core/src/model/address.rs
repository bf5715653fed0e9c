// ── Addressing plan for the AP interface and its DHCP lease range ──

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::{DnsmasqError, ParamError};

/// Longest dotted-quad string accepted for any address field.
pub const MAX_ADDRESS_LEN: usize = 15;

/// Address fields as stored in the configuration record.
///
/// Kept as strings so a record loaded with missing fields can still be
/// reported field-by-field when `start` runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPlan {
    pub ip_ap: String,
    pub ip_start: String,
    pub ip_stop: String,
    pub ip_netmask: String,
}

/// A fully parsed plan: range ordered, AP address outside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub ap: Ipv4Addr,
    pub start: Ipv4Addr,
    pub stop: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl ResolvedPlan {
    /// Parse and check four raw address strings.
    ///
    /// The range is swapped into ascending order when given backwards.
    pub fn parse(ap: &str, start: &str, stop: &str, netmask: &str) -> Result<Self, ParamError> {
        let ap = parse_address("ip_ap", ap)?;
        let mut start = parse_address("ip_start", start)?;
        let mut stop = parse_address("ip_stop", stop)?;
        let netmask = parse_address("ip_netmask", netmask)?;

        if start > stop {
            std::mem::swap(&mut start, &mut stop);
        }
        if start <= ap && ap <= stop {
            return Err(ParamError::ApInRange { ap, start, stop });
        }

        Ok(Self {
            ap,
            start,
            stop,
            netmask,
        })
    }

    pub fn cidr(&self) -> u8 {
        netmask_to_cidr(self.netmask)
    }

    pub fn to_plan(self) -> AddressPlan {
        AddressPlan {
            ip_ap: self.ap.to_string(),
            ip_start: self.start.to_string(),
            ip_stop: self.stop.to_string(),
            ip_netmask: self.netmask.to_string(),
        }
    }
}

impl AddressPlan {
    /// Resolve the stored strings, reporting the first unset field.
    pub fn resolve(&self) -> Result<ResolvedPlan, DnsmasqError> {
        for (field, value) in [
            ("ip_ap", &self.ip_ap),
            ("ip_start", &self.ip_start),
            ("ip_stop", &self.ip_stop),
            ("ip_netmask", &self.ip_netmask),
        ] {
            if value.is_empty() {
                return Err(DnsmasqError::MissingAddress { field });
            }
        }
        Ok(ResolvedPlan::parse(
            &self.ip_ap,
            &self.ip_start,
            &self.ip_stop,
            &self.ip_netmask,
        )?)
    }

    pub fn is_empty(&self) -> bool {
        self.ip_ap.is_empty()
            && self.ip_start.is_empty()
            && self.ip_stop.is_empty()
            && self.ip_netmask.is_empty()
    }
}

fn parse_address(field: &'static str, raw: &str) -> Result<Ipv4Addr, ParamError> {
    if raw.len() > MAX_ADDRESS_LEN {
        return Err(ParamError::InvalidAddress {
            field,
            value: raw.to_owned(),
        });
    }
    raw.trim().parse().map_err(|_| ParamError::InvalidAddress {
        field,
        value: raw.to_owned(),
    })
}

// ── CIDR ────────────────────────────────────────────────────────────

const PREFIX_OCTETS: [(u8, u8); 8] = [
    (0x80, 1),
    (0xC0, 2),
    (0xE0, 3),
    (0xF0, 4),
    (0xF8, 5),
    (0xFC, 6),
    (0xFE, 7),
    (0xFF, 8),
];

/// Prefix length of a dotted-quad netmask.
///
/// Each octet is matched against the canonical prefix values and adds its
/// bit count; the first octet that matches none of them ends the count, so
/// `255.0.255.0` yields 8 and irregular masks are truncated, not rejected.
pub fn netmask_to_cidr(netmask: Ipv4Addr) -> u8 {
    let mut cidr = 0;
    for octet in netmask.octets() {
        let Some(&(_, bits)) = PREFIX_OCTETS.iter().find(|(value, _)| *value == octet) else {
            return cidr;
        };
        cidr += bits;
    }
    cidr
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(s: &str) -> Ipv4Addr {
        s.parse().unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    #[test]
    fn cidr_common_masks() {
        assert_eq!(netmask_to_cidr(mask("255.255.255.0")), 24);
        assert_eq!(netmask_to_cidr(mask("255.255.255.255")), 32);
        assert_eq!(netmask_to_cidr(mask("255.255.254.0")), 23);
        assert_eq!(netmask_to_cidr(mask("255.0.0.0")), 8);
        assert_eq!(netmask_to_cidr(mask("255.255.255.128")), 25);
        assert_eq!(netmask_to_cidr(mask("0.0.0.0")), 0);
    }

    #[test]
    fn cidr_truncates_at_first_irregular_octet() {
        assert_eq!(netmask_to_cidr(mask("255.255.3.0")), 16);
        assert_eq!(netmask_to_cidr(mask("255.0.255.0")), 8);
    }

    #[test]
    fn plan_swaps_reversed_range() {
        let plan =
            ResolvedPlan::parse("192.168.1.1", "192.168.1.50", "192.168.1.10", "255.255.255.0");
        let plan = plan.unwrap_or_else(|e| panic!("unexpected error: {e}"));
        assert_eq!(plan.start, mask("192.168.1.10"));
        assert_eq!(plan.stop, mask("192.168.1.50"));
        assert_eq!(plan.cidr(), 24);
    }

    #[test]
    fn plan_rejects_ap_inside_range() {
        let err =
            ResolvedPlan::parse("192.168.1.20", "192.168.1.10", "192.168.1.50", "255.255.255.0");
        assert!(matches!(err, Err(ParamError::ApInRange { .. })));

        let err =
            ResolvedPlan::parse("192.168.1.10", "192.168.1.10", "192.168.1.50", "255.255.255.0");
        assert!(matches!(err, Err(ParamError::ApInRange { .. })));
    }

    #[test]
    fn plan_names_the_bad_field() {
        let err = ResolvedPlan::parse("192.168.1.1", "192.168.1.10", "nope", "255.255.255.0");
        assert_eq!(
            err,
            Err(ParamError::InvalidAddress {
                field: "ip_stop",
                value: "nope".into()
            })
        );
    }

    #[test]
    fn resolve_reports_missing_field() {
        let plan = AddressPlan {
            ip_ap: "192.168.1.1".into(),
            ip_start: "192.168.1.10".into(),
            ip_stop: "192.168.1.50".into(),
            ip_netmask: String::new(),
        };
        assert!(matches!(
            plan.resolve(),
            Err(DnsmasqError::MissingAddress {
                field: "ip_netmask"
            })
        ));
    }
}
