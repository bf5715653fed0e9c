// ── Generated configuration files ──
//
// Text for hostapd, dnsmasq, the extra hosts file and the polkit rules.
// Output is byte-compatible with what hostapd/dnsmasq expect; writers
// remove a partially written file on failure.

use std::fmt::Write as _;
use std::net::Ipv4Addr;
use std::path::Path;

use secrecy::ExposeSecret;

use crate::error::ConfigGenError;
use crate::model::{AccessPointConfig, HardwareMode, IeeeStandard, ResolvedPlan, SecurityProtocol};

const HOSTAPD_COMMON: &str = "driver=nl80211\n\
    wmm_enabled=1\n\
    beacon_int=100\n\
    dtim_period=2\n\
    rts_threshold=2347\n\
    fragm_threshold=2346\n\
    ctrl_interface=/var/run/hostapd\n\
    ctrl_interface_group=0\n";

const SECURITY_NONE: &str = "auth_algs=1\n\
    eap_server=0\n\
    eapol_key_index_workaround=0\n\
    macaddr_acl=0\n";

const SECURITY_WPA2: &str = "wpa=2\n\
    wpa_key_mgmt=WPA-PSK\n\
    wpa_pairwise=CCMP\n\
    rsn_pairwise=CCMP\n";

/// Amendment bits and the hostapd line each one enables, in file order.
const AMENDMENT_LINES: [(IeeeStandard, &str); 6] = [
    (IeeeStandard::D, "ieee80211d=1\n"),
    (IeeeStandard::H, "ieee80211h=1\n"),
    (IeeeStandard::N, "ieee80211n=1\n"),
    (IeeeStandard::AC, "ieee80211ac=1\n"),
    (IeeeStandard::AX, "ieee80211ax=1\n"),
    (IeeeStandard::W, "ieee80211w=1\n"),
];

// ── hostapd ──────────────────────────────────────────────────────────

/// Build the hostapd configuration text.
pub fn hostapd_config(cfg: &AccessPointConfig) -> Result<String, ConfigGenError> {
    let mut out = String::from(HOSTAPD_COMMON);

    let _ = write!(
        out,
        "ssid={}\nchannel={}\nmax_num_sta={}\ncountry_code={}\nignore_broadcast_ssid={}\n",
        cfg.ssid,
        cfg.channel,
        cfg.max_clients,
        cfg.country_code.as_deref().unwrap_or_default(),
        u8::from(!cfg.discoverable),
    );

    match cfg.security_protocol {
        SecurityProtocol::None => out.push_str(SECURITY_NONE),
        SecurityProtocol::Wpa2 => {
            out.push_str(SECURITY_WPA2);
            if cfg.has_passphrase() {
                let _ = writeln!(out, "wpa_passphrase={}", cfg.passphrase.expose_secret());
            } else if cfg.has_preshared_key() {
                let _ = writeln!(out, "wpa_psk={}", cfg.preshared_key.expose_secret());
            } else {
                return Err(ConfigGenError::SecurityParamsMissing);
            }
        }
    }

    let mode = cfg.ieee_standard.hardware_mode().unwrap_or(HardwareMode::G);
    let _ = writeln!(out, "hw_mode={mode}");

    for (bit, line) in AMENDMENT_LINES {
        if cfg.ieee_standard.contains(bit) {
            out.push_str(line);
        }
    }

    Ok(out)
}

/// Render and write the hostapd configuration to `path`.
pub fn write_hostapd_config(cfg: &AccessPointConfig, path: &Path) -> Result<(), ConfigGenError> {
    let text = hostapd_config(cfg)?;
    write_or_remove(path, &text).map_err(|source| ConfigGenError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// ── dnsmasq ──────────────────────────────────────────────────────────

/// The additional hosts file: one `<ip> <hostname>` line.
pub fn hosts_file(ap: Ipv4Addr, host_name: &str) -> String {
    format!("{ap} {host_name}\n")
}

/// dnsmasq configuration serving DHCP and DNS on the AP interface.
pub fn dnsmasq_config(plan: &ResolvedPlan, domain_name: &str, hosts_path: &Path) -> String {
    let ap = plan.ap;
    format!(
        "bind-interfaces\n\
         listen-address={ap}\n\
         expand-hosts\n\
         addn-hosts={hosts}\n\
         domain={domain_name}\n\
         local=/{domain_name}/\n\
         dhcp-range={start},{stop},24h\n\
         dhcp-option=3,{ap}\n\
         dhcp-option=6,{ap}\n",
        hosts = hosts_path.display(),
        start = plan.start,
        stop = plan.stop,
    )
}

// ── polkit ───────────────────────────────────────────────────────────

/// Rule letting `user` manage devices through NetworkManager.
pub fn polkit_network_manager_rule(user: &str) -> String {
    format!(
        "polkit.addRule(function(action, subject) {{\n    \
         if (action.id.indexOf(\"org.freedesktop.NetworkManager.\") == 0 &&\n        \
         subject.user == \"{user}\") {{\n        \
         return polkit.Result.YES;\n    \
         }}\n\
         }});\n"
    )
}

/// Rule letting `user` change firewalld configuration.
pub fn polkit_firewalld_rule(user: &str) -> String {
    format!(
        "polkit.addRule(function(action, subject) {{\n    \
         if (action.id.indexOf(\"org.fedoraproject.FirewallD1.\") == 0 &&\n        \
         subject.user == \"{user}\") {{\n        \
         return polkit.Result.YES;\n    \
         }}\n\
         }});\n"
    )
}

// ── File helpers ─────────────────────────────────────────────────────

/// Write `contents` to `path`, deleting whatever was written on failure.
pub fn write_or_remove(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Err(e) = std::fs::write(path, contents) {
        let _ = std::fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn wpa2_config() -> AccessPointConfig {
        let mut cfg = AccessPointConfig::default();
        let _ = cfg.set_ssid("MyNet");
        let _ = cfg.set_channel(6);
        let _ = cfg.set_security_protocol("WPA2");
        let _ = cfg.set_passphrase("abcdefgh");
        let _ = cfg.set_country_code("FR");
        let _ = cfg.set_max_clients(8, 1000);
        cfg
    }

    #[test]
    fn hostapd_wpa2_passphrase() {
        let text = hostapd_config(&wpa2_config()).unwrap_or_default();
        assert_eq!(
            text,
            "driver=nl80211\n\
             wmm_enabled=1\n\
             beacon_int=100\n\
             dtim_period=2\n\
             rts_threshold=2347\n\
             fragm_threshold=2346\n\
             ctrl_interface=/var/run/hostapd\n\
             ctrl_interface_group=0\n\
             ssid=MyNet\n\
             channel=6\n\
             max_num_sta=8\n\
             country_code=FR\n\
             ignore_broadcast_ssid=0\n\
             wpa=2\n\
             wpa_key_mgmt=WPA-PSK\n\
             wpa_pairwise=CCMP\n\
             rsn_pairwise=CCMP\n\
             wpa_passphrase=abcdefgh\n\
             hw_mode=g\n"
        );
    }

    #[test]
    fn hostapd_prefers_passphrase_then_psk() {
        let mut cfg = wpa2_config();
        let _ = cfg.set_preshared_key("00112233");
        let text = hostapd_config(&cfg).unwrap_or_default();
        assert!(text.contains("wpa_passphrase=abcdefgh\n"));
        assert!(!text.contains("wpa_psk="));

        cfg.passphrase = secrecy::SecretString::from(String::new());
        let text = hostapd_config(&cfg).unwrap_or_default();
        assert!(text.contains("wpa_psk=00112233\n"));
    }

    #[test]
    fn hostapd_wpa2_without_secret_fails() {
        let mut cfg = wpa2_config();
        cfg.passphrase = secrecy::SecretString::from(String::new());
        assert!(matches!(
            hostapd_config(&cfg),
            Err(ConfigGenError::SecurityParamsMissing)
        ));
    }

    #[test]
    fn hostapd_open_network_hidden() {
        let mut cfg = wpa2_config();
        let _ = cfg.set_security_protocol("none");
        cfg.set_discoverable(false);
        cfg.country_code = None;
        let text = hostapd_config(&cfg).unwrap_or_default();
        assert!(text.contains("country_code=\nignore_broadcast_ssid=1\n"));
        assert!(text.contains(
            "auth_algs=1\neap_server=0\neapol_key_index_workaround=0\nmacaddr_acl=0\n"
        ));
        assert!(!text.contains("wpa="));
    }

    #[test]
    fn hostapd_amendment_lines_in_order() {
        let mut cfg = wpa2_config();
        cfg.ieee_standard = IeeeStandard::A
            | IeeeStandard::W
            | IeeeStandard::AC
            | IeeeStandard::N
            | IeeeStandard::D
            | IeeeStandard::H
            | IeeeStandard::AX;
        let text = hostapd_config(&cfg).unwrap_or_default();
        assert!(text.ends_with(
            "hw_mode=a\n\
             ieee80211d=1\n\
             ieee80211h=1\n\
             ieee80211n=1\n\
             ieee80211ac=1\n\
             ieee80211ax=1\n\
             ieee80211w=1\n"
        ));
    }

    #[test]
    fn hostapd_unrecognized_mode_defaults_to_g() {
        let mut cfg = wpa2_config();
        cfg.ieee_standard = IeeeStandard::A | IeeeStandard::B;
        let text = hostapd_config(&cfg).unwrap_or_default();
        assert!(text.contains("hw_mode=g\n"));
    }

    #[test]
    fn dnsmasq_and_hosts_text() {
        let plan =
            ResolvedPlan::parse("10.0.0.1", "10.0.0.100", "10.0.0.10", "255.255.255.0");
        let Ok(plan) = plan else {
            panic!("plan should parse");
        };
        assert_eq!(
            dnsmasq_config(&plan, "lan", Path::new("/tmp/add_hosts")),
            "bind-interfaces\n\
             listen-address=10.0.0.1\n\
             expand-hosts\n\
             addn-hosts=/tmp/add_hosts\n\
             domain=lan\n\
             local=/lan/\n\
             dhcp-range=10.0.0.10,10.0.0.100,24h\n\
             dhcp-option=3,10.0.0.1\n\
             dhcp-option=6,10.0.0.1\n"
        );
        assert_eq!(hosts_file(plan.ap, "gateway"), "10.0.0.1 gateway\n");
    }

    #[test]
    fn polkit_rules_name_the_user() {
        let nm = polkit_network_manager_rule("wifiap");
        assert!(nm.contains("org.freedesktop.NetworkManager."));
        assert!(nm.contains("subject.user == \"wifiap\""));
        let fw = polkit_firewalld_rule("wifiap");
        assert!(fw.contains("org.fedoraproject.FirewallD1."));
    }

    #[test]
    fn write_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = dir.path().join("missing-dir").join("hostapd.conf");
        let result = write_hostapd_config(&wpa2_config(), &path);
        assert!(matches!(result, Err(ConfigGenError::Write { .. })));
        assert!(!path.exists());

        let path = dir.path().join("hostapd.conf");
        assert!(write_hostapd_config(&wpa2_config(), &path).is_ok());
        let written = std::fs::read_to_string(&path).unwrap_or_default();
        assert!(written.starts_with("driver=nl80211\n"));
    }
}
