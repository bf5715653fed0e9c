//! `check-config`: load, validate and print the effective configuration.

use serde::Serialize;

use wifiap_config::RuntimeSection;
use wifiap_core::ConfigSummary;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Report {
    config: ConfigSummary,
    runtime: RuntimeSection,
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let file = super::load(global)?;
    let runtime = file.runtime.clone();
    let (config, _) = file.into_core()?;

    let report = Report {
        config: config.summary(),
        runtime,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| r.config.ssid.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(report: &Report, color: bool) -> String {
    let c = &report.config;
    let rt = &report.runtime;
    let or_unset = |s: &str| {
        if s.is_empty() {
            "(unset)".to_owned()
        } else {
            s.to_owned()
        }
    };
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    let lines = [
        output::detail_line("Interface", or_unset(&c.interface_name), color),
        output::detail_line("Hostname", or_unset(&c.host_name), color),
        output::detail_line("Domain", or_unset(&c.domain_name), color),
        output::detail_line("SSID", or_unset(&c.ssid), color),
        output::detail_line("Security", c.security_protocol, color),
        output::detail_line("Passphrase", yes_no(c.passphrase_set), color),
        output::detail_line("Pre-shared key", yes_no(c.preshared_key_set), color),
        output::detail_line(
            "Country",
            c.country_code.as_deref().unwrap_or("(unset)"),
            color,
        ),
        output::detail_line("IEEE mask", format!("{:#05x}", c.ieee_standard), color),
        output::detail_line("Channel", c.channel, color),
        output::detail_line("Max clients", c.max_clients, color),
        output::detail_line("Discoverable", yes_no(c.discoverable), color),
        output::detail_line("AP address", or_unset(&c.ip_ap), color),
        output::detail_line(
            "Client range",
            format!("{} - {}", or_unset(&c.ip_start), or_unset(&c.ip_stop)),
            color,
        ),
        output::detail_line("Netmask", or_unset(&c.ip_netmask), color),
        output::detail_line("Script", rt.script.display(), color),
        output::detail_line("hostapd.conf", rt.hostapd_conf.display(), color),
        output::detail_line("dnsmasq.conf", rt.dnsmasq_conf.display(), color),
        output::detail_line("Client cap", rt.max_clients_cap, color),
    ];
    lines.join("\n")
}
