//! Verb dispatch: bridges wire requests -> core calls -> replies.

mod session;
mod verb;
mod wire;

pub use session::Session;
pub use verb::{ArgKind, Verb};
pub use wire::{Reply, ReplyStatus, Request};

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

use wifiap_core::{
    AccessPoint, CoreError, EventError, EventRegistry, IeeeStandard, SecurityProtocol,
    StartError, StartOutcome,
};

use self::wire::ArgError;

// ── Verb outcomes ────────────────────────────────────────────────────

/// A successful verb: reply text plus optional structured data.
struct Answer {
    info: String,
    data: Option<Value>,
}

impl Answer {
    fn text(info: impl Into<String>) -> Self {
        Self {
            info: info.into(),
            data: None,
        }
    }

    fn with_data(info: impl Into<String>, data: Value) -> Self {
        Self {
            info: info.into(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Error)]
enum Refusal {
    #[error(transparent)]
    Arg(#[from] ArgError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<EventError> for Refusal {
    fn from(err: EventError) -> Self {
        Self::Core(err.into())
    }
}

impl Refusal {
    fn status(&self) -> ReplyStatus {
        match self {
            Self::Arg(_)
            | Self::Core(
                CoreError::Param(_)
                | CoreError::Event(_)
                | CoreError::Start(StartError::NoSsid | StartError::NoValidChannel { .. }),
            ) => ReplyStatus::InvalidRequest,
            Self::Core(CoreError::Start(_) | CoreError::Stop(_)) => ReplyStatus::BadState,
            Self::Core(CoreError::Stations(_) | CoreError::Internal(_)) => {
                ReplyStatus::InternalError
            }
        }
    }

    fn code(&self) -> Option<i32> {
        match self {
            Self::Core(CoreError::Start(e)) => Some(e.code()),
            Self::Core(CoreError::Stop(e)) => Some(e.code()),
            _ => None,
        }
    }
}

type VerbResult = Result<Answer, Refusal>;

// ── Binding ──────────────────────────────────────────────────────────

/// Verb handlers bound to one access point.
#[derive(Debug, Clone)]
pub struct Binding {
    ap: AccessPoint,
}

impl Binding {
    pub fn new(ap: AccessPoint) -> Self {
        Self { ap }
    }

    pub fn events(&self) -> &EventRegistry {
        self.ap.events()
    }

    /// Run one request and build its reply.
    pub async fn handle(&self, session: &mut Session, request: Request) -> Reply {
        let Request { id, verb, args } = request;

        let Ok(parsed) = verb.parse::<Verb>() else {
            debug!(verb = %verb, "unknown verb");
            return Reply::new(
                id,
                ReplyStatus::InvalidRequest,
                format!("Unknown verb '{verb}'"),
            );
        };

        let name: &'static str = parsed.into();
        debug!(verb = name, "dispatching verb");

        match self.dispatch(session, parsed, &args).await {
            Ok(answer) => Reply {
                data: answer.data,
                ..Reply::new(id, ReplyStatus::Success, answer.info)
            },
            Err(refusal) => {
                info!(verb = name, error = %refusal, "verb refused");
                Reply {
                    code: refusal.code(),
                    ..Reply::new(id, refusal.status(), refusal.to_string())
                }
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    async fn dispatch(&self, session: &mut Session, verb: Verb, args: &Value) -> VerbResult {
        let ap = &self.ap;
        match verb {
            // ── Lifecycle ────────────────────────────────────────────
            Verb::Start => match ap.start().await? {
                StartOutcome::Started => Ok(Answer::text("Access point started successfully")),
                StartOutcome::AlreadyStarted => Ok(Answer::text("Access point already started")),
            },
            Verb::Stop => {
                ap.stop().await?;
                Ok(Answer::text("Access point stopped successfully"))
            }
            Verb::Restart => {
                ap.restart().await?;
                Ok(Answer::text("Access point restarted successfully"))
            }

            // ── Setters ──────────────────────────────────────────────
            Verb::SetSsid => {
                let value = wire::string_arg(args)?;
                ap.update(|c| c.set_ssid(value)).await?;
                Ok(Answer::text("SSID set successfully"))
            }
            Verb::SetInterfaceName => {
                let value = wire::string_arg(args)?;
                ap.update(|c| c.set_interface_name(value)).await?;
                Ok(Answer::text("Interface name set successfully"))
            }
            Verb::SetHostName => {
                let value = wire::string_arg(args)?;
                ap.update(|c| c.set_host_name(value)).await?;
                Ok(Answer::text("Hostname set successfully"))
            }
            Verb::SetDomainName => {
                let value = wire::string_arg(args)?;
                ap.update(|c| c.set_domain_name(value)).await?;
                Ok(Answer::text("Domain name set successfully"))
            }
            Verb::SetPassPhrase => {
                let value = wire::string_arg(args)?;
                ap.update(|c| c.set_passphrase(value)).await?;
                Ok(Answer::text("Passphrase set successfully"))
            }
            Verb::SetPreSharedKey => {
                let value = wire::string_arg(args)?;
                ap.update(|c| c.set_preshared_key(value)).await?;
                Ok(Answer::text("Pre-shared key set successfully"))
            }
            Verb::SetCountryCode => {
                let value = wire::string_arg(args)?;
                ap.update(|c| c.set_country_code(value)).await?;
                Ok(Answer::text("Country code set successfully"))
            }
            Verb::SetSecurityProtocol => {
                let value = wire::string_arg(args)?;
                let protocol = ap.update(|c| c.set_security_protocol(value)).await?;
                Ok(Answer::text(match protocol {
                    SecurityProtocol::None => "Security protocol set to none",
                    SecurityProtocol::Wpa2 => "Security protocol set to WPA2",
                }))
            }
            Verb::SetDiscoverable => {
                let value = wire::bool_arg(args)?;
                ap.update(|c| {
                    c.set_discoverable(value);
                    Ok(())
                })
                .await?;
                Ok(Answer::text("AP discoverability set successfully"))
            }
            Verb::SetIeeeStandard => {
                let mask = IeeeStandard::from_bits_retain(wire::u32_arg(args)?);
                ap.update(|c| c.set_ieee_standard(mask)).await?;
                Ok(Answer::text("IEEE standard set successfully"))
            }
            Verb::SetChannel => {
                let channel = wire::u32_arg(args)?;
                ap.update(|c| c.set_channel(channel)).await?;
                Ok(Answer::text("Channel number set successfully"))
            }
            Verb::SetMaxNumberClients => {
                ap.set_max_clients(wire::u32_arg(args)?).await?;
                Ok(Answer::text("Max number of clients set successfully"))
            }
            Verb::SetIpRange => {
                let range = wire::ip_range_arg(args)?;
                let plan = ap
                    .update(|c| {
                        c.set_ip_range(
                            &range.ip_ap,
                            &range.ip_start,
                            &range.ip_stop,
                            &range.ip_netmask,
                        )
                    })
                    .await?;
                Ok(Answer::with_data(
                    "IP range set successfully",
                    json!({
                        "ip_ap": plan.ap.to_string(),
                        "ip_start": plan.start.to_string(),
                        "ip_stop": plan.stop.to_string(),
                        "ip_netmask": plan.netmask.to_string(),
                    }),
                ))
            }

            // ── Queries ──────────────────────────────────────────────
            Verb::GetIeeeStandard => {
                let mask = ap.ieee_standard().await;
                Ok(Answer::with_data(
                    format!("IEEE standard for WiFiAP is {}", mask.bits()),
                    json!(mask.bits()),
                ))
            }
            Verb::GetApClientsNumber => {
                let count = ap.client_count().await?;
                Ok(Answer::with_data(
                    format!("Number of clients: {count}"),
                    json!(count),
                ))
            }
            Verb::GetWifiApStatus => {
                let status = ap.status();
                Ok(Answer::with_data(
                    format!("WiFiAP status: {status}"),
                    json!(status),
                ))
            }

            // ── Events ───────────────────────────────────────────────
            Verb::Subscribe => {
                let name = wire::string_arg(args)?;
                session.subscribe(name)?;
                Ok(Answer::text(format!("Subscribed to {name}")))
            }
            Verb::Unsubscribe => {
                let name = wire::string_arg(args)?;
                session.unsubscribe(name).await?;
                Ok(Answer::text(format!("Unsubscribed from {name}")))
            }
        }
    }
}
