//! JSON-lines wire format of the verb protocol.
//!
//! Requests: `{"id": <any>, "verb": "<verb>", "args": <json>}`.
//! Replies: `{"id": ..., "status": ..., "info": ..., "code"?, "data"?}`.
//! Event pushes: `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use wifiap_core::ApEvent;

// ── Requests ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Echoed back in the reply.
    #[serde(default)]
    pub id: Value,
    pub verb: String,
    #[serde(default)]
    pub args: Value,
}

// ── Replies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReplyStatus {
    Success,
    InvalidRequest,
    BadState,
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub id: Value,
    pub status: ReplyStatus,
    pub info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Reply {
    pub fn new(id: Value, status: ReplyStatus, info: impl Into<String>) -> Self {
        Self {
            id,
            status,
            info: info.into(),
            code: None,
            data: None,
        }
    }

    /// Reply to a line that did not parse as a request.
    pub fn malformed(error: &serde_json::Error) -> Self {
        Self::new(
            Value::Null,
            ReplyStatus::InvalidRequest,
            format!("Malformed request: {error}"),
        )
    }

    pub fn is_success(&self) -> bool {
        self.status == ReplyStatus::Success
    }

    /// One output line, without the trailing newline.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"id":null,"status":"internal-error","info":"reply encoding failed: {e}"}}"#)
        })
    }
}

// ── Event pushes ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EventPush<'a> {
    pub event: &'a str,
    pub data: &'a ApEvent,
}

impl EventPush<'_> {
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ── Argument extraction ──────────────────────────────────────────────

/// Why a verb argument was rejected before reaching the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("Missing parameter")]
    Missing,
    #[error("Bad data type, expected {expected}")]
    BadType { expected: &'static str },
    #[error("Invalid JSON format: {reason}")]
    BadJson { reason: String },
}

/// The single argument of a verb. `{"value": x}` is unwrapped to `x`.
fn scalar(args: &Value) -> Result<&Value, ArgError> {
    let value = match args {
        Value::Object(map) if map.len() == 1 && map.contains_key("value") => &map["value"],
        other => other,
    };
    if value.is_null() {
        return Err(ArgError::Missing);
    }
    Ok(value)
}

pub fn string_arg(args: &Value) -> Result<&str, ArgError> {
    scalar(args)?
        .as_str()
        .ok_or(ArgError::BadType { expected: "string" })
}

pub fn u32_arg(args: &Value) -> Result<u32, ArgError> {
    scalar(args)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(ArgError::BadType {
            expected: "unsigned 32-bit integer",
        })
}

pub fn bool_arg(args: &Value) -> Result<bool, ArgError> {
    scalar(args)?
        .as_bool()
        .ok_or(ArgError::BadType { expected: "boolean" })
}

/// Arguments of `setIpRange`. Also accepted as a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IpRangeArgs {
    pub ip_ap: String,
    pub ip_start: String,
    pub ip_stop: String,
    pub ip_netmask: String,
}

pub fn ip_range_arg(args: &Value) -> Result<IpRangeArgs, ArgError> {
    let bad_json = |e: serde_json::Error| ArgError::BadJson {
        reason: e.to_string(),
    };
    match scalar(args)? {
        Value::String(text) => serde_json::from_str(text).map_err(bad_json),
        object @ Value::Object(_) => IpRangeArgs::deserialize(object).map_err(bad_json),
        _ => Err(ArgError::BadType { expected: "object" }),
    }
}
