//! CLI error types with miette diagnostics.
//!
//! Maps config and core failures into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use wifiap_config::ConfigError;
use wifiap_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("No configuration document given")]
    #[diagnostic(
        code(wifiap::no_config),
        help("Pass --config <FILE> or set WIFIAP_CONFIG.")
    )]
    NoConfig,

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(wifiap::config_not_found),
        help("Check the path given with --config or WIFIAP_CONFIG.")
    )]
    ConfigNotFound { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(wifiap::validation),
        help("Fix the value in the configuration document or unset it.")
    )]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(wifiap::config),
        help("The document must be a JSON object with a `config` object inside.")
    )]
    Config(Box<figment::Error>),

    // ── Runtime ──────────────────────────────────────────────────────

    #[error("Access point setup failed: {message}")]
    #[diagnostic(code(wifiap::core))]
    Core { message: String },

    #[error(transparent)]
    #[diagnostic(code(wifiap::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig => exit_code::USAGE,
            Self::ConfigNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::Config(_) => exit_code::CONFIG,
            Self::Core { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { path } => Self::ConfigNotFound {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(inner) => Self::Config(inner),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Param(e) => Self::Validation {
                field: "configuration".into(),
                reason: e.to_string(),
            },
            other => Self::Core {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_category() {
        assert_eq!(CliError::NoConfig.exit_code(), exit_code::USAGE);
        assert_eq!(
            CliError::ConfigNotFound { path: "x".into() }.exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(ConfigError::Validation {
                field: "ssid".into(),
                reason: "too long".into(),
            })
            .exit_code(),
            exit_code::CONFIG
        );
    }
}
