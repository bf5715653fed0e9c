//! Command dispatch: bridges CLI args -> config/core -> output formatting.

pub mod check;
pub mod serve;
pub mod verbs;

use std::path::Path;

use wifiap_config::ConfigFile;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Serve(args) => serve::handle(args, global).await,
        Command::CheckConfig => check::handle(global),
        Command::Verbs => {
            verbs::handle(global);
            Ok(())
        }
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}

/// Load the document named by `--config` / `WIFIAP_CONFIG`.
fn load(global: &GlobalOpts) -> Result<ConfigFile, CliError> {
    let path: &Path = global.config.as_deref().ok_or(CliError::NoConfig)?;
    tracing::debug!(path = %path.display(), "loading configuration");
    Ok(wifiap_config::load_config(path)?)
}
