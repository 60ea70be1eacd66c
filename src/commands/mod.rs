// Declarative lifecycle commands
pub mod import;
pub mod plan;
pub mod refresh;

// Read-only commands
pub mod list;

use crate::cli::ConnectionArgs;
use crate::config::{Overrides, ProviderConfig};
use crate::state::ProviderState;
use anyhow::{Context, Result};
use shoehornkit::Client;
use std::path::PathBuf;

/// Build an API client from the config file layered under flags/env.
pub fn connect(connection: &ConnectionArgs) -> Result<Client> {
    let config = ProviderConfig::discover(connection.config.as_deref())?
        .merge(Overrides {
            host: connection.host.clone(),
            api_key: connection.api_key.clone(),
            timeout: connection.timeout,
        })
        .resolve()?;

    log::debug!("Connecting to {}", config.base_url());
    Client::new(config).context("Could not create Shoehorn client")
}

/// Explicit state file, or the default location
pub fn state_path(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).as_ref())),
        None => ProviderState::default_path(),
    }
}
