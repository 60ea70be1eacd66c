use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use shoehornkit::{ClientConfig, DEFAULT_TIMEOUT, RetryConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MISSING_HOST: &str = "Missing Host: The provider requires a host to be set. \
     Set 'host' in the config file, the --host flag, or the SHOEHORN_HOST environment variable.";
const MISSING_API_KEY: &str = "Missing API Key: The provider requires an API key. \
     Set 'api_key' in the config file, the --api-key flag, or the SHOEHORN_API_KEY environment variable.";

/// Get the default provider config path (`<config dir>/shoehorn/provider.toml`)
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join("shoehorn").join("provider.toml"))
}

// ============================================================================
// Provider Config
// ============================================================================

/// Contents of `provider.toml`. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub host: Option<String>,
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
    pub retry: Option<RetrySection>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
}

/// Values from flags or their environment variables; these win over the file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load the explicit path, or the default path if it exists
    ///
    /// An explicit path must exist; the default one is optional.
    pub fn discover(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            let expanded = shellexpand::tilde(path);
            return Self::load(Path::new(expanded.as_ref()));
        }
        let path = default_config_path()?;
        if path.exists() {
            log::debug!("Using config file {}", path.display());
            Self::load(&path)
        } else {
            log::debug!("No config file at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Layer overrides on top of the file values
    pub fn merge(mut self, overrides: Overrides) -> Self {
        let set = |value: Option<String>| value.filter(|v| !v.is_empty());
        if let Some(host) = set(overrides.host) {
            self.host = Some(host);
        }
        if let Some(key) = set(overrides.api_key) {
            self.api_key = Some(key);
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = Some(timeout);
        }
        self
    }

    /// Validate and build the client configuration
    ///
    /// Both a missing host and a missing key are reported at once.
    pub fn resolve(&self) -> Result<ClientConfig> {
        let present = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
        let host = present(&self.host);
        let api_key = present(&self.api_key);

        let mut missing = Vec::new();
        if host.is_none() {
            missing.push(MISSING_HOST);
        }
        if api_key.is_none() {
            missing.push(MISSING_API_KEY);
        }
        let (Some(host), Some(api_key)) = (host, api_key) else {
            bail!("{}", missing.join("\n"));
        };

        let timeout = self.timeout.map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        let mut retry = RetryConfig::default();
        if let Some(section) = &self.retry {
            if let Some(attempts) = section.max_attempts {
                retry.max_attempts = attempts.max(1);
            }
            if let Some(ms) = section.backoff_ms {
                retry.backoff_step = Duration::from_millis(ms);
            }
        }

        Ok(ClientConfig::new(host, api_key)
            .with_timeout(timeout)
            .with_retry(retry))
    }
}

// ============================================================================
// Tests
// ============================================================================
