use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::AppliedChange;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// State Structures
// ============================================================================

/// Persisted state of every tracked instance, keyed by address
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderState {
    /// Tracked instances (`type.name` -> attributes)
    #[serde(default)]
    pub resources: BTreeMap<String, TrackedResource>,

    /// Last time the state was written
    pub last_updated: DateTime<Utc>,
}

/// One tracked instance
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrackedResource {
    #[serde(rename = "type")]
    pub type_name: String,

    /// Attributes as the adapter last reported them
    pub attributes: Value,
}

// ============================================================================
// ProviderState Implementation
// ============================================================================

impl ProviderState {
    /// Default state file (`~/.local/state/shoehorn/state.json`)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home
            .join(".local")
            .join("state")
            .join("shoehorn")
            .join("state.json"))
    }

    /// Load state from disk, or return an empty state if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, using empty state", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded {} instance(s) from {}", state.resources.len(), path.display());
        Ok(state)
    }

    /// Save state to disk, stamping `last_updated`
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.last_updated = Utc::now();
        let content =
            serde_json::to_string_pretty(&self).context("Failed to serialize state to JSON")?;

        fs::write(path, content + "\n")
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Attributes of one instance
    pub fn get(&self, address: &str) -> Option<&Value> {
        self.resources.get(address).map(|r| &r.attributes)
    }

    /// Record or replace an instance
    pub fn upsert(&mut self, address: &str, type_name: &str, attributes: Value) {
        self.resources.insert(
            address.to_string(),
            TrackedResource {
                type_name: type_name.to_string(),
                attributes,
            },
        );
    }

    /// Stop tracking an instance
    pub fn remove(&mut self, address: &str) -> Option<TrackedResource> {
        self.resources.remove(address)
    }

    /// Fold executor outcomes back into state
    pub fn record(&mut self, type_of: impl Fn(&str) -> Option<String>, applied: Vec<AppliedChange>) {
        for change in applied {
            match change.state {
                Some(attributes) => {
                    let type_name = type_of(&change.address)
                        .or_else(|| self.resources.get(&change.address).map(|r| r.type_name.clone()))
                        .unwrap_or_default();
                    self.upsert(&change.address, &type_name, attributes);
                }
                None => {
                    self.remove(&change.address);
                }
            }
        }
    }
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            resources: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
