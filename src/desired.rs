//! Desired configuration file
//!
//! A TOML document of `[<type>.<name>]` tables:
//!
//! ```toml
//! [shoehorn_team.platform]
//! name = "platform"
//! slug = "platform"
//! members = [{ user_id = "u-1", role = "lead" }]
//! ```
//!
//! Attributes stored as JSON text may be written as TOML arrays or tables;
//! they are encoded to compact JSON before planning.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Attributes each type keeps as JSON text
fn json_text_fields(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "shoehorn_entity" => &["relations", "links", "licenses", "interfaces"],
        "shoehorn_team" => &["members", "metadata"],
        "shoehorn_integration" => &["config_json"],
        _ => &[],
    }
}

/// One configured instance
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredResource {
    pub address: String,
    pub type_name: String,
    pub attributes: Value,
}

/// Parsed desired configuration, keyed by address
#[derive(Debug, Default, Clone)]
pub struct DesiredConfig {
    pub resources: BTreeMap<String, DesiredResource>,
}

impl DesiredConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let document: toml::Table = toml::from_str(content)?;
        let mut resources = BTreeMap::new();

        for (type_name, instances) in document {
            let Some(instances) = instances.as_table() else {
                bail!("[{type_name}] must contain named instance tables");
            };
            for (name, attributes) in instances {
                if !attributes.is_table() {
                    bail!("{type_name}.{name} must be a table");
                }
                let mut attributes = serde_json::to_value(attributes)
                    .with_context(|| format!("Could not convert {type_name}.{name}"))?;
                encode_json_text(&type_name, &mut attributes)?;

                let address = format!("{type_name}.{name}");
                resources.insert(
                    address.clone(),
                    DesiredResource {
                        address,
                        type_name: type_name.clone(),
                        attributes,
                    },
                );
            }
        }

        Ok(Self { resources })
    }

    pub fn get(&self, address: &str) -> Option<&DesiredResource> {
        self.resources.get(address)
    }
}

fn encode_json_text(type_name: &str, attributes: &mut Value) -> Result<()> {
    let Some(object) = attributes.as_object_mut() else {
        return Ok(());
    };
    for field in json_text_fields(type_name) {
        if let Some(value) = object.get_mut(*field)
            && (value.is_array() || value.is_object())
        {
            *value = Value::String(serde_json::to_string(value)?);
        }
    }
    Ok(())
}
