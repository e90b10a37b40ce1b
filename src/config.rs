use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_STORAGE_URI: &str = "memory://";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_storage_uri")]
    pub uri: String,
}

fn default_storage_uri() -> String {
    DEFAULT_STORAGE_URI.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uri: default_storage_uri(),
        }
    }
}

/// Identity of one access-layer client and where its documents live.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ClientConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            storage: StorageConfig::default(),
        }
    }

    pub fn with_storage_uri(mut self, uri: impl Into<String>) -> Self {
        self.storage.uri = uri.into();
        self
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: ClientConfig =
            serde_yaml::from_str(raw).context("Failed to parse client config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: ClientConfig =
            serde_json::from_str(raw).context("Failed to parse client config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            anyhow::bail!("Client config is missing 'id'");
        }
        Url::parse(&self.storage.uri)
            .with_context(|| format!("Invalid storage URI: {}", self.storage.uri))?;
        Ok(())
    }
}
