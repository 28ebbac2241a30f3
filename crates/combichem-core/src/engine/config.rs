use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Settings for one assembly run.
///
/// The per-node cap is advisory: it is checked after each chunk, so a node may return up to
/// `max_per_node + chunk_size - 1` items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AssemblyConfig {
    pub chunk_size: usize,
    /// Stop drawing chunks at a node once this many items have been accepted. The comparison
    /// is inclusive: reaching the cap stops generation, exceeding it is not required.
    pub max_per_node: usize,
    #[serde(default = "default_log_provenance")]
    pub log_provenance: bool,
}

fn default_log_provenance() -> bool {
    true
}

impl AssemblyConfig {
    pub fn builder() -> AssemblyConfigBuilder {
        AssemblyConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "chunk_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_per_node == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_per_node",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct AssemblyConfigBuilder {
    chunk_size: Option<usize>,
    max_per_node: Option<usize>,
    log_provenance: Option<bool>,
}

impl AssemblyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }
    pub fn max_per_node(mut self, cap: usize) -> Self {
        self.max_per_node = Some(cap);
        self
    }
    pub fn log_provenance(mut self, enabled: bool) -> Self {
        self.log_provenance = Some(enabled);
        self
    }

    pub fn build(self) -> Result<AssemblyConfig, ConfigError> {
        let config = AssemblyConfig {
            chunk_size: self
                .chunk_size
                .ok_or(ConfigError::MissingParameter("chunk_size"))?,
            max_per_node: self
                .max_per_node
                .ok_or(ConfigError::MissingParameter("max_per_node"))?,
            log_provenance: self.log_provenance.unwrap_or_else(default_log_provenance),
        };
        config.validate()?;
        Ok(config)
    }
}
