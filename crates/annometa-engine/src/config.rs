//! Engine configuration (`annometa.toml`)
//!
//! ```toml
//! max_meta_depth = 32
//! cache_synthesis = true
//! reject_unknown_attributes = false
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Tunables for metadata construction and synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Longest meta-annotation chain followed from a declared annotation
    #[serde(default = "default_max_meta_depth")]
    pub max_meta_depth: usize,

    /// Memoize synthesized instances per (element, annotation, scope)
    #[serde(default = "default_cache_synthesis")]
    pub cache_synthesis: bool,

    /// Fail synthesis when an entry carries attributes its contract does not declare
    #[serde(default)]
    pub reject_unknown_attributes: bool,
}

fn default_max_meta_depth() -> usize {
    32
}

fn default_cache_synthesis() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_meta_depth: default_max_meta_depth(),
            cache_synthesis: default_cache_synthesis(),
            reject_unknown_attributes: false,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Builder-style depth limit
    pub fn with_max_meta_depth(mut self, depth: usize) -> Self {
        self.max_meta_depth = depth;
        self
    }

    /// Builder-style cache toggle
    pub fn with_cache_synthesis(mut self, enabled: bool) -> Self {
        self.cache_synthesis = enabled;
        self
    }

    /// Builder-style strict attribute checking
    pub fn with_reject_unknown_attributes(mut self, reject: bool) -> Self {
        self.reject_unknown_attributes = reject;
        self
    }
}
