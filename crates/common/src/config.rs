//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! config:
//!
//! ```toml
//! max_open_files = 128
//! max_link_depth = 100
//! child_ordering = "creation"
//! preserve_data_on_resize = false
//! error_state = "return_code"
//! ```

use std::path::Path;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

/// Hard ceiling on simultaneously open files per session.
pub const MAX_OPEN_FILES: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the open-file slot table
    pub max_open_files: usize,
    /// Link hops allowed while resolving a single path
    pub max_link_depth: usize,
    pub child_ordering: ChildOrdering,
    /// Keep the overlapping prefix of a payload across a resize that
    /// leaves type and rank unchanged
    pub preserve_data_on_resize: bool,
    pub error_state: ErrorState,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_open_files: MAX_OPEN_FILES,
            max_link_depth: 100,
            child_ordering: ChildOrdering::default(),
            preserve_data_on_resize: false,
            error_state: ErrorState::default(),
        }
    }
}

/// How a node's children are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrdering {
    /// Explicit per-child counter, kept dense on delete and move
    #[default]
    Creation,
    /// Name order of the underlying store
    Name,
}

/// What a failing call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorState {
    #[default]
    ReturnCode,
    /// Print the message and exit the process
    Abort,
}

impl ErrorState {
    pub fn as_i32(self) -> i32 {
        match self {
            ErrorState::ReturnCode => 0,
            ErrorState::Abort => 1,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(s).context("failed to parse engine config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_open_files == 0 || self.max_open_files > MAX_OPEN_FILES {
            return Err(anyhow!(
                "max_open_files must be between 1 and {}, got {}",
                MAX_OPEN_FILES,
                self.max_open_files
            ));
        }
        if self.max_link_depth == 0 {
            return Err(anyhow!("max_link_depth must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            child_ordering = "name"
            error_state = "abort"
            max_link_depth = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.child_ordering, ChildOrdering::Name);
        assert_eq!(config.error_state, ErrorState::Abort);
        assert_eq!(config.max_link_depth, 8);
        assert_eq!(config.max_open_files, MAX_OPEN_FILES);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(EngineConfig::from_toml_str("max_open_files = 0").is_err());
        assert!(EngineConfig::from_toml_str("max_open_files = 129").is_err());
        assert!(EngineConfig::from_toml_str("max_link_depth = 0").is_err());
        assert!(EngineConfig::from_toml_str("child_ordering = \"random\"").is_err());
    }
}
