// In: src/config.rs

//! The single source of truth for all dwimask pipeline configuration.
//!
//! This module defines the unified `MaskConfig` struct, which is designed to be
//! created once at the application boundary (the CLI) and then passed down
//! through the system by reference. Centralizing the settings here keeps the
//! workspace manager and the validation steps free of ambient global state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//==================================================================================
// I. The Unified MaskConfig
//==================================================================================

/// The single, unified configuration for one mask-derivation invocation.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub struct MaskConfig {
    /// Filename prefix for the scratch workspace directory. A random suffix
    /// is appended at creation time to keep concurrent invocations apart.
    #[serde(default = "default_scratch_prefix")]
    pub scratch_prefix: String,

    /// Parent directory in which the scratch workspace is created.
    /// Defaults to the process working directory when `None`.
    #[serde(default)]
    pub scratch_root: Option<PathBuf>,

    /// If true, the scratch workspace is kept on disk after the pipeline ends
    /// (success or failure) and its path is reported. For diagnostics only.
    #[serde(default)]
    pub retain_scratch: bool,

    /// If true, an already-existing output path is overwritten at export time.
    /// Without this, an existing output path is a validation failure.
    #[serde(default)]
    pub force_overwrite: bool,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            scratch_prefix: default_scratch_prefix(),
            scratch_root: None,
            retain_scratch: false,
            force_overwrite: false,
        }
    }
}

/// Helper for `serde` to provide the default scratch directory prefix.
fn default_scratch_prefix() -> String {
    "dwimask-tmp-".to_string()
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = MaskConfig::default();
        assert_eq!(config.scratch_prefix, "dwimask-tmp-");
        assert!(config.scratch_root.is_none());
        assert!(!config.retain_scratch);
        assert!(!config.force_overwrite);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: MaskConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.scratch_prefix, "dwimask-tmp-");
        assert!(!config.force_overwrite);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = MaskConfig::default();
        config.retain_scratch = true;
        config.scratch_root = Some(PathBuf::from("/tmp"));
        let json = serde_json::to_string(&config).unwrap();
        let back: MaskConfig = serde_json::from_str(&json).unwrap();
        assert!(back.retain_scratch);
        assert_eq!(back.scratch_root, Some(PathBuf::from("/tmp")));
    }
}
