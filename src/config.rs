// index configuration, read from TOON
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::IndexError;
use crate::core::types::Count;

/// What happens when a link count would pass `u32::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    #[default]
    Fail,
    Saturate,
}

impl OverflowPolicy {
    pub fn increment(self, count: Count) -> Result<Count, IndexError> {
        match self {
            OverflowPolicy::Fail => count.checked_add(1).ok_or(IndexError::CountOverflow),
            OverflowPolicy::Saturate => Ok(count.saturating_add(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Tiers every new index starts with.
    pub system_tiers: Vec<String>,
    pub overflow: OverflowPolicy,
    /// Register unknown tiers met in aligned records instead of rejecting them.
    pub auto_register_tiers: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            system_tiers: ["Orthography", "IPA Target", "IPA Actual", "Notes"]
                .into_iter()
                .map(String::from)
                .collect(),
            overflow: OverflowPolicy::default(),
            auto_register_tiers: true,
        }
    }
}

impl IndexConfig {
    pub fn from_toon_str(input: &str) -> Result<Self, IndexError> {
        toon_format::decode_default(input).map_err(|e| IndexError::Codec(e.to_string()))
    }

    pub fn to_toon_string(&self) -> Result<String, IndexError> {
        toon_format::encode_default(self).map_err(|e| IndexError::Codec(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| IndexError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toon_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_lists_system_tiers_and_fails_on_overflow() {
        let cfg = IndexConfig::default();
        assert_eq!(cfg.system_tiers, vec!["Orthography", "IPA Target", "IPA Actual", "Notes"]);
        assert_eq!(cfg.overflow, OverflowPolicy::Fail);
        assert!(cfg.auto_register_tiers);
    }

    #[test]
    fn partial_toon_config_falls_back_to_defaults() {
        let cfg = IndexConfig::from_toon_str("overflow: saturate\nauto_register_tiers: false\n").unwrap();
        assert_eq!(cfg.overflow, OverflowPolicy::Saturate);
        assert!(!cfg.auto_register_tiers);
        assert_eq!(cfg.system_tiers, IndexConfig::default().system_tiers);
    }

    #[test]
    fn config_survives_toon_round_trip() {
        let cfg = IndexConfig {
            system_tiers: vec!["Orthography".to_string(), "Gloss".to_string()],
            overflow: OverflowPolicy::Saturate,
            auto_register_tiers: false,
        };
        let text = cfg.to_toon_string().unwrap();
        assert_eq!(IndexConfig::from_toon_str(&text).unwrap(), cfg);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toon");
        match IndexConfig::load(&missing).unwrap_err() {
            IndexError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn overflow_policies() {
        assert_eq!(OverflowPolicy::Fail.increment(1).unwrap(), 2);
        assert_eq!(OverflowPolicy::Fail.increment(u32::MAX).unwrap_err(), IndexError::CountOverflow);
        assert_eq!(OverflowPolicy::Saturate.increment(u32::MAX).unwrap(), u32::MAX);
    }
}
