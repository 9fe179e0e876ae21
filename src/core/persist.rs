//! Whole-index persistence.
//!
//! Trees are written as their insertion history, linked entries as tree
//! paths. Loading rebuilds the trees and leaves every linked entry in its
//! path form; entries resolve against the rebuilt trees on first use.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IndexConfig;
use crate::core::error::IndexError;
use crate::core::index::{AlignmentIndex, TierCatalog, ValueIndex};
use crate::core::linked::{LinkedEntry, LinkedEntryRecord};
use crate::core::tree::TreeRecord;
use crate::core::types::{TierInfo, TypeEntry, TypeKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub tiers: TreeRecord<TierInfo>,
    pub values: TreeRecord<Vec<TypeEntry>>,
    pub links: Vec<TypeLinksRecord>,
}

/// Linked entries of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLinksRecord {
    pub tier: String,
    pub value: String,
    pub entries: Vec<LinkedEntryRecord>,
}

fn io_error(path: &Path, err: std::io::Error) -> IndexError {
    IndexError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl AlignmentIndex {
    pub fn to_record(&self) -> Result<IndexRecord, IndexError> {
        let links = self
            .links
            .iter()
            .map(|(key, entries)| {
                let entries = entries
                    .iter()
                    .map(|e| e.to_record(&self.tiers, &self.values))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<_, IndexError>(TypeLinksRecord {
                    tier: key.tier.clone(),
                    value: key.value.clone(),
                    entries,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(IndexRecord {
            tiers: self.tiers.to_record()?,
            values: self.values.to_record()?,
            links,
        })
    }

    /// Rebuilds the trees; linked entries stay unresolved.
    pub fn from_record(record: IndexRecord, config: IndexConfig) -> Result<Self, IndexError> {
        let mut index = Self::empty(config);
        index.tiers = TierCatalog::from_record(record.tiers)?;
        index.values = ValueIndex::from_record(record.values)?;

        let mut links = IndexMap::with_capacity(record.links.len());
        for type_links in record.links {
            let entries = type_links
                .entries
                .into_iter()
                .map(LinkedEntry::from_record)
                .collect::<Vec<_>>();
            links.insert(TypeKey::new(type_links.tier, type_links.value), entries);
        }
        index.links = links;

        debug!(
            tiers = index.tiers.len(),
            values = index.values.len(),
            types = index.links.len(),
            "loaded alignment index"
        );
        Ok(index)
    }

    pub fn to_toon(&self) -> Result<String, IndexError> {
        toon_format::encode_default(&self.to_record()?).map_err(|e| IndexError::Codec(e.to_string()))
    }

    pub fn from_toon(input: &str) -> Result<Self, IndexError> {
        Self::from_toon_with_config(input, IndexConfig::default())
    }

    pub fn from_toon_with_config(input: &str, config: IndexConfig) -> Result<Self, IndexError> {
        let record: IndexRecord =
            toon_format::decode_default(input).map_err(|e| IndexError::Codec(e.to_string()))?;
        Self::from_record(record, config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let path = path.as_ref();
        let text = self.to_toon()?;
        fs::write(path, text).map_err(|e| io_error(path, e))?;
        debug!(path = %path.display(), "saved alignment index");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, config: IndexConfig) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        Self::from_toon_with_config(&text, config)
    }

    /// Resolves every linked entry now instead of on first use.
    pub fn resolve_all(&mut self) -> Result<(), IndexError> {
        let Self { tiers, values, links, .. } = self;
        for entry in links.values_mut().flatten() {
            entry.tier_node(tiers)?;
            entry.linked_counts(values)?;
        }
        Ok(())
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.links.values().flatten().all(LinkedEntry::is_resolved)
    }
}
