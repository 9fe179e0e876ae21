use indexmap::IndexMap;
use tracing::warn;

use crate::config::IndexConfig;
use crate::core::linked::LinkedEntry;
use crate::core::tree::KeyTree;
use crate::core::types::{TierInfo, TierKind, TypeEntry, TypeKey};

/// Tier name -> tier metadata.
pub type TierCatalog = KeyTree<TierInfo>;

/// Observed value -> the tiers it was observed on.
pub type ValueIndex = KeyTree<Vec<TypeEntry>>;

/// Co-occurrence index across tiers.
///
/// Owns both trees and every [`LinkedEntry`]. Each observed type keeps one
/// entry per other tier it has been aligned with; an entry only points into
/// the value index, it never owns value data.
#[derive(Debug, Clone)]
pub struct AlignmentIndex {
    pub(crate) config: IndexConfig,
    pub(crate) tiers: TierCatalog,
    pub(crate) values: ValueIndex,
    pub(crate) links: IndexMap<TypeKey, Vec<LinkedEntry>>,
}

impl Default for AlignmentIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl AlignmentIndex {
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    pub fn with_config(config: IndexConfig) -> Self {
        let system_tiers = config.system_tiers.clone();
        let mut index = Self::empty(config);
        for name in system_tiers {
            if let Err(err) = index.register_tier(&name, TierKind::System) {
                warn!(tier = %name, %err, "skipping system tier");
            }
        }
        index
    }

    //no tiers at all; used when loading a persisted catalog
    pub(crate) fn empty(config: IndexConfig) -> Self {
        Self {
            config,
            tiers: TierCatalog::new(),
            values: ValueIndex::new(),
            links: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn tier_catalog(&self) -> &TierCatalog {
        &self.tiers
    }

    pub fn value_index(&self) -> &ValueIndex {
        &self.values
    }

    /// Number of distinct values observed on any tier.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}
