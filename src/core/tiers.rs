// tier registration
use tracing::debug;

use crate::core::error::IndexError;
use crate::core::index::AlignmentIndex;
use crate::core::types::{NodeId, TierInfo, TierKind};

impl AlignmentIndex {
    //1. tier names are unique, a second registration is rejected and changes nothing
    //2. position is the registration order, listings sort by it
    pub(crate) fn register_tier(&mut self, name: &str, kind: TierKind) -> Result<NodeId, IndexError> {
        if self.tiers.contains_key(name) {
            return Err(IndexError::DuplicateTierEntry(name.to_string()));
        }

        let position = u32::try_from(self.tiers.len()).map_err(|_| IndexError::TreeFull)?;
        let node = self.tiers.insert(name, TierInfo::new(name, kind, position))?;
        debug!(tier = name, ?kind, position, "registered tier");
        Ok(node)
    }

    pub fn add_user_tier(&mut self, name: &str) -> Result<NodeId, IndexError> {
        self.register_tier(name, TierKind::User)
    }

    //node for a tier met in an aligned record
    pub(crate) fn ensure_tier(&mut self, name: &str) -> Result<NodeId, IndexError> {
        match self.tiers.node_for(name) {
            Some(node) => Ok(node),
            None if self.config.auto_register_tiers => self.register_tier(name, TierKind::User),
            None => Err(IndexError::UnknownTier(name.to_string())),
        }
    }

    pub fn has_tier(&self, name: &str) -> bool {
        self.tiers.contains_key(name)
    }

    pub fn tier_info(&self) -> Vec<TierInfo> {
        let mut info: Vec<TierInfo> = self.tiers.iter().map(|(_, t)| t.clone()).collect();
        info.sort_by_key(|t| t.position);
        info
    }

    pub fn tier_names(&self) -> Vec<String> {
        self.tier_info().into_iter().map(|t| t.tier_name).collect()
    }
}
