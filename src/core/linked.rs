// counted links from one type to the value buckets of one other tier
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::OverflowPolicy;
use crate::core::error::IndexError;
use crate::core::index::{TierCatalog, ValueIndex};
use crate::core::types::{Count, NodeId, TreePath};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TierRef {
    Resolved(NodeId),
    Unresolved(TreePath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Links {
    Resolved(IndexMap<NodeId, Count>),
    Unresolved(Vec<(TreePath, Count)>),
}

/// Counts, for its owning tier, how many times each value bucket of the
/// [`ValueIndex`] has been aligned with it.
///
/// Freshly loaded entries only carry tree paths. The first access that
/// needs a node handle resolves them against the live tree and keeps the
/// handles from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedEntry {
    tier: TierRef,
    links: Links,
}

/// Persisted layout of one [`LinkedEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedEntryRecord {
    pub tier: TreePath,
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub path: TreePath,
    pub count: Count,
}

impl LinkedEntry {
    pub fn new(tier: NodeId) -> Self {
        Self::with_links(tier, IndexMap::new())
    }

    pub fn with_links(tier: NodeId, links: IndexMap<NodeId, Count>) -> Self {
        Self {
            tier: TierRef::Resolved(tier),
            links: Links::Resolved(links),
        }
    }

    /// Keeps the raw paths only; nothing is looked up until first use.
    pub fn from_record(record: LinkedEntryRecord) -> Self {
        Self {
            tier: TierRef::Unresolved(record.tier),
            links: Links::Unresolved(record.links.into_iter().map(|l| (l.path, l.count)).collect()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.tier, TierRef::Resolved(_)) && matches!(self.links, Links::Resolved(_))
    }

    pub fn tier_node(&mut self, catalog: &TierCatalog) -> Result<NodeId, IndexError> {
        let node = match &self.tier {
            TierRef::Resolved(node) => return Ok(*node),
            TierRef::Unresolved(path) => {
                let node = catalog
                    .find_node(path)
                    .ok_or_else(|| IndexError::UnresolvedTierPath(path.clone()))?;
                trace!(%path, node, "resolved tier path");
                node
            }
        };
        self.tier = TierRef::Resolved(node);
        Ok(node)
    }

    pub fn tier_name(&mut self, catalog: &TierCatalog) -> Result<String, IndexError> {
        let node = self.tier_node(catalog)?;
        catalog
            .value(node)
            .map(|info| info.tier_name.clone())
            .ok_or(IndexError::InvalidState("tier handle does not belong to the catalog"))
    }

    fn resolve_links(&mut self, values: &ValueIndex) -> Result<&mut IndexMap<NodeId, Count>, IndexError> {
        if let Links::Unresolved(paths) = &self.links {
            //all or nothing: a failed resolution leaves the paths in place
            let mut resolved = IndexMap::with_capacity(paths.len());
            for (path, count) in paths {
                let node = values
                    .find_node(path)
                    .ok_or_else(|| IndexError::UnresolvedValuePath(path.clone()))?;
                resolved.insert(node, *count);
            }
            trace!(links = resolved.len(), "resolved link paths");
            self.links = Links::Resolved(resolved);
        }

        match &mut self.links {
            Links::Resolved(map) => Ok(map),
            Links::Unresolved(_) => Err(IndexError::InvalidState("link paths left unresolved")),
        }
    }

    pub fn linked_counts(&mut self, values: &ValueIndex) -> Result<&IndexMap<NodeId, Count>, IndexError> {
        Ok(self.resolve_links(values)?)
    }

    pub fn linked_nodes(&mut self, values: &ValueIndex) -> Result<Vec<NodeId>, IndexError> {
        Ok(self.linked_counts(values)?.keys().copied().collect())
    }

    /// 0 when `node` was never linked.
    pub fn count_for(&mut self, values: &ValueIndex, node: NodeId) -> Result<Count, IndexError> {
        Ok(self.linked_counts(values)?.get(&node).copied().unwrap_or(0))
    }

    /// Registers `node` without recording an occurrence.
    pub fn add_link(&mut self, values: &ValueIndex, node: NodeId) -> Result<(), IndexError> {
        self.resolve_links(values)?.entry(node).or_insert(0);
        Ok(())
    }

    pub fn increment_link(
        &mut self,
        values: &ValueIndex,
        node: NodeId,
        policy: OverflowPolicy,
    ) -> Result<Count, IndexError> {
        let links = self.resolve_links(values)?;
        let next = policy.increment(links.get(&node).copied().unwrap_or(0))?;
        links.insert(node, next);
        Ok(next)
    }

    /// Drops the link once its count reaches zero.
    pub fn decrement_link(&mut self, values: &ValueIndex, node: NodeId) -> Result<Count, IndexError> {
        let links = self.resolve_links(values)?;
        let next = links.get(&node).copied().unwrap_or(0).saturating_sub(1);
        if next > 0 {
            links.insert(node, next);
        } else {
            links.shift_remove(&node);
        }
        Ok(next)
    }

    /// Live handles are written as their current paths; unresolved paths
    /// are replayed as loaded.
    pub fn to_record(&self, catalog: &TierCatalog, values: &ValueIndex) -> Result<LinkedEntryRecord, IndexError> {
        let tier = match &self.tier {
            TierRef::Resolved(node) => catalog
                .path_of(*node)
                .ok_or(IndexError::InvalidState("tier handle does not belong to the catalog"))?,
            TierRef::Unresolved(path) => path.clone(),
        };

        let links = match &self.links {
            Links::Resolved(map) => map
                .iter()
                .map(|(&node, &count)| {
                    values
                        .path_of(node)
                        .map(|path| LinkRecord { path, count })
                        .ok_or(IndexError::InvalidState("linked handle does not belong to the value index"))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Links::Unresolved(paths) => paths
                .iter()
                .map(|(path, count)| LinkRecord { path: path.clone(), count: *count })
                .collect(),
        };

        Ok(LinkedEntryRecord { tier, links })
    }
}
