// incremental updates: one aligned record at a time
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::error::IndexError;
use crate::core::index::AlignmentIndex;
use crate::core::propagate::{LinkDelta, TypeSlot};
use crate::core::types::{TypeEntry, TypeKey};

/// Tier -> value, both trimmed. Last value wins for a repeated tier; entries
/// with a blank tier or value are dropped.
pub(crate) fn normalize_record<I, K, V>(record: I) -> IndexMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    record
        .into_iter()
        .filter_map(|(tier, value)| {
            let (tier, value) = (tier.as_ref().trim(), value.as_ref().trim());
            (!tier.is_empty() && !value.is_empty()).then(|| (tier.to_string(), value.to_string()))
        })
        .collect()
}

impl AlignmentIndex {
    /// Locates or creates the type `value` on `tier`.
    pub(crate) fn ensure_type(&mut self, tier: &str, value: &str) -> Result<TypeSlot, IndexError> {
        let tier_node = self.ensure_tier(tier)?;
        let value_node = self.values.get_or_insert_with(value, Vec::new)?;

        if let Some(bucket) = self.values.value_mut(value_node) {
            if !bucket.iter().any(|e| e.tier == tier) {
                bucket.push(TypeEntry::new(tier));
                trace!(tier, value, "new type");
            }
        }

        Ok(TypeSlot {
            key: TypeKey::new(tier, value),
            tier: tier_node,
            value: value_node,
        })
    }

    /// Only types that were observed before; nothing is created.
    pub(crate) fn find_type(&self, tier: &str, value: &str) -> Option<TypeSlot> {
        let tier_node = self.tiers.node_for(tier)?;
        let value_node = self.values.node_for(value)?;
        let bucket = self.values.value(value_node)?;
        bucket.iter().any(|e| e.tier == tier).then(|| TypeSlot {
            key: TypeKey::new(tier, value),
            tier: tier_node,
            value: value_node,
        })
    }

    /// Registers `value` on `tier` without aligning it to anything.
    pub fn add_type_for_tier(&mut self, tier: &str, value: &str) -> Result<(), IndexError> {
        let (tier, value) = (tier.trim(), value.trim());
        if tier.is_empty() || value.is_empty() {
            return Err(IndexError::EmptyKey);
        }
        self.ensure_type(tier, value)?;
        Ok(())
    }

    /// Adds one aligned record: every pair of tiers in it gets its link
    /// counted once more, in both directions.
    pub fn add_aligned_morphemes<I, K, V>(&mut self, record: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let record = normalize_record(record);

        //reject before touching anything
        if !self.config.auto_register_tiers {
            if let Some(tier) = record.keys().find(|t| !self.tiers.contains_key(t)) {
                return Err(IndexError::UnknownTier(tier.clone()));
            }
        }

        //new types start at zero, so only pairs of known types can overflow
        let known: Vec<TypeSlot> = record
            .iter()
            .filter_map(|(tier, value)| self.find_type(tier, value))
            .collect();
        self.check_pairs(&known, LinkDelta::Increment)?;

        let mut slots = Vec::with_capacity(record.len());
        for (tier, value) in &record {
            slots.push(self.ensure_type(tier, value)?);
        }

        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                self.link_pair(a, b, LinkDelta::Increment)?;
            }
        }

        debug!(tiers = slots.len(), "added aligned record");
        Ok(())
    }

    /// Retracts one occurrence of a previously added record. Links that
    /// reach zero disappear; the types themselves stay registered.
    pub fn remove_aligned_morphemes<I, K, V>(&mut self, record: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let record = normalize_record(record);
        let slots: Vec<TypeSlot> = record
            .iter()
            .filter_map(|(tier, value)| self.find_type(tier, value))
            .collect();
        self.check_pairs(&slots, LinkDelta::Decrement)?;

        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                self.link_pair(a, b, LinkDelta::Decrement)?;
            }
        }

        debug!(tiers = slots.len(), "removed aligned record");
        Ok(())
    }
}
