use indexmap::IndexMap;

use crate::core::error::IndexError;
use crate::core::index::{AlignmentIndex, TierCatalog};
use crate::core::linked::LinkedEntry;
use crate::core::types::{Count, NodeId, TypeKey};

/// A type located in both trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeSlot {
    pub key: TypeKey,
    pub tier: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkDelta {
    Increment,
    Decrement,
}

impl AlignmentIndex {
    /// Entry of type `owner` that links towards tier `tier`.
    ///
    /// With `create` set a missing entry is added, otherwise `Ok(None)`.
    pub(crate) fn linked_entry_mut<'a>(
        links: &'a mut IndexMap<TypeKey, Vec<LinkedEntry>>,
        tiers: &TierCatalog,
        owner: &TypeKey,
        tier: NodeId,
        create: bool,
    ) -> Result<Option<&'a mut LinkedEntry>, IndexError> {
        let entries = if create {
            links.entry(owner.clone()).or_default()
        } else {
            match links.get_mut(owner) {
                Some(entries) => entries,
                None => return Ok(None),
            }
        };

        let mut found = None;
        for (i, entry) in entries.iter_mut().enumerate() {
            if entry.tier_node(tiers)? == tier {
                found = Some(i);
                break;
            }
        }

        match found {
            Some(i) => Ok(entries.get_mut(i)),
            None if create => {
                entries.push(LinkedEntry::new(tier));
                Ok(entries.last_mut())
            }
            None => Ok(None),
        }
    }

    //count recorded on `from` towards `to`, resolving the entry if it was just loaded
    fn directed_count(&mut self, from: &TypeSlot, to: &TypeSlot, create: bool) -> Result<Count, IndexError> {
        let Self { tiers, values, links, .. } = self;
        match Self::linked_entry_mut(links, tiers, &from.key, to.tier, create)? {
            Some(entry) => entry.count_for(values, to.value),
            None => Ok(0),
        }
    }

    fn directed_step(&mut self, from: &TypeSlot, to: &TypeSlot, delta: LinkDelta) -> Result<(), IndexError> {
        let Self { config, tiers, values, links } = self;
        let create = delta == LinkDelta::Increment;
        let Some(entry) = Self::linked_entry_mut(links, tiers, &from.key, to.tier, create)? else {
            return Ok(());
        };

        match delta {
            LinkDelta::Increment => {
                entry.increment_link(values, to.value, config.overflow)?;
            }
            LinkDelta::Decrement => {
                entry.decrement_link(values, to.value)?;
            }
        }
        Ok(())
    }

    /// Resolves every pair of `slots` in both directions and, for an
    /// increment, checks that none of them would overflow. Writes nothing.
    pub(crate) fn check_pairs(&mut self, slots: &[TypeSlot], delta: LinkDelta) -> Result<(), IndexError> {
        let policy = self.config.overflow;
        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                let forward = self.directed_count(a, b, false)?;
                let backward = self.directed_count(b, a, false)?;
                if delta == LinkDelta::Increment {
                    policy.increment(forward)?;
                    policy.increment(backward)?;
                }
            }
        }
        Ok(())
    }

    /// Records or retracts one co-occurrence of `a` and `b` in both directions.
    ///
    /// Both directions are resolved and checked before either is written,
    /// so `a -> b` and `b -> a` always carry the same count.
    pub(crate) fn link_pair(&mut self, a: &TypeSlot, b: &TypeSlot, delta: LinkDelta) -> Result<(), IndexError> {
        let create = delta == LinkDelta::Increment;
        let forward = self.directed_count(a, b, create)?;
        let backward = self.directed_count(b, a, create)?;

        if delta == LinkDelta::Increment {
            let policy = self.config.overflow;
            policy.increment(forward)?;
            policy.increment(backward)?;
        }

        self.directed_step(a, b, delta)?;
        self.directed_step(b, a, delta)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverflowPolicy;

    fn slot(idx: &mut AlignmentIndex, tier: &str, value: &str) -> TypeSlot {
        idx.ensure_type(tier, value).unwrap()
    }

    #[test]
    fn link_pair_counts_both_directions() {
        let mut idx = AlignmentIndex::new();
        let dog = slot(&mut idx, "Orthography", "dog");
        let noun = slot(&mut idx, "MorphemeType", "N");

        idx.link_pair(&dog, &noun, LinkDelta::Increment).unwrap();
        idx.link_pair(&noun, &dog, LinkDelta::Increment).unwrap();

        assert_eq!(idx.directed_count(&dog, &noun, false).unwrap(), 2);
        assert_eq!(idx.directed_count(&noun, &dog, false).unwrap(), 2);

        idx.link_pair(&dog, &noun, LinkDelta::Decrement).unwrap();
        assert_eq!(idx.directed_count(&dog, &noun, false).unwrap(), 1);
        assert_eq!(idx.directed_count(&noun, &dog, false).unwrap(), 1);
    }

    #[test]
    fn decrement_of_unlinked_pair_creates_nothing() {
        let mut idx = AlignmentIndex::new();
        let dog = slot(&mut idx, "Orthography", "dog");
        let noun = slot(&mut idx, "MorphemeType", "N");

        idx.link_pair(&dog, &noun, LinkDelta::Decrement).unwrap();
        assert!(idx.links.is_empty());
    }

    #[test]
    fn overflow_on_one_side_leaves_both_sides_unchanged() {
        let mut idx = AlignmentIndex::new();
        let dog = slot(&mut idx, "Orthography", "dog");
        let noun = slot(&mut idx, "MorphemeType", "N");
        idx.link_pair(&dog, &noun, LinkDelta::Increment).unwrap();

        //push only the backward side to the limit
        {
            let AlignmentIndex { tiers, links, .. } = &mut idx;
            let entry = AlignmentIndex::linked_entry_mut(links, tiers, &noun.key, dog.tier, false)
                .unwrap()
                .unwrap();
            let mut saturated = IndexMap::new();
            saturated.insert(dog.value, u32::MAX);
            *entry = LinkedEntry::with_links(dog.tier, saturated);
        }

        let err = idx.link_pair(&dog, &noun, LinkDelta::Increment).unwrap_err();
        assert_eq!(err, IndexError::CountOverflow);
        assert_eq!(idx.directed_count(&dog, &noun, false).unwrap(), 1);
        assert_eq!(idx.directed_count(&noun, &dog, false).unwrap(), u32::MAX);

        idx.config.overflow = OverflowPolicy::Saturate;
        idx.link_pair(&dog, &noun, LinkDelta::Increment).unwrap();
        assert_eq!(idx.directed_count(&dog, &noun, false).unwrap(), 2);
        assert_eq!(idx.directed_count(&noun, &dog, false).unwrap(), u32::MAX);
    }
}
