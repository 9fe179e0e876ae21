// co-occurrence queries
use indexmap::IndexMap;

use crate::core::delta::normalize_record;
use crate::core::error::IndexError;
use crate::core::index::AlignmentIndex;
use crate::core::types::Count;

impl AlignmentIndex {
    pub fn type_exists(&self, value: &str) -> bool {
        self.values.get(value).is_some_and(|bucket| !bucket.is_empty())
    }

    pub fn type_exists_in_tier(&self, tier: &str, value: &str) -> bool {
        self.find_type(tier, value).is_some()
    }

    /// Values observed on `tier`, in first-observation order.
    pub fn types_for_tier(&self, tier: &str) -> Vec<String> {
        self.values
            .iter()
            .filter(|(_, bucket)| bucket.iter().any(|e| e.tier == tier))
            .filter_map(|(node, _)| self.values.key_of(node))
            .collect()
    }

    /// How many times `value` on `tier` was aligned with `linked_value` on
    /// `linked_tier`; 0 for anything never recorded.
    pub fn link_count(
        &mut self,
        tier: &str,
        value: &str,
        linked_tier: &str,
        linked_value: &str,
    ) -> Result<Count, IndexError> {
        let (Some(from), Some(to)) = (self.find_type(tier, value), self.find_type(linked_tier, linked_value)) else {
            return Ok(0);
        };

        let Self { tiers, values, links, .. } = self;
        match Self::linked_entry_mut(links, tiers, &from.key, to.tier, false)? {
            Some(entry) => entry.count_for(values, to.value),
            None => Ok(0),
        }
    }

    /// Values on `linked_tier` aligned with `value` on `tier`, with counts.
    /// Links registered without an occurrence are left out.
    pub fn aligned_types_for_tier(
        &mut self,
        tier: &str,
        value: &str,
        linked_tier: &str,
    ) -> Result<Vec<(String, Count)>, IndexError> {
        let Some(from) = self.find_type(tier, value) else {
            return Ok(Vec::new());
        };
        let Some(linked_tier_node) = self.tiers.node_for(linked_tier) else {
            return Ok(Vec::new());
        };

        let Self { tiers, values, links, .. } = self;
        let Some(entry) = Self::linked_entry_mut(links, tiers, &from.key, linked_tier_node, false)? else {
            return Ok(Vec::new());
        };

        entry
            .linked_counts(values)?
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&node, &count)| {
                values
                    .key_of(node)
                    .map(|key| (key, count))
                    .ok_or(IndexError::InvalidState("linked handle does not belong to the value index"))
            })
            .collect()
    }

    /// Every tier `value` on `tier` has been aligned with, and the values
    /// seen there.
    pub fn aligned_types(&mut self, tier: &str, value: &str) -> Result<IndexMap<String, Vec<String>>, IndexError> {
        let mut out = IndexMap::new();
        let Some(from) = self.find_type(tier, value) else {
            return Ok(out);
        };

        let Self { tiers, values, links, .. } = self;
        let Some(entries) = links.get_mut(&from.key) else {
            return Ok(out);
        };

        for entry in entries.iter_mut() {
            let name = entry.tier_name(tiers)?;
            let mut seen = Vec::new();
            for (&node, &count) in entry.linked_counts(values)? {
                if count == 0 {
                    continue;
                }
                let key = values
                    .key_of(node)
                    .ok_or(IndexError::InvalidState("linked handle does not belong to the value index"))?;
                seen.push(key);
            }
            if !seen.is_empty() {
                out.insert(name, seen);
            }
        }
        Ok(out)
    }

    /// True when every pair in `record` has been aligned at least once.
    pub fn has_aligned_types<I, K, V>(&mut self, record: I) -> Result<bool, IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let record: Vec<(String, String)> = normalize_record(record).into_iter().collect();
        for (i, (tier, value)) in record.iter().enumerate() {
            for (linked_tier, linked_value) in &record[i + 1..] {
                if self.link_count(tier, value, linked_tier, linked_value)? == 0 {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AlignmentIndex {
        let mut idx = AlignmentIndex::new();
        idx.add_user_tier("MorphemeType").unwrap();
        idx.add_user_tier("MorphemeMeaning").unwrap();
        for record in [
            [("Orthography", "dog"), ("MorphemeType", "N"), ("MorphemeMeaning", "canine")],
            [("Orthography", "dog"), ("MorphemeType", "V"), ("MorphemeMeaning", "follow")],
            [("Orthography", "dog"), ("MorphemeType", "N"), ("MorphemeMeaning", "canine")],
            [("Orthography", "run"), ("MorphemeType", "V"), ("MorphemeMeaning", "move")],
        ] {
            idx.add_aligned_morphemes(record).unwrap();
        }
        idx
    }

    #[test]
    fn aligned_types_for_tier_lists_counts_in_link_order() {
        let mut idx = sample();
        let types = idx.aligned_types_for_tier("Orthography", "dog", "MorphemeType").unwrap();
        assert_eq!(types, vec![("N".to_string(), 2), ("V".to_string(), 1)]);

        let back = idx.aligned_types_for_tier("MorphemeType", "V", "Orthography").unwrap();
        assert_eq!(back, vec![("dog".to_string(), 1), ("run".to_string(), 1)]);
    }

    #[test]
    fn aligned_types_groups_by_tier() {
        let mut idx = sample();
        let all = idx.aligned_types("Orthography", "dog").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["MorphemeType"], vec!["N", "V"]);
        assert_eq!(all["MorphemeMeaning"], vec!["canine", "follow"]);
    }

    #[test]
    fn queries_on_unknown_things_are_empty_not_errors() {
        let mut idx = sample();
        assert_eq!(idx.link_count("Orthography", "cat", "MorphemeType", "N").unwrap(), 0);
        assert_eq!(idx.link_count("Nope", "dog", "MorphemeType", "N").unwrap(), 0);
        assert!(idx.aligned_types_for_tier("Orthography", "dog", "Nope").unwrap().is_empty());
        assert!(idx.aligned_types("Orthography", "cat").unwrap().is_empty());
    }

    #[test]
    fn type_lookups() {
        let idx = sample();
        assert!(idx.type_exists("canine"));
        assert!(!idx.type_exists("cat"));
        assert!(idx.type_exists_in_tier("MorphemeType", "V"));
        assert!(!idx.type_exists_in_tier("Orthography", "V"));
        assert_eq!(idx.types_for_tier("Orthography"), vec!["dog", "run"]);
        assert_eq!(idx.types_for_tier("MorphemeType"), vec!["N", "V"]);
    }

    #[test]
    fn has_aligned_types_checks_every_pair() {
        let mut idx = sample();
        assert!(idx.has_aligned_types([("Orthography", "dog"), ("MorphemeType", "V")]).unwrap());
        assert!(!idx
            .has_aligned_types([("Orthography", "run"), ("MorphemeType", "N")])
            .unwrap());
        assert!(!idx
            .has_aligned_types([
                ("Orthography", "dog"),
                ("MorphemeType", "V"),
                ("MorphemeMeaning", "canine"),
            ])
            .unwrap());
    }
}
