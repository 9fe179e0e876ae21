//! Arena-backed ternary search tree keyed by strings.
//!
//! Nodes are addressed by [`NodeId`] handles while the tree is alive and by
//! [`TreePath`] once it has gone through a serialization boundary. The
//! persisted form replays the original insertions, so a rebuilt tree has the
//! same shape and every path lands on the same logical node.
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::error::IndexError;
use crate::core::types::{Branch, NodeId, TreePath};

#[derive(Debug, Clone)]
struct TreeNode<V> {
    split: char,
    parent: Option<(NodeId, Branch)>,
    low: Option<NodeId>,
    equal: Option<NodeId>,
    high: Option<NodeId>,
    value: Option<V>,
    //set once a key has ended here, even if the value was later removed
    keyed: bool,
}

impl<V> TreeNode<V> {
    fn new(split: char, parent: Option<(NodeId, Branch)>) -> Self {
        Self {
            split,
            parent,
            low: None,
            equal: None,
            high: None,
            value: None,
            keyed: false,
        }
    }

    fn child(&self, branch: Branch) -> Option<NodeId> {
        match branch {
            Branch::Low => self.low,
            Branch::Equal => self.equal,
            Branch::High => self.high,
        }
    }

    fn set_child(&mut self, branch: Branch, id: NodeId) {
        match branch {
            Branch::Low => self.low = Some(id),
            Branch::Equal => self.equal = Some(id),
            Branch::High => self.high = Some(id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyTree<V> {
    nodes: Vec<TreeNode<V>>,
    root: Option<NodeId>,
    //terminal nodes in first-insertion order
    keys: Vec<NodeId>,
    len: usize,
}

impl<V> Default for KeyTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyTree<V> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            keys: Vec::new(),
            len: 0,
        }
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, id: NodeId) -> Option<&TreeNode<V>> {
        self.nodes.get(id as usize)
    }

    fn alloc(&mut self, split: char, parent: Option<(NodeId, Branch)>) -> Result<NodeId, IndexError> {
        let id = NodeId::try_from(self.nodes.len()).map_err(|_| IndexError::TreeFull)?;
        self.nodes.push(TreeNode::new(split, parent));
        if let Some((p, branch)) = parent {
            self.nodes[p as usize].set_child(branch, id);
        }
        Ok(id)
    }

    //walk the key, creating missing nodes, and return the node the key ends on
    fn insert_path(&mut self, key: &str) -> Result<NodeId, IndexError> {
        let chars: Vec<char> = key.chars().collect();
        if chars.is_empty() {
            return Err(IndexError::EmptyKey);
        }

        let mut i = 0;
        let mut cur = match self.root {
            Some(r) => r,
            None => {
                let r = self.alloc(chars[0], None)?;
                self.root = Some(r);
                r
            }
        };

        loop {
            let node = &self.nodes[cur as usize];
            let branch = match chars[i].cmp(&node.split) {
                Ordering::Less => Branch::Low,
                Ordering::Greater => Branch::High,
                Ordering::Equal if i + 1 == chars.len() => return Ok(cur),
                Ordering::Equal => {
                    i += 1;
                    Branch::Equal
                }
            };

            cur = match node.child(branch) {
                Some(next) => next,
                None => self.alloc(chars[i], Some((cur, branch)))?,
            };
        }
    }

    fn mark_keyed(&mut self, id: NodeId) {
        let node = &mut self.nodes[id as usize];
        if !node.keyed {
            node.keyed = true;
            self.keys.push(id);
        }
    }

    fn place(&mut self, id: NodeId, value: V) -> Option<V> {
        self.mark_keyed(id);
        let old = self.nodes[id as usize].value.replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Inserts or overwrites the value for `key` and returns its node.
    pub fn insert(&mut self, key: &str, value: V) -> Result<NodeId, IndexError> {
        let id = self.insert_path(key)?;
        self.place(id, value);
        Ok(id)
    }

    pub fn get_or_insert_with(&mut self, key: &str, f: impl FnOnce() -> V) -> Result<NodeId, IndexError> {
        let id = self.insert_path(key)?;
        if self.nodes[id as usize].value.is_none() {
            self.place(id, f());
        }
        Ok(id)
    }

    /// Node holding the value for `key`, if any.
    pub fn node_for(&self, key: &str) -> Option<NodeId> {
        let mut chars = key.chars();
        let mut c = chars.next()?;
        let mut cur = self.root?;

        loop {
            let node = self.node(cur)?;
            match c.cmp(&node.split) {
                Ordering::Less => cur = node.low?,
                Ordering::Greater => cur = node.high?,
                Ordering::Equal => match chars.next() {
                    None => return node.value.as_ref().map(|_| cur),
                    Some(next) => {
                        c = next;
                        cur = node.equal?;
                    }
                },
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.node_for(key).and_then(|id| self.value(id))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let id = self.node_for(key)?;
        self.value_mut(id)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.node_for(key).is_some()
    }

    pub fn value(&self, id: NodeId) -> Option<&V> {
        self.node(id)?.value.as_ref()
    }

    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut V> {
        self.nodes.get_mut(id as usize)?.value.as_mut()
    }

    /// Clears the value for `key`. The node stays in place so paths of
    /// other nodes are unaffected.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = self.node_for(key)?;
        let old = self.nodes[id as usize].value.take();
        if old.is_some() {
            self.len -= 1;
        }
        old
    }

    /// Re-resolves a path against this tree. Only nodes holding a value
    /// resolve.
    pub fn find_node(&self, path: &TreePath) -> Option<NodeId> {
        let mut cur = self.root?;
        for &branch in path.branches() {
            cur = self.node(cur)?.child(branch)?;
        }
        self.node(cur)?.value.as_ref().map(|_| cur)
    }

    pub fn path_of(&self, id: NodeId) -> Option<TreePath> {
        let mut branches = Vec::new();
        let mut cur = id;
        while let Some((parent, branch)) = self.node(cur)?.parent {
            branches.push(branch);
            cur = parent;
        }
        branches.reverse();
        Some(TreePath::from(branches))
    }

    /// The key spelled by the walk down to `id`.
    pub fn key_of(&self, id: NodeId) -> Option<String> {
        let mut node = self.node(id)?;
        let mut chars = vec![node.split];
        while let Some((parent, branch)) = node.parent {
            node = self.node(parent)?;
            if branch == Branch::Equal {
                chars.push(node.split);
            }
        }
        Some(chars.into_iter().rev().collect())
    }

    /// Live entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &V)> + '_ {
        self.keys
            .iter()
            .filter_map(|&id| self.value(id).map(|v| (id, v)))
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.iter().filter_map(|(id, _)| self.key_of(id))
    }
}

/// Persisted form of a [`KeyTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRecord<V> {
    pub entries: Vec<TreeEntry<V>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry<V> {
    pub key: String,
    pub value: Option<V>,
}

impl<V: Clone> KeyTree<V> {
    pub fn to_record(&self) -> Result<TreeRecord<V>, IndexError> {
        let entries = self
            .keys
            .iter()
            .map(|&id| {
                let key = self
                    .key_of(id)
                    .ok_or(IndexError::InvalidState("keyed node missing from its tree"))?;
                Ok::<_, IndexError>(TreeEntry { key, value: self.value(id).cloned() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TreeRecord { entries })
    }
}

impl<V> KeyTree<V> {
    pub fn from_record(record: TreeRecord<V>) -> Result<Self, IndexError> {
        let mut tree = Self::new();
        for entry in record.entries {
            let id = tree.insert_path(&entry.key)?;
            match entry.value {
                Some(v) => {
                    tree.place(id, v);
                }
                None => tree.mark_keyed(id),
            }
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KeyTree<u32> {
        let mut t = KeyTree::new();
        for (i, k) in ["dog", "do", "cat", "dot", "N", "Nominal"].iter().enumerate() {
            t.insert(k, i as u32).unwrap();
        }
        t
    }

    #[test]
    fn insert_and_lookup_by_key() {
        let t = sample();
        assert_eq!(t.len(), 6);
        assert_eq!(t.get("dog"), Some(&0));
        assert_eq!(t.get("do"), Some(&1));
        assert_eq!(t.get("Nominal"), Some(&5));

        //prefixes that never ended a key hold nothing
        assert_eq!(t.get("d"), None);
        assert_eq!(t.get("Nom"), None);
        assert_eq!(t.get("dogs"), None);
        assert_eq!(t.get(""), None);
    }

    #[test]
    fn insert_overwrites_and_keeps_node() {
        let mut t = sample();
        let before = t.node_for("cat").unwrap();
        let after = t.insert("cat", 42).unwrap();
        assert_eq!(before, after);
        assert_eq!(t.get("cat"), Some(&42));
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn empty_key_is_rejected() {
        let mut t: KeyTree<u32> = KeyTree::new();
        assert_eq!(t.insert("", 1).unwrap_err(), IndexError::EmptyKey);
    }

    #[test]
    fn path_and_key_of_every_node_resolve_back() {
        let t = sample();
        for (id, _) in t.iter() {
            let path = t.path_of(id).unwrap();
            assert_eq!(t.find_node(&path), Some(id));

            let key = t.key_of(id).unwrap();
            assert_eq!(t.node_for(&key), Some(id));
        }
    }

    #[test]
    fn remove_clears_value_but_keeps_other_paths() {
        let mut t = sample();
        let dot = t.node_for("dot").unwrap();
        let dot_path = t.path_of(dot).unwrap();
        let do_path = t.path_of(t.node_for("do").unwrap()).unwrap();

        assert_eq!(t.remove("do"), Some(1));
        assert_eq!(t.len(), 5);
        assert!(!t.contains_key("do"));
        assert_eq!(t.find_node(&do_path), None);
        assert_eq!(t.find_node(&dot_path), Some(dot));
    }

    #[test]
    fn rebuilt_tree_resolves_the_same_paths() {
        let mut t = sample();
        t.remove("cat");
        let paths: Vec<(String, TreePath)> = t
            .iter()
            .map(|(id, _)| (t.key_of(id).unwrap(), t.path_of(id).unwrap()))
            .collect();

        let rebuilt = KeyTree::from_record(t.to_record().unwrap()).unwrap();
        assert_eq!(rebuilt.len(), t.len());
        assert!(!rebuilt.contains_key("cat"));
        for (key, path) in paths {
            let id = rebuilt.find_node(&path).expect("path should resolve after rebuild");
            assert_eq!(rebuilt.key_of(id).unwrap(), key);
            assert_eq!(rebuilt.get(&key), t.get(&key));
        }
    }

    #[test]
    fn iteration_follows_first_insertion_order() {
        let mut t = sample();
        t.insert("dog", 9).unwrap();
        let keys: Vec<String> = t.keys().collect();
        assert_eq!(keys, vec!["dog", "do", "cat", "dot", "N", "Nominal"]);
    }
}
