// ids, tree paths and the small records stored in the trees
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::IndexError;

/// Handle to a node inside one [`KeyTree`](crate::core::tree::KeyTree).
///
/// Only meaningful for the tree instance that produced it.
pub type NodeId = u32;

/// Multiplicity of a link.
pub type Count = u32;

/// One branch decision taken while walking a ternary tree from its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Low,
    Equal,
    High,
}

impl Branch {
    pub fn symbol(self) -> char {
        match self {
            Branch::Low => 'l',
            Branch::Equal => 'e',
            Branch::High => 'h',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'l' => Some(Branch::Low),
            'e' => Some(Branch::Equal),
            'h' => Some(Branch::High),
            _ => None,
        }
    }
}

/// Structural address of a tree node: the branch decisions that reach it
/// from the root. Survives serialization; node handles do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TreePath(Vec<Branch>);

impl TreePath {
    pub fn branches(&self) -> &[Branch] {
        &self.0
    }
}

impl From<Vec<Branch>> for TreePath {
    fn from(branches: Vec<Branch>) -> Self {
        Self(branches)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{}", b.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| Branch::from_symbol(c).ok_or_else(|| IndexError::MalformedPath(s.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(TreePath)
    }
}

//persisted as one atomic token
impl Serialize for TreePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TreePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    System,
    User,
}

/// Catalog metadata for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierInfo {
    pub tier_name: String,
    pub kind: TierKind,
    /// Registration order; tier listings are sorted by it.
    pub position: u32,
}

impl TierInfo {
    pub fn new(tier_name: impl Into<String>, kind: TierKind, position: u32) -> Self {
        Self { tier_name: tier_name.into(), kind, position }
    }
}

/// One observation of a value on a tier, kept in the value bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeEntry {
    pub tier: String,
}

impl TypeEntry {
    pub fn new(tier: impl Into<String>) -> Self {
        Self { tier: tier.into() }
    }
}

/// A type is a value as observed on one particular tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    pub tier: String,
    pub value: String,
}

impl TypeKey {
    pub fn new(tier: impl Into<String>, value: impl Into<String>) -> Self {
        Self { tier: tier.into(), value: value.into() }
    }
}
