//! Cross-tier alignment index.
//!
//! Records, for every value observed on a tier, which values on the other
//! tiers were aligned with it and how many times.

pub mod config;
pub mod core;

pub use crate::config::{IndexConfig, OverflowPolicy};
pub use crate::core::error::IndexError;
pub use crate::core::index::{AlignmentIndex, TierCatalog, ValueIndex};
pub use crate::core::linked::{LinkRecord, LinkedEntry, LinkedEntryRecord};
pub use crate::core::persist::{IndexRecord, TypeLinksRecord};
pub use crate::core::tree::{KeyTree, TreeEntry, TreeRecord};
pub use crate::core::types::{Branch, Count, NodeId, TierInfo, TierKind, TreePath, TypeEntry, TypeKey};
