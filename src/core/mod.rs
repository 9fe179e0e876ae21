pub mod delta;
pub mod error;
pub mod index;
pub mod linked;
pub mod persist;
pub mod propagate;
pub mod query;
pub mod tiers;
pub mod tree;
pub mod types;
