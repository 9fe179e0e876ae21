use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::TreePath;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("tier '{0}' is already registered")]
    DuplicateTierEntry(String),

    #[error("tier '{0}' is not registered")]
    UnknownTier(String),

    #[error("tree keys must not be empty")]
    EmptyKey,

    #[error("key tree cannot address any more nodes")]
    TreeFull,

    //persisted entry and persisted tree are out of sync
    #[error("invalid tier node path '{0}'")]
    UnresolvedTierPath(TreePath),

    #[error("invalid value path '{0}'")]
    UnresolvedValuePath(TreePath),

    #[error("malformed tree path '{0}'")]
    MalformedPath(String),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("link count would exceed {max}", max = u32::MAX)]
    CountOverflow,

    #[error("codec error: {0}")]
    Codec(String),

    #[error("i/o error on {path}: {message}")]
    Io { path: PathBuf, message: String },
}
