use std::fmt;

use crate::model::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Item is already claimed by a live pair. The match set is unchanged.
    DuplicateClaim { item_id: String },
    /// No staged item with this id exists in the platform's pool.
    UnknownItem { platform: Platform, item_id: String },
    /// No pair with this id exists in the set or session.
    UnknownPair(String),
    /// Operation requires both platform sides (sync on a single pair).
    NotLinked(String),
    /// Edit targeted a platform side that the pair does not carry.
    MissingSide { pair_id: String, platform: Platform },
    /// Pair shape violates the linked/single invariant.
    InvalidPair(String),
    /// Oracle response did not have the expected JSON shape.
    MalformedResponse(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Threshold validation error.
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateClaim { item_id } => {
                write!(f, "item '{item_id}' is already claimed by another pair")
            }
            Self::UnknownItem { platform, item_id } => {
                write!(f, "no {platform} item with id '{item_id}'")
            }
            Self::UnknownPair(id) => write!(f, "unknown pair: {id}"),
            Self::NotLinked(id) => write!(f, "pair '{id}' is single-platform and cannot be synced"),
            Self::MissingSide { pair_id, platform } => {
                write!(f, "pair '{pair_id}' has no {platform} side")
            }
            Self::InvalidPair(msg) => write!(f, "invalid pair: {msg}"),
            Self::MalformedResponse(msg) => write!(f, "malformed oracle response: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
