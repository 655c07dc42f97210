//! Errors surfaced while building or configuring the engine.
//!
//! Visual effects themselves never fail; only structural misuse reaches here.

use thiserror::Error;

use crate::ids::GroupId;

#[derive(Debug, Error)]
pub enum RevealError {
    #[error("invalid reveal config: {0}")]
    InvalidConfig(String),
    #[error("reveal config json: {0}")]
    Config(#[from] serde_json::Error),
    #[error("element '{0}' is registered twice")]
    DuplicateElement(String),
    #[error("unknown group {0:?}")]
    UnknownGroup(GroupId),
}
