use thiserror::Error;

use crate::api::types::BodyId;

/// Errors surfaced by the sandbox. None of them leave the world unusable.
#[derive(Debug, Error)]
pub enum DynamicsError {
    /// Bad construction parameters (non-positive size, elasticity out of range, ...).
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    /// The handle was removed or never existed.
    #[error("body {0} not found")]
    NotFound(BodyId),

    /// A configuration document failed to parse.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DynamicsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DynamicsError::InvalidSpec(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DynamicsError>;
