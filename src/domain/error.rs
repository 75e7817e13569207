//! Errors raised by the ownership model
//!
//! These are precondition failures reported straight back to the caller.
//! Nothing in the domain layer retries or recovers from them.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The child already belongs to a container (`child`, `owner`)
    #[error("'{0}' is already owned by '{1}'")]
    AlreadyOwned(String, String),

    /// The id is already taken inside the container (`id`, `container`)
    #[error("Duplicate id '{0}' in '{1}'")]
    DuplicateId(String, String),

    /// The id is not present in the container (`id`, `container`)
    #[error("'{0}' not found in '{1}'")]
    NotFound(String, String),
}

impl ModelError {
    /// Returns true for id collisions
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ModelError::DuplicateId(..))
    }

    /// Returns true for lookups of absent ids
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound(..))
    }
}
