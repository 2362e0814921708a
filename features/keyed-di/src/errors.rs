use std::sync::Arc;

use thiserror::Error;

use crate::{key::KeyId, types::DynError};

/// Errors when trying to provide a key
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    /// Nothing is registered under the key
    #[error("No factory is registered for '{0}'")]
    NotRegistered(KeyId),

    /// The factory for the key failed to build
    #[error("Factory for '{key}' failed - error: {error}")]
    FactoryFailed { key: KeyId, error: Arc<DynError> },

    /// The key is already being resolved further up the chain
    #[error("A Circular Dependency exists on '{key}' through {chain:?}")]
    CyclicDependency { key: KeyId, chain: Vec<KeyId> },

    /// The key was registered for a different product type
    #[error("'{key}' provides '{registered}' but '{required}' was required")]
    TypeMismatch {
        key: KeyId,
        required: &'static str,
        registered: &'static str,
    },

    /// The resolution chain grew past the configured limit
    #[error("Resolving '{key}' exceeded the maximum resolution depth of {depth}")]
    DepthExceeded { key: KeyId, depth: usize },
}

impl ResolutionError {
    /// The key the error was raised for
    pub fn key(&self) -> KeyId {
        match self {
            ResolutionError::NotRegistered(key)
            | ResolutionError::FactoryFailed { key, .. }
            | ResolutionError::CyclicDependency { key, .. }
            | ResolutionError::TypeMismatch { key, .. }
            | ResolutionError::DepthExceeded { key, .. } => *key,
        }
    }

    /// Whether the error is a wiring mistake which retrying can't fix
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            ResolutionError::CyclicDependency { .. }
                | ResolutionError::TypeMismatch { .. }
                | ResolutionError::DepthExceeded { .. }
        )
    }
}

/// Errors of the process wide container
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlobalError {
    #[error("A shared container has already been installed")]
    AlreadyInstalled,
    #[error("No shared container installed, call `global::install` during setup")]
    NotInstalled,
}
