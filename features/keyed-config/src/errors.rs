use keyed_di::{ResolutionError, TypeInfo};

/// Errors when trying to acquire a config
#[derive(thiserror::Error, Debug, Clone)]
pub enum GetConfigError {
    /// The required Config is not known
    #[error("The required Config type '{0}' is not known")]
    Missing(TypeInfo),
    /// The config registry itself could not be provided
    #[error("The config registry is unavailable - error: {0}")]
    Unavailable(#[from] ResolutionError),
}

/// Errors when trying to register a config
#[derive(thiserror::Error, Debug, Clone)]
pub enum RegisterConfigError {
    /// The required Config is already registered
    #[error("The Config type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),
}
