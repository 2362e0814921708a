//! Process wide container
//!
//! The shared container is installed once during application setup and lives
//! until the process exits. [reset] and [teardown] keep tests independent.

use once_cell::sync::OnceCell;

use crate::{container::Dependencies, errors::GlobalError};

static SHARED: OnceCell<Dependencies> = OnceCell::new();

/// Installs the shared container
///
/// Fails if a container was installed before.
pub fn install(dependencies: Dependencies) -> Result<&'static Dependencies, GlobalError> {
    SHARED
        .set(dependencies)
        .map_err(|_| GlobalError::AlreadyInstalled)?;

    tracing::debug!("Installed shared container");
    shared()
}

/// The installed shared container
pub fn shared() -> Result<&'static Dependencies, GlobalError> {
    SHARED.get().ok_or(GlobalError::NotInstalled)
}

/// The shared container, installing an empty one with default settings if needed
pub fn shared_or_install_default() -> &'static Dependencies {
    SHARED.get_or_init(|| {
        tracing::debug!("Installing default shared container");
        Dependencies::new()
    })
}

/// Drops the cached singletons of the shared container
pub fn reset() {
    if let Some(dependencies) = SHARED.get() {
        dependencies.reset();
    }
}

/// Drops all registrations and singletons of the shared container
pub fn teardown() {
    if let Some(dependencies) = SHARED.get() {
        dependencies.clear();
    }
}
