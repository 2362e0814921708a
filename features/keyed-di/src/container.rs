use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::RwLock;

use crate::{
    building::Builds,
    errors::ResolutionError,
    key::{InjectionKey, KeyId},
    registration::{Lifecycle, Registration},
    resolver::Resolver,
    settings::ContainerSettings,
    types::{DynError, Injectable},
};

/// Container holding all registrations and built singletons
///
/// The container can be shared between threads. The registration table lock is
/// only held to look up or swap entries, never while a factory runs.
pub struct Dependencies {
    id: usize,
    registrations: RwLock<HashMap<KeyId, Arc<Registration>>>,
    builds: Builds,
    settings: ContainerSettings,
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

impl Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registrations = self.registrations.read();
        let mut entries: Vec<_> = registrations.values().collect();
        entries.sort_by_key(|registration| registration.key);

        let mut map = f.debug_struct("Dependencies");
        for registration in entries {
            let val = match (registration.lifecycle, registration.is_cached()) {
                (Lifecycle::Transient, _) => "transient",
                (Lifecycle::Singleton, true) => "cached",
                (Lifecycle::Singleton, false) => "uncached",
            };
            map.field(registration.key.name(), &val);
        }
        map.finish()
    }
}

impl Default for Dependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl Dependencies {
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    pub fn with_settings(settings: ContainerSettings) -> Self {
        Dependencies {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            registrations: RwLock::new(HashMap::new()),
            builds: Builds::default(),
            settings,
        }
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    /// Tells containers apart in the per thread resolution chain
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn builds(&self) -> &Builds {
        &self.builds
    }
}

// Registration
impl Dependencies {
    /// Registers a factory for `key`
    ///
    /// Replaces an existing registration for the same key, including its cached
    /// singleton, so overrides and test doubles can be swapped in.
    pub fn register<T, F, E>(&self, key: &InjectionKey<T>, lifecycle: Lifecycle, factory: F)
    where
        T: Injectable,
        F: Fn(&Resolver<'_>) -> Result<T, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        self.insert(Registration::new(key.id(), lifecycle, factory));
    }

    /// Registers an already built value as a singleton
    pub fn register_instance<T: Injectable>(&self, key: &InjectionKey<T>, value: T) {
        self.insert(Registration::from_instance(key.id(), Arc::new(value)));
    }

    fn insert(&self, registration: Registration) {
        let key = registration.key;
        let lifecycle = registration.lifecycle;
        let product = registration.product;

        let previous = self
            .registrations
            .write()
            .insert(key, Arc::new(registration));

        match previous {
            Some(_) => tracing::debug!("Overwrote registration of '{key}' with {product} as {lifecycle:?}"),
            None => tracing::debug!("Registered '{key}' providing {product} as {lifecycle:?}"),
        }
    }
}

// Resolution
impl Dependencies {
    /// Attempts to provide the instance registered for `key`
    ///
    /// Called from inside a factory, this extends the chain being resolved on
    /// the current thread just like the factory's [Resolver] would.
    pub fn provide<T: Injectable>(&self, key: &InjectionKey<T>) -> Result<Arc<T>, ResolutionError> {
        Resolver::new(self).provide(key)
    }

    /// Looks up a registration, releasing the table lock right away
    pub(crate) fn registration(&self, key: KeyId) -> Result<Arc<Registration>, ResolutionError> {
        match self.registrations.read().get(&key) {
            Some(registration) => Ok(registration.clone()),
            None => {
                tracing::debug!("Tried to provide an unregistered key: '{key}'");
                Err(ResolutionError::NotRegistered(key))
            }
        }
    }
}

// Maintenance and introspection
impl Dependencies {
    /// Drops all cached singletons, keeping the registrations
    pub fn reset(&self) {
        let mut registrations = self.registrations.write();
        let mut dropped = 0;
        for registration in registrations.values_mut() {
            if registration.is_cached() {
                *registration = Arc::new(registration.uncached());
                dropped += 1;
            }
        }
        tracing::debug!("Reset container - dropped {dropped} cached singletons");
    }

    /// Drops all registrations and cached singletons
    pub fn clear(&self) {
        let mut registrations = self.registrations.write();
        tracing::debug!("Clearing {} registrations", registrations.len());
        registrations.clear();
    }

    pub fn is_registered<T>(&self, key: &InjectionKey<T>) -> bool {
        self.registrations.read().contains_key(&key.id())
    }

    /// Whether a singleton instance is currently cached for `key`
    pub fn is_cached<T>(&self, key: &InjectionKey<T>) -> bool {
        self.registrations
            .read()
            .get(&key.id())
            .is_some_and(|registration| registration.is_cached())
    }

    pub fn lifecycle_of<T>(&self, key: &InjectionKey<T>) -> Option<Lifecycle> {
        self.registrations
            .read()
            .get(&key.id())
            .map(|registration| registration.lifecycle)
    }

    /// All registered keys, sorted by name
    pub fn registered_keys(&self) -> Vec<KeyId> {
        let mut keys: Vec<_> = self.registrations.read().keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }
}
