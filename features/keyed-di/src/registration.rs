use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{
    building::Claim,
    errors::ResolutionError,
    key::KeyId,
    resolver::Resolver,
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// Whether resolved instances are shared or built per resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// A new instance on every resolution
    Transient,
    /// Built on the first successful resolution, then shared
    Singleton,
}

/// Factory with its product type erased
pub(crate) type DynFactory =
    Arc<dyn Fn(&Resolver<'_>) -> Result<Instance, DynError> + Send + Sync + 'static>;

fn erase<F>(factory: F) -> DynFactory
where
    F: Fn(&Resolver<'_>) -> Result<Instance, DynError> + Send + Sync + 'static,
{
    Arc::new(factory)
}

/// Entry of the registration table
pub(crate) struct Registration {
    pub(crate) key: KeyId,
    pub(crate) product: TypeInfo,
    pub(crate) lifecycle: Lifecycle,
    factory: DynFactory,
    /// Singleton cache - only ever filled for [Lifecycle::Singleton]
    cache: OnceCell<Instance>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("product", &self.product.type_name)
            .field("lifecycle", &self.lifecycle)
            .field("cached", &self.is_cached())
            .finish()
    }
}

impl Registration {
    pub(crate) fn new<T, F, E>(key: KeyId, lifecycle: Lifecycle, factory: F) -> Self
    where
        T: Injectable,
        F: Fn(&Resolver<'_>) -> Result<T, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        let factory = erase(move |resolver| {
            // Forward the call to the typed factory
            factory(resolver).map(Instance::new).map_err(Into::into)
        });

        Registration {
            key,
            product: TypeInfo::of::<T>(),
            lifecycle,
            factory,
            cache: OnceCell::new(),
        }
    }

    /// Registration for an already built value
    pub(crate) fn from_instance<T: Injectable>(key: KeyId, value: Arc<T>) -> Self {
        let instance = Instance::from_arc(value);
        let cached = instance.clone();

        Registration {
            key,
            product: instance.info,
            lifecycle: Lifecycle::Singleton,
            // Rebuilding after a reset hands out the very same value again
            factory: erase(move |_| Ok(instance.clone())),
            cache: OnceCell::with_value(cached),
        }
    }

    /// Same registration with an empty singleton cache
    pub(crate) fn uncached(&self) -> Self {
        Registration {
            key: self.key,
            product: self.product,
            lifecycle: self.lifecycle,
            factory: self.factory.clone(),
            cache: OnceCell::new(),
        }
    }

    pub(crate) fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Returns the instance according to the lifecycle
    ///
    /// Racing first resolutions of a singleton wait until its builder finished.
    /// A failed build leaves the slot empty.
    pub(crate) fn instance(&self, resolver: &Resolver<'_>) -> Result<Instance, ResolutionError> {
        match self.lifecycle {
            Lifecycle::Transient => self.build(resolver),
            Lifecycle::Singleton => self.singleton(resolver),
        }
    }

    fn singleton(&self, resolver: &Resolver<'_>) -> Result<Instance, ResolutionError> {
        if let Some(instance) = self.cache.get() {
            return Ok(instance.clone());
        }

        let claimed = resolver
            .container()
            .builds()
            .claim(self.key, || self.cache.get().cloned());

        match claimed {
            Ok(Claim::Ready(instance)) => Ok(instance),
            Ok(Claim::Build(_guard)) => {
                let instance = self.build(resolver)?;
                Ok(self.cache.get_or_init(|| instance).clone())
            }
            Err(path) => Err(resolver.blocked(self.key, path)),
        }
    }

    fn build(&self, resolver: &Resolver<'_>) -> Result<Instance, ResolutionError> {
        tracing::debug!(
            "Building '{}' ({}) as {:?}",
            self.key,
            self.product,
            self.lifecycle
        );

        let instance = (self.factory)(resolver).map_err(|error| self.factory_failed(error))?;

        tracing::debug!("Constructed instance of '{}'", self.key);
        Ok(instance)
    }

    fn factory_failed(&self, error: DynError) -> ResolutionError {
        match error.downcast::<ResolutionError>() {
            // Wiring errors raised deeper in the chain are reported as they are
            Ok(inner)
                if matches!(
                    *inner,
                    ResolutionError::CyclicDependency { .. }
                        | ResolutionError::DepthExceeded { .. }
                ) =>
            {
                *inner
            }
            Ok(inner) => ResolutionError::FactoryFailed {
                key: self.key,
                error: Arc::new(inner as DynError),
            },
            Err(error) => ResolutionError::FactoryFailed {
                key: self.key,
                error: Arc::new(error),
            },
        }
    }
}
