use std::sync::Arc;

use crate::{
    container::Dependencies, errors::ResolutionError, key::InjectionKey, resolver::Resolver,
    types::Injectable,
};

/// Anything keys can be provided from
///
/// Besides [Provide::provide] it carries the recovery policies callers usually
/// want, so the container itself never has to decide for them.
pub trait Provide {
    /// Provides the instance registered for `key`
    fn provide<T: Injectable>(&self, key: &InjectionKey<T>) -> Result<Arc<T>, ResolutionError>;

    /// Treats a missing registration as an unavailable feature
    ///
    /// Every other failure is still returned.
    fn provide_optional<T: Injectable>(
        &self,
        key: &InjectionKey<T>,
    ) -> Result<Option<Arc<T>>, ResolutionError> {
        match self.provide(key) {
            Ok(instance) => Ok(Some(instance)),
            Err(ResolutionError::NotRegistered(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Logs any failure and returns None
    ///
    /// For glue code where the only sensible reaction is skipping the action,
    /// like presenting a screen that can't be built.
    fn provide_or_log<T: Injectable>(&self, key: &InjectionKey<T>) -> Option<Arc<T>> {
        match self.provide(key) {
            Ok(instance) => Some(instance),
            Err(error) => {
                tracing::error!(key = key.name(), "Unable to provide '{key}': {error}");
                None
            }
        }
    }
}

impl Provide for Dependencies {
    fn provide<T: Injectable>(&self, key: &InjectionKey<T>) -> Result<Arc<T>, ResolutionError> {
        Dependencies::provide(self, key)
    }
}

impl Provide for Resolver<'_> {
    fn provide<T: Injectable>(&self, key: &InjectionKey<T>) -> Result<Arc<T>, ResolutionError> {
        Resolver::provide(self, key)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::Lifecycle;

    struct Banner;
    struct Broken;

    const BANNER: InjectionKey<Banner> = InjectionKey::new("banner");
    const BROKEN: InjectionKey<Broken> = InjectionKey::new("broken");

    fn container() -> Dependencies {
        let deps = Dependencies::new();
        deps.register(&BANNER, Lifecycle::Transient, |_| Ok::<_, Infallible>(Banner));
        deps.register(&BROKEN, Lifecycle::Transient, |_| Err::<Broken, _>("no network"));
        deps
    }

    #[test]
    fn optional_maps_missing_to_none() {
        let deps = Dependencies::new();

        assert!(deps.provide_optional(&BANNER).unwrap().is_none());
    }

    #[test]
    fn optional_keeps_other_failures() {
        let deps = container();

        assert!(deps.provide_optional(&BANNER).unwrap().is_some());
        assert!(matches!(
            deps.provide_optional(&BROKEN),
            Err(ResolutionError::FactoryFailed { .. })
        ));
    }

    #[test]
    fn or_log_downgrades_every_failure() {
        let deps = container();

        assert!(deps.provide_or_log(&BANNER).is_some());
        assert!(deps.provide_or_log(&BROKEN).is_none());
        assert!(Dependencies::new().provide_or_log(&BANNER).is_none());
    }

    #[test]
    fn factories_can_use_the_policies() {
        struct Page {
            banner: Option<Arc<Banner>>,
        }
        const PAGE: InjectionKey<Page> = InjectionKey::new("page");

        let deps = Dependencies::new();
        deps.register(&PAGE, Lifecycle::Transient, |r| {
            Ok::<_, ResolutionError>(Page {
                banner: r.provide_optional(&BANNER)?,
            })
        });

        assert!(deps.provide(&PAGE).unwrap().banner.is_none());

        deps.register(&BANNER, Lifecycle::Singleton, |_| Ok::<_, Infallible>(Banner));
        assert!(deps.provide(&PAGE).unwrap().banner.is_some());
    }
}
