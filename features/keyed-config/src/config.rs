use std::{ops::Deref, sync::Arc};

use keyed_di::{Injectable, Provide};

use crate::{errors::GetConfigError, provider::CONFIG_PROVIDER};

/// A wrapper type to allow for config injections
///
/// This provides a simple way to retrieve configs from the config registry
/// inside a factory.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use keyed_config::{errors::GetConfigError, Config, ConfigProvider};
/// use keyed_di::{Dependencies, InjectionKey, Lifecycle};
///
/// struct ApiConfig {
///     base_url: String,
/// }
///
/// struct Api {
///     config: Config<ApiConfig>,
/// }
///
/// const API: InjectionKey<Api> = InjectionKey::new("api");
///
/// let deps = Dependencies::new();
/// let mut configs = ConfigProvider::new();
/// configs
///     .add_config(ApiConfig { base_url: "https://example.com".into() })
///     .unwrap();
/// configs.install_into(&deps);
///
/// deps.register(&API, Lifecycle::Singleton, |r| {
///     Ok::<_, GetConfigError>(Api { config: Config::resolve(r)? })
/// });
///
/// assert_eq!(deps.provide(&API).unwrap().config.base_url, "https://example.com");
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Injectable> Config<T> {
    /// Provides the installed registry and takes the config of type `T` from it
    pub fn resolve(provider: &impl Provide) -> Result<Self, GetConfigError> {
        let configs = provider.provide(&CONFIG_PROVIDER)?;

        Ok(Config {
            inner: configs.get_config()?,
        })
    }
}

impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Config {
            inner: self.inner.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Config").field(&self.inner).finish()
    }
}
