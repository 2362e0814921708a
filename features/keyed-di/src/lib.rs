//! Keyed dependency injection
//!
//! Dependencies are registered and resolved through typed [InjectionKey]s. Each
//! registration chooses its [Lifecycle]:
//! - [Lifecycle::Transient]: every resolution builds a new instance
//! - [Lifecycle::Singleton]: the first successful resolution is cached and shared
//!
//! Resolution never hands out a default. Every failure comes back as a
//! [ResolutionError] and the caller decides how to recover, see [Provide].
//!
//! # Example
//!
//! ```rust
//! use std::{convert::Infallible, sync::Arc};
//! use keyed_di::{Dependencies, InjectionKey, Lifecycle, ResolutionError};
//!
//! struct Api { base_url: String }
//! struct ProfileScreen { api: Arc<Api> }
//!
//! const API: InjectionKey<Api> = InjectionKey::new("api");
//! const PROFILE_SCREEN: InjectionKey<ProfileScreen> = InjectionKey::new("profile_screen");
//!
//! let deps = Dependencies::new();
//! deps.register(&API, Lifecycle::Singleton, |_| {
//!     Ok::<_, Infallible>(Api { base_url: "https://example.com".into() })
//! });
//! deps.register(&PROFILE_SCREEN, Lifecycle::Transient, |r| {
//!     Ok::<_, ResolutionError>(ProfileScreen { api: r.provide(&API)? })
//! });
//!
//! let first = deps.provide(&PROFILE_SCREEN).unwrap();
//! let second = deps.provide(&PROFILE_SCREEN).unwrap();
//! assert!(!Arc::ptr_eq(&first, &second));
//! assert!(Arc::ptr_eq(&first.api, &second.api));
//! ```

mod building;
pub mod container;
pub mod errors;
pub mod global;
pub mod key;
pub mod provide;
pub mod registration;
pub mod resolver;
pub mod settings;
pub mod types;

pub use container::Dependencies;
pub use errors::{GlobalError, ResolutionError};
pub use key::{InjectionKey, KeyId};
pub use provide::Provide;
pub use registration::Lifecycle;
pub use resolver::Resolver;
pub use settings::ContainerSettings;
pub use types::{DynError, Injectable, Instance, TypeInfo};
