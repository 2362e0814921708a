use std::{any::type_name, cell::RefCell, sync::Arc};

use crate::{
    container::Dependencies,
    errors::ResolutionError,
    key::{InjectionKey, KeyId},
    types::Injectable,
};

thread_local! {
    /// Keys being resolved on this thread, tagged with the id of their container
    static ACTIVE: RefCell<Vec<(usize, KeyId)>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a key in the active chain of this thread until dropped
struct Entered;

impl Entered {
    fn enter(container: usize, key: KeyId) -> Self {
        ACTIVE.with(|active| active.borrow_mut().push((container, key)));
        Entered
    }
}

impl Drop for Entered {
    fn drop(&mut self) {
        let _ = ACTIVE.try_with(|active| active.borrow_mut().pop());
    }
}

/// Resolution context handed to factories
///
/// The keys currently being resolved are tracked per thread, so every entry
/// point extends the same chain: the resolver a factory receives,
/// [Resolver::container], or a handle to the same container obtained in any
/// other way. Revisiting a key of the chain fails with
/// [ResolutionError::CyclicDependency] instead of recursing.
///
/// ```rust
/// use keyed_di::{Dependencies, InjectionKey, Lifecycle};
/// use std::convert::Infallible;
///
/// struct Session;
/// struct Dashboard { session: std::sync::Arc<Session> }
///
/// const SESSION: InjectionKey<Session> = InjectionKey::new("session");
/// const DASHBOARD: InjectionKey<Dashboard> = InjectionKey::new("dashboard");
///
/// let deps = Dependencies::new();
/// deps.register(&SESSION, Lifecycle::Singleton, |_| Ok::<_, Infallible>(Session));
/// deps.register(&DASHBOARD, Lifecycle::Transient, |r| {
///     Ok::<_, keyed_di::ResolutionError>(Dashboard { session: r.provide(&SESSION)? })
/// });
///
/// assert!(deps.provide(&DASHBOARD).is_ok());
/// ```
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    container: &'a Dependencies,
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("chain", &self.chain())
            .finish()
    }
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(container: &'a Dependencies) -> Self {
        Resolver { container }
    }

    /// The container this resolver provides from
    pub fn container(&self) -> &'a Dependencies {
        self.container
    }

    /// Number of keys currently being resolved
    pub fn depth(&self) -> usize {
        self.chain().len()
    }

    /// Keys currently being resolved on this thread, outermost first
    pub fn chain(&self) -> Vec<KeyId> {
        let container = self.container.id();
        ACTIVE.with(|active| {
            active
                .borrow()
                .iter()
                .filter(|(id, _)| *id == container)
                .map(|(_, key)| *key)
                .collect()
        })
    }

    /// Provides the instance for `key`, extending the current chain
    pub fn provide<T: Injectable>(&self, key: &InjectionKey<T>) -> Result<Arc<T>, ResolutionError> {
        let id = key.id();
        let chain = self.chain();

        if let Some(start) = chain.iter().position(|k| *k == id) {
            let mut cycle = chain[start..].to_vec();
            cycle.push(id);
            return Err(self.cycle(id, cycle));
        }

        let max_depth = self.container.settings().max_resolution_depth;
        if chain.len() >= max_depth {
            tracing::error!("Resolving '{id}' exceeded the depth limit through {chain:?}");
            return Err(ResolutionError::DepthExceeded {
                key: id,
                depth: max_depth,
            });
        }

        let registration = self.container.registration(id)?;

        // Check the type tag before anything is built
        if !registration.product.is::<T>() {
            return Err(ResolutionError::TypeMismatch {
                key: id,
                required: type_name::<T>(),
                registered: registration.product.type_name,
            });
        }

        let _entered = Entered::enter(self.container.id(), id);
        let instance = registration.instance(self)?;

        instance
            .downcast::<T>()
            .map_err(|registered| ResolutionError::TypeMismatch {
                key: id,
                required: type_name::<T>(),
                registered,
            })
    }

    /// Reports waiting for `key` while its builder waits on the current chain
    ///
    /// `path` starts at `key` and ends at a key of the current chain.
    pub(crate) fn blocked(&self, key: KeyId, path: Vec<KeyId>) -> ResolutionError {
        let mut chain = self.chain();
        chain.extend(path.into_iter().skip(1));

        let start = chain
            .last()
            .and_then(|repeated| chain.iter().position(|k| k == repeated))
            .unwrap_or(0);
        self.cycle(key, chain.split_off(start))
    }

    fn cycle(&self, key: KeyId, chain: Vec<KeyId>) -> ResolutionError {
        let error = ResolutionError::CyclicDependency { key, chain };
        tracing::error!("{error}");

        if self.container.settings().panic_on_cycle {
            panic!("{error}");
        }

        error
    }
}
