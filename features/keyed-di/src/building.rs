use std::{
    collections::HashMap,
    thread::{self, ThreadId},
};

use parking_lot::{Condvar, Mutex};

use crate::key::KeyId;

/// Singleton builds in progress on any thread
///
/// A thread claims a key before running its singleton factory. Racing callers
/// wait for the claim to be released. Before waiting, the waits between
/// builders are followed, and a wait that would lead back to the caller is
/// refused, since every thread in that loop would block forever.
#[derive(Default)]
pub(crate) struct Builds {
    state: Mutex<BuildState>,
    released: Condvar,
}

#[derive(Default)]
struct BuildState {
    /// Thread building each key
    builders: HashMap<KeyId, ThreadId>,
    /// Key each blocked thread waits for
    waiting: HashMap<ThreadId, KeyId>,
}

impl BuildState {
    /// Keys from `key` on, if waiting for `key` closes a loop of waits back to `me`
    ///
    /// The last key of the path is one `me` is building itself.
    fn blocked_path(&self, key: KeyId, me: ThreadId) -> Option<Vec<KeyId>> {
        let mut path = vec![key];
        let mut next = key;
        while let Some(owner) = self.builders.get(&next) {
            if *owner == me {
                return Some(path);
            }
            next = *self.waiting.get(owner)?;
            if path.contains(&next) {
                return None;
            }
            path.push(next);
        }
        None
    }
}

pub(crate) enum Claim<'a, V> {
    /// Another thread built the value while the caller waited
    Ready(V),
    /// The caller builds, other callers wait until the guard is dropped
    Build(BuildGuard<'a>),
}

impl Builds {
    /// Claims `key` for building, unless `ready` yields a value first
    ///
    /// Fails with the blocked path when waiting would deadlock.
    pub(crate) fn claim<V>(
        &self,
        key: KeyId,
        ready: impl Fn() -> Option<V>,
    ) -> Result<Claim<'_, V>, Vec<KeyId>> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        loop {
            if let Some(value) = ready() {
                return Ok(Claim::Ready(value));
            }

            if !state.builders.contains_key(&key) {
                state.builders.insert(key, me);
                return Ok(Claim::Build(BuildGuard { builds: self, key }));
            }

            if let Some(path) = state.blocked_path(key, me) {
                return Err(path);
            }

            tracing::debug!("Waiting for '{key}' to be built on another thread");
            state.waiting.insert(me, key);
            self.released.wait(&mut state);
            state.waiting.remove(&me);
        }
    }
}

/// Releases a claimed key when dropped, also when the factory failed or panicked
pub(crate) struct BuildGuard<'a> {
    builds: &'a Builds,
    key: KeyId,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.builds.state.lock().builders.remove(&self.key);
        self.builds.released.notify_all();
    }
}
