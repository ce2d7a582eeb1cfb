use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared liveness registry correlating start and stop requests.
///
/// An entry is created when a session starts and removed either by a stop
/// request or by the relay loop on its terminal transition; presence means
/// alive. Sessions only ever touch their own key, so the mutex guards
/// nothing but the map's internal mutation. Cloning the registry clones a
/// handle to the same underlying set.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a session as alive, overwriting any stale entry for the id.
    pub fn begin(&self, id: &str) {
        self.lock().insert(id.to_string());
    }

    /// Returns true iff the id is currently registered as alive.
    ///
    /// A removal performed by a concurrent `end` call is visible to the
    /// very next poll.
    pub fn is_alive(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    /// Removes a session. Idempotent; unknown ids are a no-op.
    pub fn end(&self, id: &str) {
        self.lock().remove(id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
