//! Running flag shared between a session and its reader thread.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A boolean flag with blocking wait support.
///
/// The reader thread sets it once it is running and clears it when it exits;
/// the session clears it to ask the reader to stop and waits on it while
/// starting.
#[derive(Debug, Clone, Default)]
pub struct RunningFlag {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl RunningFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.store(true);
    }

    pub fn clear(&self) {
        self.store(false);
    }

    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Block until the flag is set or `timeout` elapses.
    ///
    /// Returns the flag's value when the wait ends.
    pub fn wait_set(&self, timeout: Duration) -> bool {
        let (_, condvar) = &*self.inner;
        let (guard, _) = condvar
            .wait_timeout_while(self.lock(), timeout, |running| !*running)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    fn store(&self, value: bool) {
        *self.lock() = value;
        self.inner.1.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the flag when dropped, including while unwinding.
pub(crate) struct ClearOnDrop(pub(crate) RunningFlag);

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.clear();
    }
}
