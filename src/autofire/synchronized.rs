use std::sync::{Mutex, PoisonError};

/// Runs units of work against a shared value one at a time
///
/// Units of work must not call back into [`Synchronized::run`] on the same instance,
/// the lock is not reentrant.
#[derive(Debug, Default)]
pub struct Synchronized<T> {
    inner: Mutex<T>,
}

impl<T> Synchronized<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Blocks until no other unit of work is running, then runs `f` exclusively
    pub fn run<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        // A panicking consumer must not wedge the whole stage
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
