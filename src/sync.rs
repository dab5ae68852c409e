//! Exclusive-access wrapper for values shared between tasks.
//!
//! [`Synchronized`] owns one value and one mutex. The only way to reach the
//! value is through an [`Access`] handle, which holds the lock until it is
//! dropped. There is no shared read mode: readers and writers both take the
//! exclusive handle, so critical sections must stay short.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A value guarded by a mutex, reachable only through scoped handles
pub struct Synchronized<T> {
    value: Mutex<T>,
}

/// Scoped exclusive handle to a [`Synchronized`] value.
///
/// The lock is released when the handle is dropped, including during
/// unwinding. The handle is not `Send` and cannot outlive the borrow of the
/// wrapper it came from.
pub struct Access<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> Synchronized<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// Block until no other handle exists, then return an exclusive handle
    pub fn access(&self) -> Access<'_, T> {
        Access {
            guard: self.value.lock(),
        }
    }

    /// Swap in a new value and return the previous one.
    ///
    /// The lock is held only for the swap; the old value is handed back so
    /// the caller drops it outside the critical section.
    pub fn replace(&self, value: T) -> T {
        let mut access = self.access();
        std::mem::replace(&mut *access, value)
    }

    /// Run `f` with exclusive access and release the lock when it returns
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut access = self.access();
        f(&mut access)
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for Synchronized<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Synchronized<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronized")
            .field("locked", &self.value.is_locked())
            .finish()
    }
}

impl<T> Deref for Access<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for Access<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
