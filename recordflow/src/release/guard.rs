//! Scoped acquisition with guaranteed release.

use std::ops::{Deref, DerefMut};

/// Holds a value and releases it exactly once.
///
/// The release closure runs on [`ReleaseGuard::release`] or, failing that,
/// when the guard is dropped, including during unwinding.
pub struct ReleaseGuard<T, F>
where
    F: FnOnce(T),
{
    value: Option<T>,
    release: Option<F>,
}

impl<T, F> ReleaseGuard<T, F>
where
    F: FnOnce(T),
{
    /// Wraps `value`, arranging for `release` to run exactly once.
    pub const fn new(value: T, release: F) -> Self {
        Self {
            value: Some(value),
            release: Some(release),
        }
    }

    /// Releases the value now.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let (Some(value), Some(release)) = (self.value.take(), self.release.take()) {
            release(value);
        }
    }
}

impl<T, F> Deref for ReleaseGuard<T, F>
where
    F: FnOnce(T),
{
    type Target = T;

    fn deref(&self) -> &T {
        self.value
            .as_ref()
            .unwrap_or_else(|| unreachable!("guard value is present until release"))
    }
}

impl<T, F> DerefMut for ReleaseGuard<T, F>
where
    F: FnOnce(T),
{
    fn deref_mut(&mut self) -> &mut T {
        self.value
            .as_mut()
            .unwrap_or_else(|| unreachable!("guard value is present until release"))
    }
}

impl<T, F> Drop for ReleaseGuard<T, F>
where
    F: FnOnce(T),
{
    fn drop(&mut self) {
        self.run_release();
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for ReleaseGuard<T, F>
where
    F: FnOnce(T),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseGuard")
            .field("value", &self.value)
            .field("released", &self.value.is_none())
            .finish()
    }
}
