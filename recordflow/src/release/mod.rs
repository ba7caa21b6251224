//! Deterministic resource release.
//!
//! This module provides:
//! - A registry of named release steps run once in LIFO order
//! - A scoped guard that releases its value on every exit path

mod guard;
mod registry;

pub use guard::ReleaseGuard;
pub use registry::ReleaseRegistry;

pub(crate) use registry::run_step;
