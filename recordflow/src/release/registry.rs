//! Registry of release steps executed once, in LIFO order.

use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

type ReleaseStep = Box<dyn FnOnce() -> Result<(), String> + Send>;

/// Registry for release steps executed in LIFO order.
///
/// Steps run at most once. A failing or panicking step is recorded and the
/// remaining steps still run.
#[derive(Default)]
pub struct ReleaseRegistry {
    steps: Mutex<Vec<(String, ReleaseStep)>>,
    drained: AtomicBool,
}

impl ReleaseRegistry {
    /// Creates a new registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a release step.
    ///
    /// Registering after the registry has been drained runs the step
    /// immediately so the resource is not leaked. The outcome of that run
    /// is returned; `None` means the step was queued.
    pub fn register<F, E>(&self, name: impl Into<String>, step: F) -> Option<Result<(), String>>
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Display,
    {
        let name = name.into();
        let boxed: ReleaseStep = Box::new(move || step().map_err(|err| err.to_string()));

        let mut steps = self.steps.lock();
        if self.drained.load(Ordering::SeqCst) {
            drop(steps);
            return Some(run_step(&name, boxed));
        }
        steps.push((name, boxed));
        None
    }

    /// Returns the number of pending steps.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.steps.lock().len()
    }

    /// Runs all pending steps in LIFO order.
    ///
    /// Returns the names of completed steps and the failed steps with their
    /// messages.
    pub fn run_all(&self) -> (Vec<String>, Vec<(String, String)>) {
        self.drained.store(true, Ordering::SeqCst);
        let steps = std::mem::take(&mut *self.steps.lock());
        run_steps(steps)
    }
}

/// Runs a single named step, catching errors and panics.
pub(crate) fn run_step<F>(name: &str, step: F) -> Result<(), String>
where
    F: FnOnce() -> Result<(), String>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(step)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(msg)) => {
            warn!(step = %name, error = %msg, "Release step failed");
            Err(msg)
        }
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            warn!(step = %name, error = %msg, "Release step panicked");
            Err(msg)
        }
    }
}

fn run_steps(steps: Vec<(String, ReleaseStep)>) -> (Vec<String>, Vec<(String, String)>) {
    let mut completed = Vec::new();
    let mut failed = Vec::new();

    for (name, step) in steps.into_iter().rev() {
        match run_step(&name, step) {
            Ok(()) => completed.push(name),
            Err(msg) => failed.push((name, msg)),
        }
    }

    (completed, failed)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

impl std::fmt::Debug for ReleaseRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseRegistry")
            .field("pending_count", &self.pending_count())
            .field("drained", &self.drained.load(Ordering::SeqCst))
            .finish()
    }
}
