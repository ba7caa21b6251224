//! Host capability handles.
//!
//! The surrounding application injects up to two opaque handles: a
//! [`HostRuntime`] for emitting output and asking permission, and an
//! [`ExecutionContext`] describing the environment. The pipeline core never
//! inspects them; it forwards them to the output sink.

use crate::Record;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn, Level};

/// Shared host runtime handle.
pub type HostRuntimeHandle = Arc<dyn HostRuntime>;

/// Shared execution context handle.
pub type ExecutionContextHandle = Arc<dyn ExecutionContext>;

/// The invoking host's output and permission channel.
#[cfg_attr(test, mockall::automock)]
pub trait HostRuntime: Send + Sync {
    /// Writes one object to the host's output stream.
    fn write_object(&self, record: &Record);

    /// Writes a verbose diagnostic message.
    fn write_verbose(&self, message: &str);

    /// Writes a warning message.
    fn write_warning(&self, message: &str);

    /// Asks the host whether `action` may be performed on `target`.
    fn should_process(&self, target: &str, action: &str) -> bool;
}

/// The invoking host's execution environment.
#[cfg_attr(test, mockall::automock)]
pub trait ExecutionContext: Send + Sync {
    /// The host's current working directory, used to root relative paths.
    fn working_directory(&self) -> Option<PathBuf>;

    /// Looks up a host session variable.
    fn session_variable(&self, name: &str) -> Option<serde_json::Value>;
}

/// A host runtime that logs everything through `tracing` and approves
/// every action.
#[derive(Debug, Clone)]
pub struct TracingHost {
    level: Level,
}

impl Default for TracingHost {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl TracingHost {
    /// Creates a tracing host that logs objects at `level`.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }
}

impl HostRuntime for TracingHost {
    fn write_object(&self, record: &Record) {
        if self.level == Level::DEBUG || self.level == Level::TRACE {
            debug!(record = %record, "Output object");
        } else {
            info!(record = %record, "Output object");
        }
    }

    fn write_verbose(&self, message: &str) {
        debug!("{}", message);
    }

    fn write_warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn should_process(&self, _target: &str, _action: &str) -> bool {
        true
    }
}

/// A fixed execution context.
#[derive(Debug, Clone, Default)]
pub struct StaticExecutionContext {
    working_directory: Option<PathBuf>,
    variables: HashMap<String, serde_json::Value>,
}

impl StaticExecutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Sets a session variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }
}

impl ExecutionContext for StaticExecutionContext {
    fn working_directory(&self) -> Option<PathBuf> {
        self.working_directory.clone()
    }

    fn session_variable(&self, name: &str) -> Option<serde_json::Value> {
        self.variables.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_host_approves() {
        let host = TracingHost::default();
        host.write_object(&serde_json::json!({"name": "repo"}));
        host.write_verbose("verbose");
        host.write_warning("warning");
        assert!(host.should_process("out.json", "Write output file"));
    }

    #[test]
    fn test_static_execution_context() {
        let ctx = StaticExecutionContext::new()
            .with_working_directory("/work")
            .with_variable("PWD", serde_json::json!("/work"));

        assert_eq!(ctx.working_directory(), Some(PathBuf::from("/work")));
        assert_eq!(ctx.session_variable("PWD"), Some(serde_json::json!("/work")));
        assert_eq!(ctx.session_variable("missing"), None);
    }
}
