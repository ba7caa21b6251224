//! Error types for the recordflow pipeline core.
//!
//! Configuration problems surface at build time, lifecycle misuse surfaces
//! at the offending call, and sink failures surface to whoever called
//! `process` or `end`. Release never fails; it reports.

use crate::pipeline::PipelineState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for recordflow operations.
#[derive(Debug, Error)]
pub enum RecordflowError {
    /// The accumulated configuration cannot produce a valid pipeline.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A lifecycle method was called out of sequence.
    #[error("{0}")]
    LifecycleMisuse(#[from] LifecycleMisuseError),

    /// The output sink failed to write or close.
    #[error("{0}")]
    Sink(#[from] SinkError),

    /// A record processor failed.
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

impl RecordflowError {
    /// Creates a processing failure.
    #[must_use]
    pub fn processing_failed(message: impl Into<String>) -> Self {
        Self::ProcessingFailed(message.into())
    }

    /// Returns true if this is a lifecycle misuse error.
    #[must_use]
    pub const fn is_lifecycle_misuse(&self) -> bool {
        matches!(self, Self::LifecycleMisuse(_))
    }

    /// Returns true if this is a sink error.
    #[must_use]
    pub const fn is_sink(&self) -> bool {
        matches!(self, Self::Sink(_))
    }
}

/// Diagnostic metadata attached to configuration errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "CONFIG-OUTPUT-PATH").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when configuration is insufficient or contradictory.
///
/// No partial pipeline is ever returned alongside this error.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ConfigurationError {
    /// The error message.
    pub message: String,
    /// Optional diagnostic info.
    pub info: Option<ErrorInfo>,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            info: None,
        }
    }

    /// Sets the diagnostic info.
    #[must_use]
    pub fn with_info(mut self, info: ErrorInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Returns the error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.code.as_str())
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("message".to_string(), serde_json::json!(self.message));
        if let Some(ref info) = self.info {
            map.insert(
                "info".to_string(),
                serde_json::to_value(info).unwrap_or(serde_json::Value::Null),
            );
        }
        serde_json::Value::Object(map)
    }
}

/// Error raised when a lifecycle method is called in the wrong state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot call '{operation}' on a pipeline in state '{state}'")]
pub struct LifecycleMisuseError {
    /// The operation that was attempted.
    pub operation: &'static str,
    /// The state the pipeline was in.
    pub state: PipelineState,
}

impl LifecycleMisuseError {
    /// Creates a new lifecycle misuse error.
    #[must_use]
    pub const fn new(operation: &'static str, state: PipelineState) -> Self {
        Self { operation, state }
    }
}

/// Errors raised by output sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink was already closed.
    #[error("Sink '{sink}' is closed")]
    Closed {
        /// The sink kind.
        sink: &'static str,
    },

    /// The host handle reported a failure.
    #[error("Host error: {0}")]
    Host(String),

    /// Records could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Creates a closed-sink error.
    #[must_use]
    pub const fn closed(sink: &'static str) -> Self {
        Self::Closed { sink }
    }

    /// Creates a host error.
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for SinkError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Outcome of a release.
///
/// Release always completes; failed steps are listed here by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Steps that ran, in execution order.
    pub completed: Vec<String>,
    /// Steps that failed, with their error messages.
    pub failures: Vec<(String, String)>,
    /// True if this call performed the release (false for repeat calls).
    pub performed: bool,
}

impl ReleaseReport {
    /// Report for a release call that found the instance already released.
    #[must_use]
    pub const fn already_released() -> Self {
        Self {
            completed: Vec::new(),
            failures: Vec::new(),
            performed: false,
        }
    }

    /// Returns true if no step failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result alias for recordflow operations.
pub type Result<T, E = RecordflowError> = std::result::Result<T, E>;
