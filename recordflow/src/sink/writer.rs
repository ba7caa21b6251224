//! The output sink contract.

use crate::errors::SinkError;
use crate::host::{ExecutionContextHandle, HostRuntimeHandle};
use crate::Record;
use std::fmt::Debug;

/// A destination for pipeline results.
///
/// A sink is bound to at most one host runtime and one execution context
/// at a time (rebinding replaces the previous handle), written to during
/// `process`/`end`, and closed exactly once. Closing is idempotent; writing
/// after close is an error.
pub trait OutputSink: Send + Debug {
    /// Short name of the sink kind, used in errors and logs.
    fn kind(&self) -> &'static str;

    /// Binds (or unbinds) the host runtime handle.
    fn bind_host_runtime(&mut self, host: Option<HostRuntimeHandle>);

    /// Binds (or unbinds) the execution context handle.
    fn bind_execution_context(&mut self, context: Option<ExecutionContextHandle>);

    /// Primes the sink before the first write.
    fn open(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Emits one result.
    fn write(&mut self, record: Record) -> Result<(), SinkError>;

    /// Flushes and signals that no more output follows.
    ///
    /// Calls after the first are no-ops.
    fn close(&mut self) -> Result<(), SinkError>;

    /// Returns true once `close` has been called.
    fn is_closed(&self) -> bool;

    /// Releases held resources without any flush guarantee.
    fn release(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Open/closed bookkeeping shared by sink implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkState {
    /// Accepting writes.
    #[default]
    Open,
    /// Closed; writes are rejected.
    Closed,
}

impl SinkState {
    /// Returns an error if the sink no longer accepts writes.
    pub fn ensure_writable(self, sink: &'static str) -> Result<(), SinkError> {
        match self {
            Self::Open => Ok(()),
            Self::Closed => Err(SinkError::closed(sink)),
        }
    }

    /// Marks the sink closed.
    ///
    /// Returns true only for the call that performed the transition, so the
    /// caller flushes exactly once even if the flush later fails.
    pub fn begin_close(&mut self) -> bool {
        let first = *self == Self::Open;
        *self = Self::Closed;
        first
    }

    /// Returns true if closed.
    #[must_use]
    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}
