//! In-memory sink.

use super::{OutputSink, SinkState};
use crate::errors::SinkError;
use crate::host::{ExecutionContextHandle, HostRuntimeHandle};
use crate::Record;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct RecorderInner {
    records: Vec<Record>,
    open_calls: usize,
    close_calls: usize,
    release_calls: usize,
    rejected_writes: usize,
    closed: bool,
    host_bound: bool,
    context_bound: bool,
}

/// Observer handle for a [`BufferSink`].
///
/// Cloning the recorder shares the underlying state, so the caller can keep
/// a handle while the sink itself is owned by a pipeline.
#[derive(Debug, Clone, Default)]
pub struct SinkRecorder {
    inner: Arc<Mutex<RecorderInner>>,
}

impl SinkRecorder {
    /// Creates a new recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all accepted records in write order.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().records.clone()
    }

    /// Returns the number of accepted writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Returns the number of writes rejected because the sink was closed.
    #[must_use]
    pub fn rejected_writes(&self) -> usize {
        self.inner.lock().rejected_writes
    }

    /// Returns how many times `open` was called.
    #[must_use]
    pub fn open_calls(&self) -> usize {
        self.inner.lock().open_calls
    }

    /// Returns how many times `close` was called, including no-op repeats.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.inner.lock().close_calls
    }

    /// Returns how many times `release` was called.
    #[must_use]
    pub fn release_calls(&self) -> usize {
        self.inner.lock().release_calls
    }

    /// Returns true once the sink has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Returns true if a host runtime is currently bound.
    #[must_use]
    pub fn host_bound(&self) -> bool {
        self.inner.lock().host_bound
    }

    pub(crate) fn push(&self, record: Record) {
        self.inner.lock().records.push(record);
    }

    /// Returns true if an execution context is currently bound.
    #[must_use]
    pub fn context_bound(&self) -> bool {
        self.inner.lock().context_bound
    }
}

/// A sink that keeps every record in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    recorder: SinkRecorder,
    state: SinkState,
}

impl BufferSink {
    /// Creates a sink with its own recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink reporting into an existing recorder.
    #[must_use]
    pub fn with_recorder(recorder: SinkRecorder) -> Self {
        Self {
            recorder,
            state: SinkState::Open,
        }
    }

    /// Returns a handle to this sink's recorder.
    #[must_use]
    pub fn recorder(&self) -> SinkRecorder {
        self.recorder.clone()
    }
}

impl OutputSink for BufferSink {
    fn kind(&self) -> &'static str {
        "buffer"
    }

    fn bind_host_runtime(&mut self, host: Option<HostRuntimeHandle>) {
        self.recorder.inner.lock().host_bound = host.is_some();
    }

    fn bind_execution_context(&mut self, context: Option<ExecutionContextHandle>) {
        self.recorder.inner.lock().context_bound = context.is_some();
    }

    fn open(&mut self) -> Result<(), SinkError> {
        self.recorder.inner.lock().open_calls += 1;
        Ok(())
    }

    fn write(&mut self, record: Record) -> Result<(), SinkError> {
        let mut inner = self.recorder.inner.lock();
        if let Err(err) = self.state.ensure_writable(self.kind()) {
            inner.rejected_writes += 1;
            return Err(err);
        }
        inner.records.push(record);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        let mut inner = self.recorder.inner.lock();
        inner.close_calls += 1;
        if self.state.begin_close() {
            inner.closed = true;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn release(&mut self) -> Result<(), SinkError> {
        self.recorder.inner.lock().release_calls += 1;
        Ok(())
    }
}
