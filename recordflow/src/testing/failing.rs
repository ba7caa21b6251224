//! A sink that fails on demand.

use crate::errors::SinkError;
use crate::host::{ExecutionContextHandle, HostRuntimeHandle};
use crate::sink::{OutputSink, SinkRecorder, SinkState};
use crate::Record;
use std::collections::HashSet;

/// Where a [`FailingSink`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    /// `open` returns an error.
    Open,
    /// `write` returns an error once this many records were accepted.
    WriteAfter(usize),
    /// `close` returns an error (the sink still ends up closed).
    Close,
    /// `release` returns an error.
    Release,
    /// `release` panics.
    ReleasePanic,
}

/// A sink that reports into a [`SinkRecorder`] and fails at chosen points.
#[derive(Debug, Default)]
pub struct FailingSink {
    failures: HashSet<FailurePoint>,
    accepted: usize,
    state: SinkState,
    recorder: SinkRecorder,
}

impl FailingSink {
    /// Creates a sink that never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a failure point.
    #[must_use]
    pub fn failing_at(mut self, point: FailurePoint) -> Self {
        self.failures.insert(point);
        self
    }

    /// Returns the recorder tracking accepted records.
    #[must_use]
    pub fn recorder(&self) -> SinkRecorder {
        self.recorder.clone()
    }

    fn write_limit(&self) -> Option<usize> {
        self.failures.iter().find_map(|point| match point {
            FailurePoint::WriteAfter(limit) => Some(*limit),
            _ => None,
        })
    }
}

impl OutputSink for FailingSink {
    fn kind(&self) -> &'static str {
        "failing"
    }

    fn bind_host_runtime(&mut self, _host: Option<HostRuntimeHandle>) {}

    fn bind_execution_context(&mut self, _context: Option<ExecutionContextHandle>) {}

    fn open(&mut self) -> Result<(), SinkError> {
        if self.failures.contains(&FailurePoint::Open) {
            return Err(SinkError::host("destination unavailable"));
        }
        Ok(())
    }

    fn write(&mut self, record: Record) -> Result<(), SinkError> {
        self.state.ensure_writable(self.kind())?;
        if self.write_limit().is_some_and(|limit| self.accepted >= limit) {
            return Err(SinkError::host("write failed"));
        }
        self.accepted += 1;
        self.recorder.push(record);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if !self.state.begin_close() {
            return Ok(());
        }
        if self.failures.contains(&FailurePoint::Close) {
            return Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "flush failed",
            )));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn release(&mut self) -> Result<(), SinkError> {
        if self.failures.contains(&FailurePoint::ReleasePanic) {
            panic!("release exploded");
        }
        if self.failures.contains(&FailurePoint::Release) {
            return Err(SinkError::host("handle already gone"));
        }
        Ok(())
    }
}
