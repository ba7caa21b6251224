//! A processor that records every hook call.

use crate::context::PipelineContext;
use crate::errors::{RecordflowError, Result};
use crate::pipeline::RecordProcessor;
use crate::release::ReleaseRegistry;
use crate::sink::OutputSink;
use crate::Record;
use parking_lot::Mutex;
use std::sync::Arc;

/// A hook invocation seen by a [`RecordingProcessor`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorCall {
    /// `begin` ran.
    Begin,
    /// `process` ran with this record.
    Process(Record),
    /// `end` ran.
    End,
    /// The release step registered in `begin` ran.
    ReleaseStep,
    /// The processor's own `release` hook ran.
    Released,
}

/// Records hook calls and writes each record `fan_out` times.
#[derive(Debug, Clone)]
pub struct RecordingProcessor {
    calls: Arc<Mutex<Vec<ProcessorCall>>>,
    fan_out: usize,
    fail_at: Option<usize>,
    seen: usize,
}

impl Default for RecordingProcessor {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            fan_out: 1,
            fail_at: None,
            seen: 0,
        }
    }
}

impl RecordingProcessor {
    /// Creates a processor writing each record once.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes each record `fan_out` times (zero drops records).
    #[must_use]
    pub const fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Fails on the record with this zero-based index.
    #[must_use]
    pub const fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Returns all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<ProcessorCall> {
        self.calls.lock().clone()
    }
}

impl RecordProcessor for RecordingProcessor {
    fn begin(&mut self, _context: &PipelineContext, releases: &ReleaseRegistry) -> Result<()> {
        self.calls.lock().push(ProcessorCall::Begin);
        let calls = self.calls.clone();
        releases.register("recording-processor", move || {
            calls.lock().push(ProcessorCall::ReleaseStep);
            Ok::<(), String>(())
        });
        Ok(())
    }

    fn process(
        &mut self,
        _context: &PipelineContext,
        record: Record,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        let index = self.seen;
        self.seen += 1;
        self.calls.lock().push(ProcessorCall::Process(record.clone()));

        if self.fail_at == Some(index) {
            return Err(RecordflowError::processing_failed(format!("record {index} rejected")));
        }
        for _ in 0..self.fan_out {
            sink.write(record.clone())?;
        }
        Ok(())
    }

    fn end(&mut self, _context: &PipelineContext, _sink: &mut dyn OutputSink) -> Result<()> {
        self.calls.lock().push(ProcessorCall::End);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.calls.lock().push(ProcessorCall::Released);
        Ok(())
    }
}
