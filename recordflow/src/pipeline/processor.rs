//! Record processors: the work done inside `process`.

use crate::context::PipelineContext;
use crate::errors::Result;
use crate::release::ReleaseRegistry;
use crate::sink::OutputSink;
use crate::Record;
use tracing::{debug, info};

/// The per-record hook a pipeline drives.
///
/// Processors see the frozen context and write through the sink; they never
/// own either. Resources acquired in `begin` are registered with `releases`
/// so the pipeline frees them exactly once.
pub trait RecordProcessor: Send {
    /// One-time setup, called from `Pipeline::begin`.
    fn begin(&mut self, _context: &PipelineContext, _releases: &ReleaseRegistry) -> Result<()> {
        Ok(())
    }

    /// Consumes one record, writing zero or more results.
    fn process(
        &mut self,
        context: &PipelineContext,
        record: Record,
        sink: &mut dyn OutputSink,
    ) -> Result<()>;

    /// Final work before the sink is closed.
    fn end(&mut self, _context: &PipelineContext, _sink: &mut dyn OutputSink) -> Result<()> {
        Ok(())
    }

    /// Frees processor-owned resources.
    ///
    /// Runs once during `Pipeline::release`, after the registered release
    /// steps and before the sink is released, whatever state the pipeline
    /// reached.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Consumes records without producing output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProcessor;

impl RecordProcessor for NoOpProcessor {
    fn process(
        &mut self,
        _context: &PipelineContext,
        _record: Record,
        _sink: &mut dyn OutputSink,
    ) -> Result<()> {
        Ok(())
    }
}

/// Writes every record to the sink unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughProcessor;

impl RecordProcessor for PassthroughProcessor {
    fn process(
        &mut self,
        _context: &PipelineContext,
        record: Record,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        sink.write(record)?;
        Ok(())
    }
}

/// Exports records to the configured output.
///
/// Null records carry nothing to export and are skipped.
#[derive(Debug, Clone, Default)]
pub struct ExportProcessor {
    exported: usize,
    skipped: usize,
}

impl ExportProcessor {
    /// Creates a new export processor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of exported records.
    #[must_use]
    pub const fn exported(&self) -> usize {
        self.exported
    }

    /// Returns the number of skipped records.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl RecordProcessor for ExportProcessor {
    fn process(
        &mut self,
        context: &PipelineContext,
        record: Record,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        if record.is_null() {
            self.skipped += 1;
            debug!(run_id = %context.run_id(), "Skipping null record");
            return Ok(());
        }
        sink.write(record)?;
        self.exported += 1;
        Ok(())
    }

    fn end(&mut self, context: &PipelineContext, _sink: &mut dyn OutputSink) -> Result<()> {
        info!(
            pipeline = %context.name(),
            run_id = %context.run_id(),
            exported = self.exported,
            skipped = self.skipped,
            "Export complete"
        );
        Ok(())
    }
}
