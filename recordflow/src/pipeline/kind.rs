//! Pipeline kinds: what a concrete builder contributes.

use super::{ExportProcessor, NoOpProcessor, PassthroughProcessor, RecordProcessor};
use crate::config::PipelineOptions;
use crate::context::PipelineContext;
use crate::errors::{ConfigurationError, ErrorInfo};
use crate::sink::OutputSink;

/// Describes one flavour of pipeline.
///
/// A kind names the pipeline, validates the merged configuration and
/// creates a fresh processor for every build.
pub trait PipelineKind: Send + Sync {
    /// The processor driven by pipelines of this kind.
    type Processor: RecordProcessor;

    /// Name recorded in the pipeline context.
    fn name(&self) -> &str;

    /// Checks that the configuration can produce a valid pipeline.
    fn validate(&self, _options: &PipelineOptions) -> Result<(), ConfigurationError> {
        Ok(())
    }

    /// Creates the processor for a newly built pipeline.
    fn processor(&self, context: &PipelineContext) -> Self::Processor;

    /// Supplies a kind-specific sink.
    ///
    /// `None` leaves the choice to the builder's sink factory or the
    /// option-driven default. A builder-level factory takes precedence.
    fn sink(&self, _options: &PipelineOptions) -> Option<Box<dyn OutputSink>> {
        None
    }
}

/// Base pipeline: records are consumed, nothing is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpKind;

impl PipelineKind for NoOpKind {
    type Processor = NoOpProcessor;

    fn name(&self) -> &str {
        "noop"
    }

    fn processor(&self, _context: &PipelineContext) -> NoOpProcessor {
        NoOpProcessor
    }
}

/// Every record is written to the sink unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughKind;

impl PipelineKind for PassthroughKind {
    type Processor = PassthroughProcessor;

    fn name(&self) -> &str {
        "passthrough"
    }

    fn processor(&self, _context: &PipelineContext) -> PassthroughProcessor {
        PassthroughProcessor
    }
}

/// Exports records to an output file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportKind;

impl PipelineKind for ExportKind {
    type Processor = ExportProcessor;

    fn name(&self) -> &str {
        "export"
    }

    fn validate(&self, options: &PipelineOptions) -> Result<(), ConfigurationError> {
        if options.output.path.is_none() {
            return Err(ConfigurationError::new("Export requires an output path").with_info(
                ErrorInfo::new("CONFIG-OUTPUT-PATH", "No output destination configured")
                    .with_fix_hint("Set output.path or RECORDFLOW_OUTPUT_PATH.")
                    .with_context_entry("pipeline", self.name()),
            ));
        }
        Ok(())
    }

    fn processor(&self, _context: &PipelineContext) -> ExportProcessor {
        ExportProcessor::new()
    }
}
