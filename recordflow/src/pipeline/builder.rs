//! Pipeline builder: accumulate configuration and host hooks, then build.

use super::{ExportKind, NoOpKind, PassthroughKind, Pipeline, PipelineKind};
use crate::config::{PipelineOptions, MAX_JSON_INDENT};
use crate::context::PipelineContext;
use crate::errors::{ConfigurationError, ErrorInfo};
use crate::host::{ExecutionContextHandle, HostRuntimeHandle};
use crate::sink::{sink_for_options, OutputSink, SinkFactory};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Mutable accumulator that produces pipelines.
///
/// Configuration is merged field by field as it is supplied; `build`
/// freezes a copy into a new [`PipelineContext`] and pairs it with a fresh
/// sink. The builder keeps its state, so building again yields an
/// independent pipeline from the same configuration.
pub struct PipelineBuilder<K: PipelineKind> {
    kind: K,
    options: PipelineOptions,
    host: Option<HostRuntimeHandle>,
    execution_context: Option<ExecutionContextHandle>,
    sink_factory: Option<SinkFactory>,
}

impl PipelineBuilder<NoOpKind> {
    /// Creates a builder for the base no-op pipeline.
    #[must_use]
    pub fn no_op() -> Self {
        Self::new(NoOpKind)
    }
}

impl PipelineBuilder<PassthroughKind> {
    /// Creates a builder for a pipeline that writes every record.
    #[must_use]
    pub fn passthrough() -> Self {
        Self::new(PassthroughKind)
    }
}

impl PipelineBuilder<ExportKind> {
    /// Creates an export pipeline builder seeded with `options`.
    #[must_use]
    pub fn export(options: &PipelineOptions) -> Self {
        let mut builder = Self::new(ExportKind);
        builder.configure(Some(options));
        builder
    }
}

impl<K: PipelineKind> PipelineBuilder<K> {
    /// Creates a builder for `kind` with empty configuration.
    #[must_use]
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            options: PipelineOptions::default(),
            host: None,
            execution_context: None,
            sink_factory: None,
        }
    }

    /// Records the host runtime handle for sinks built from now on.
    ///
    /// Last call wins; `None` means the sink runs without host interaction.
    pub fn bind_host_runtime(&mut self, host: Option<HostRuntimeHandle>) -> &mut Self {
        self.host = host;
        self
    }

    /// Records the execution context handle for sinks built from now on.
    ///
    /// Last call wins; `None` is accepted.
    pub fn bind_execution_context(&mut self, context: Option<ExecutionContextHandle>) -> &mut Self {
        self.execution_context = context;
        self
    }

    /// Merges a partial configuration. `None` is a no-op.
    pub fn configure(&mut self, options: Option<&PipelineOptions>) -> &mut Self {
        if let Some(options) = options {
            self.options.merge(options);
        }
        self
    }

    /// Overrides how sinks are created.
    pub fn with_sink_factory<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn(&PipelineOptions) -> Box<dyn OutputSink> + Send + Sync + 'static,
    {
        self.sink_factory = Some(Arc::new(factory));
        self
    }

    /// Returns the configuration accumulated so far.
    #[must_use]
    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Returns the pipeline kind.
    #[must_use]
    pub const fn kind(&self) -> &K {
        &self.kind
    }

    /// Builds a new pipeline from the accumulated state.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the configuration is invalid for
    /// this kind. No pipeline is created in that case.
    pub fn build(&self) -> Result<Pipeline<K::Processor>, ConfigurationError> {
        validate_output(&self.options)?;
        self.kind.validate(&self.options)?;

        let context = PipelineContext::new(self.kind.name(), self.options.clone());

        let mut sink = match self.sink_factory {
            Some(ref factory) => factory(context.options()),
            None => self
                .kind
                .sink(context.options())
                .unwrap_or_else(|| sink_for_options(context.options())),
        };
        sink.bind_host_runtime(self.host.clone());
        sink.bind_execution_context(self.execution_context.clone());

        let processor = self.kind.processor(&context);

        debug!(
            pipeline = %context.name(),
            run_id = %context.run_id(),
            sink = sink.kind(),
            host_bound = self.host.is_some(),
            "Built pipeline"
        );

        Ok(Pipeline::new(context, sink, processor))
    }
}

fn validate_output(options: &PipelineOptions) -> Result<(), ConfigurationError> {
    if let Some(indent) = options.output.json_indent {
        if indent > MAX_JSON_INDENT {
            return Err(ConfigurationError::new(format!(
                "output.json_indent must be between 0 and {MAX_JSON_INDENT}, got {indent}"
            ))
            .with_info(
                ErrorInfo::new("CONFIG-JSON-INDENT", "JSON indent out of range")
                    .with_fix_hint("Use an indent of 0 to 4 spaces."),
            ));
        }
    }
    Ok(())
}

impl<K: PipelineKind + fmt::Debug> fmt::Debug for PipelineBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("host_bound", &self.host.is_some())
            .field("execution_context_bound", &self.execution_context.is_some())
            .field("custom_sink", &self.sink_factory.is_some())
            .finish()
    }
}
