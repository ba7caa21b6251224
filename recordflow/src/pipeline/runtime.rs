//! The pipeline runtime and its lifecycle.

use super::{PipelineState, RecordProcessor};
use crate::context::PipelineContext;
use crate::errors::{LifecycleMisuseError, ReleaseReport, Result};
use crate::release::{run_step, ReleaseGuard, ReleaseRegistry};
use crate::sink::OutputSink;
use crate::Record;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace, warn};

/// Object-safe view of the pipeline lifecycle.
///
/// Lets a host drive pipelines of different processor types uniformly.
pub trait PipelineLifecycle {
    /// `Created -> Begun`.
    fn begin(&mut self) -> Result<()>;

    /// Consumes one record. Valid only while `Begun`.
    fn process(&mut self, record: Record) -> Result<()>;

    /// `Begun -> Ended`; closes the sink.
    fn end(&mut self) -> Result<()>;

    /// Releases all resources. Idempotent and infallible.
    fn release(&mut self) -> ReleaseReport;

    /// Returns the current state.
    fn state(&self) -> PipelineState;
}

/// A single-use, three-phase record pipeline.
///
/// Owns one [`PipelineContext`], one sink and one processor for its whole
/// lifetime. Drive it with `begin`, any number of `process` calls, then
/// `end`; finally `release` (or drop) it. Calls out of that order fail with
/// a [`LifecycleMisuseError`].
pub struct Pipeline<P: RecordProcessor> {
    context: PipelineContext,
    sink: Box<dyn OutputSink>,
    processor: P,
    state: PipelineState,
    releases: ReleaseRegistry,
    released: AtomicBool,
    processed: usize,
}

impl<P: RecordProcessor> Pipeline<P> {
    /// Wires a pipeline to its context, sink and processor.
    pub fn new(context: PipelineContext, sink: Box<dyn OutputSink>, processor: P) -> Self {
        Self {
            context,
            sink,
            processor,
            state: PipelineState::Created,
            releases: ReleaseRegistry::new(),
            released: AtomicBool::new(false),
            processed: 0,
        }
    }

    /// Returns the run context.
    #[must_use]
    pub const fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Returns the output sink.
    #[must_use]
    pub fn sink(&self) -> &dyn OutputSink {
        self.sink.as_ref()
    }

    /// Returns the processor.
    #[must_use]
    pub const fn processor(&self) -> &P {
        &self.processor
    }

    /// Returns the number of records processed so far.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.processed
    }

    /// Returns true once the pipeline has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Registers a step to run when the pipeline is released.
    ///
    /// Steps run in LIFO order, before the processor and the sink are
    /// released. On an already released pipeline the step runs at once and
    /// its outcome is returned.
    pub fn on_release<F, E>(
        &self,
        name: impl Into<String>,
        step: F,
    ) -> Option<std::result::Result<(), String>>
    where
        F: FnOnce() -> std::result::Result<(), E> + Send + 'static,
        E: Display,
    {
        self.releases.register(name, step)
    }

    /// Performs one-time setup and primes the sink.
    ///
    /// # Errors
    ///
    /// Fails with a lifecycle error unless the pipeline is `Created`, or
    /// with whatever the sink or processor reports. A failed setup is not
    /// retried: the pipeline releases whatever was acquired and ends up
    /// `Released`.
    pub fn begin(&mut self) -> Result<()> {
        self.expect_state("begin", PipelineState::Created)?;

        if let Err(err) = self.set_up() {
            warn!(
                pipeline = %self.context.name(),
                run_id = %self.context.run_id(),
                state = %self.state,
                error = %err,
                "Pipeline begin failed, releasing"
            );
            self.release();
            return Err(err);
        }
        self.state = PipelineState::Begun;

        debug!(
            pipeline = %self.context.name(),
            run_id = %self.context.run_id(),
            state = %self.state,
            sink = self.sink.kind(),
            "Pipeline begun"
        );
        Ok(())
    }

    fn set_up(&mut self) -> Result<()> {
        self.sink.open()?;
        self.processor.begin(&self.context, &self.releases)
    }

    /// Processes one record.
    ///
    /// Sink side effects happen in call order.
    ///
    /// # Errors
    ///
    /// Fails with a lifecycle error unless the pipeline is `Begun`, or
    /// with whatever the processor or sink reports.
    pub fn process(&mut self, record: Record) -> Result<()> {
        self.expect_state("process", PipelineState::Begun)?;

        self.processor
            .process(&self.context, record, self.sink.as_mut())?;
        self.processed += 1;

        trace!(
            pipeline = %self.context.name(),
            run_id = %self.context.run_id(),
            state = %self.state,
            records = self.processed,
            "Record processed"
        );
        Ok(())
    }

    /// Finishes processing and closes the sink.
    ///
    /// The pipeline is `Ended` afterwards even if this returns an error;
    /// the sink is closed regardless of the processor's outcome.
    ///
    /// # Errors
    ///
    /// Fails with a lifecycle error unless the pipeline is `Begun`, or
    /// with the first error from the processor or the sink.
    pub fn end(&mut self) -> Result<()> {
        self.expect_state("end", PipelineState::Begun)?;
        self.state = PipelineState::Ended;

        let processed = self.processor.end(&self.context, self.sink.as_mut());
        let closed = self.sink.close();

        info!(
            pipeline = %self.context.name(),
            run_id = %self.context.run_id(),
            state = %self.state,
            records = self.processed,
            "Pipeline ended"
        );

        processed?;
        closed?;
        Ok(())
    }

    /// Releases every held resource exactly once.
    ///
    /// Valid in any state. Repeat calls are no-ops. Failing steps are logged
    /// and reported; the pipeline is `Released` afterwards regardless.
    /// Releasing without `end` discards any unflushed output.
    pub fn release(&mut self) -> ReleaseReport {
        if self.released.swap(true, Ordering::SeqCst) {
            return ReleaseReport::already_released();
        }

        let previous = self.state;
        self.state = PipelineState::Released;

        let (mut completed, mut failures) = self.releases.run_all();

        let processor = &mut self.processor;
        let outcome = run_step("processor", || processor.release().map_err(|err| err.to_string()));
        record_step("processor", outcome, &mut completed, &mut failures);

        let sink = self.sink.as_mut();
        let outcome = run_step("sink", || sink.release().map_err(|err| err.to_string()));
        record_step("sink", outcome, &mut completed, &mut failures);

        if previous != PipelineState::Ended {
            warn!(
                pipeline = %self.context.name(),
                run_id = %self.context.run_id(),
                state = %previous,
                "Pipeline released before end; output may be incomplete"
            );
        }
        debug!(
            pipeline = %self.context.name(),
            run_id = %self.context.run_id(),
            state = %self.state,
            records = self.processed,
            failures = failures.len(),
            "Pipeline released"
        );

        ReleaseReport {
            completed,
            failures,
            performed: true,
        }
    }

    /// Drives `begin`, `process` for each record, then `end`, releasing the
    /// pipeline on every exit path.
    ///
    /// Returns the number of processed records.
    ///
    /// # Errors
    ///
    /// Fails with a lifecycle error, leaving the pipeline untouched, unless
    /// it is `Created`. Otherwise returns the first processor or sink error;
    /// the pipeline is released either way.
    pub fn run<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Record>,
    {
        self.expect_state("run", PipelineState::Created)?;

        let mut pipeline = ReleaseGuard::new(self, |pipeline: &mut Self| {
            pipeline.release();
        });

        pipeline.begin()?;
        for record in records {
            pipeline.process(record)?;
        }
        pipeline.end()?;

        Ok(pipeline.processed())
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: PipelineState,
    ) -> std::result::Result<(), LifecycleMisuseError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleMisuseError::new(operation, self.state))
        }
    }
}

fn record_step(
    name: &str,
    outcome: std::result::Result<(), String>,
    completed: &mut Vec<String>,
    failures: &mut Vec<(String, String)>,
) {
    match outcome {
        Ok(()) => completed.push(name.to_string()),
        Err(msg) => failures.push((name.to_string(), msg)),
    }
}

impl<P: RecordProcessor> PipelineLifecycle for Pipeline<P> {
    fn begin(&mut self) -> Result<()> {
        Self::begin(self)
    }

    fn process(&mut self, record: Record) -> Result<()> {
        Self::process(self, record)
    }

    fn end(&mut self) -> Result<()> {
        Self::end(self)
    }

    fn release(&mut self) -> ReleaseReport {
        Self::release(self)
    }

    fn state(&self) -> PipelineState {
        Self::state(self)
    }
}

impl<P: RecordProcessor> Drop for Pipeline<P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<P: RecordProcessor + std::fmt::Debug> std::fmt::Debug for Pipeline<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.context.name())
            .field("run_id", &self.context.run_id())
            .field("state", &self.state)
            .field("sink", &self.sink)
            .field("processor", &self.processor)
            .field("processed", &self.processed)
            .finish_non_exhaustive()
    }
}
