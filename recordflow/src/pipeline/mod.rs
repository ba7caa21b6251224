//! Pipeline building and execution.
//!
//! This module provides:
//! - The builder that merges configuration and host hooks
//! - Pipeline kinds and their record processors
//! - The three-phase runtime with deterministic release

mod builder;
#[cfg(test)]
mod integration_tests;
mod kind;
mod processor;
mod runtime;
mod state;

pub use builder::PipelineBuilder;
pub use kind::{ExportKind, NoOpKind, PassthroughKind, PipelineKind};
pub use processor::{ExportProcessor, NoOpProcessor, PassthroughProcessor, RecordProcessor};
pub use runtime::{Pipeline, PipelineLifecycle};
pub use state::PipelineState;
