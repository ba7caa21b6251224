//! Immutable per-run configuration.
//!
//! A `PipelineContext` is created once per build and owned by exactly one
//! pipeline. Nothing writes to it after construction, so stages may read it
//! freely.

mod run;

pub use run::PipelineContext;
