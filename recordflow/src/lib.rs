//! # Recordflow
//!
//! A three-phase record pipeline core.
//!
//! A pipeline is assembled by a builder, driven through `begin`, `process`
//! and `end`, and releases everything it holds exactly once. It provides:
//!
//! - **Builders**: Accumulate host hooks and options, then build any number
//!   of independent pipelines
//! - **Frozen context**: Each pipeline sees a snapshot of the configuration
//!   taken at build time
//! - **Output sinks**: Records are written to the host, a file or memory
//! - **Deterministic release**: Explicit, scoped or on drop; never twice
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recordflow::prelude::*;
//!
//! let options = PipelineOptions::new()
//!     .with_output(OutputOptions::new().with_path("repos.json"));
//!
//! let mut pipeline = PipelineBuilder::export(&options).build()?;
//! pipeline.run(records)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod errors;
pub mod host;
pub mod logging;
pub mod pipeline;
pub mod release;
pub mod sink;
pub mod testing;

/// A unit of data flowing through a pipeline.
pub type Record = serde_json::Value;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{OutputEncoding, OutputFormat, OutputOptions, PipelineOptions};
    pub use crate::context::PipelineContext;
    pub use crate::errors::{
        ConfigurationError, ErrorInfo, LifecycleMisuseError, RecordflowError, ReleaseReport,
        SinkError,
    };
    pub use crate::host::{
        ExecutionContext, HostRuntime, StaticExecutionContext, TracingHost,
    };
    pub use crate::pipeline::{
        ExportKind, NoOpKind, PassthroughKind, Pipeline, PipelineBuilder, PipelineKind,
        PipelineLifecycle, PipelineState, RecordProcessor,
    };
    pub use crate::release::{ReleaseGuard, ReleaseRegistry};
    pub use crate::sink::{BufferSink, FileSink, HostSink, OutputSink};
    pub use crate::Record;
}
