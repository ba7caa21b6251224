//! Output sinks.
//!
//! This module provides:
//! - The `OutputSink` contract and shared open/closed bookkeeping
//! - In-memory, host and file sinks
//! - Document serialization and text encoding helpers

mod buffer;
mod file;
mod format;
mod host;
mod writer;

pub use buffer::{BufferSink, SinkRecorder};
pub use file::{FileSink, WRITE_FILE_ACTION};
pub use format::{encode_text, serialize_records};
pub use host::HostSink;
pub use writer::{OutputSink, SinkState};

use crate::config::PipelineOptions;
use std::sync::Arc;

/// Creates a fresh sink for each built pipeline.
pub type SinkFactory = Arc<dyn Fn(&PipelineOptions) -> Box<dyn OutputSink> + Send + Sync>;

/// Chooses the default sink for a configuration.
///
/// A configured output path selects a [`FileSink`]; otherwise output goes
/// to the host through a [`HostSink`].
#[must_use]
pub fn sink_for_options(options: &PipelineOptions) -> Box<dyn OutputSink> {
    match options.output.path {
        Some(ref path) => Box::new(FileSink::new(path, &options.output)),
        None => Box::new(HostSink::new(&options.output)),
    }
}
