//! Testing utilities for recordflow pipelines.
//!
//! This module provides:
//! - A sink with configurable failures
//! - A processor that records every hook call

mod failing;
mod recording;

pub use failing::{FailingSink, FailurePoint};
pub use recording::{ProcessorCall, RecordingProcessor};
