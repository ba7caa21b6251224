//! Pipeline configuration.
//!
//! This module provides:
//! - Partial option groups with a field-wise merge rule
//! - Loading from JSON/YAML documents and environment overrides

mod loader;
mod options;

pub use loader::ENV_PREFIX;
pub use options::{
    OutputEncoding, OutputFormat, OutputOptions, PipelineOptions, DEFAULT_JSON_INDENT,
    MAX_JSON_INDENT,
};
