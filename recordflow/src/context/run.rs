//! The frozen configuration snapshot for one pipeline run.

use crate::config::{OutputOptions, PipelineOptions};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Resolved configuration bound to a single pipeline run.
///
/// Deliberately not `Clone`: each pipeline owns its own context.
#[derive(Debug)]
pub struct PipelineContext {
    name: String,
    run_id: Uuid,
    created_at: DateTime<Utc>,
    options: PipelineOptions,
}

impl PipelineContext {
    /// Freezes `options` into a new context with a fresh run ID.
    #[must_use]
    pub fn new(name: impl Into<String>, options: PipelineOptions) -> Self {
        Self {
            name: name.into(),
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            options,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unique run ID.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns when the context was built.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the full option set.
    #[must_use]
    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Returns the output option group.
    #[must_use]
    pub const fn output(&self) -> &OutputOptions {
        &self.options.output
    }

    /// Returns an uninterpreted option group.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&serde_json::Value> {
        self.options.group(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_context_exposes_options() {
        let options = PipelineOptions::new()
            .with_output(OutputOptions::new().with_format(OutputFormat::Json))
            .with_group("rule", serde_json::json!({"baseline": "default"}));

        let ctx = PipelineContext::new("export", options);

        assert_eq!(ctx.name(), "export");
        assert_eq!(ctx.output().format, Some(OutputFormat::Json));
        assert_eq!(ctx.group("rule"), Some(&serde_json::json!({"baseline": "default"})));
        assert!(ctx.created_at() <= Utc::now());
    }

    #[test]
    fn test_each_context_has_unique_run_id() {
        let a = PipelineContext::new("p", PipelineOptions::new());
        let b = PipelineContext::new("p", PipelineOptions::new());
        assert_ne!(a.run_id(), b.run_id());
    }
}
