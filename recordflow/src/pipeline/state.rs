//! Pipeline lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a pipeline.
///
/// The only valid sequence is `Created -> Begun -> Ended -> Released`;
/// `Released` is reachable from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    /// Built, not yet begun.
    Created,
    /// Accepting records.
    Begun,
    /// Sink closed; no more records.
    Ended,
    /// Resources released. Terminal.
    Released,
}

impl PipelineState {
    /// Returns true for the terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Released)
    }

    /// Returns true if records may be processed.
    #[must_use]
    pub const fn accepts_records(self) -> bool {
        matches!(self, Self::Begun)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Begun => "begun",
            Self::Ended => "ended",
            Self::Released => "released",
        };
        f.write_str(name)
    }
}
