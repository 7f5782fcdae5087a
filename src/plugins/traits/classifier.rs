use serde::{Deserialize, Serialize};

use crate::models::Status;

/// Which heuristic settled a classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum Decision {
    /// Blank page, nothing to inspect.
    Empty,
    /// A purchase button was found; `label` is its stripped text.
    Button { label: String },
    /// No button matched, whole-document phrase checks decided.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub status: Status,
    pub decided_by: Decision,
}

/// Maps a raw product page to its availability status.
///
/// Implementations must be pure: identical input always yields the same
/// status, and no input is an error.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn classify_detailed(&self, html: &str) -> Classification;

    fn classify(&self, html: &str) -> Status {
        self.classify_detailed(html).status
    }
}
