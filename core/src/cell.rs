use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detect::DetectedModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Code,
    Markdown,
}

/// One unit of notebook content. `is_running` is transient UI state and only
/// true while an execution is in flight; `detected_model` is attached after a
/// successful run whose stdout yields parseable metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: Uuid,
    pub kind: CellKind,
    pub content: String,
    pub output: Option<String>,
    pub error_text: Option<String>,
    pub is_running: bool,
    pub detected_model: Option<DetectedModel>,
}

impl Cell {
    pub fn new(kind: CellKind) -> Self {
        Self::with_content(kind, String::new())
    }

    pub fn with_content(kind: CellKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            output: None,
            error_text: None,
            is_running: false,
            detected_model: None,
        }
    }

    /// Clears everything a run produced, leaving content and identity alone.
    pub fn clear_results(&mut self) {
        self.output = None;
        self.error_text = None;
        self.detected_model = None;
    }

    /// The accuracy this cell contributes to the leaderboard, if any.
    /// Requires a positive detection; falls back to the R² custom metric
    /// when the accuracy slot itself is empty.
    pub fn usable_accuracy(&self) -> Option<f64> {
        self.detected_model
            .as_ref()
            .filter(|d| d.detected)
            .and_then(|d| d.usable_accuracy())
    }
}
