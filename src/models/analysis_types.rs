use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable outcome of one analysis, parsed from the backend response.
/// Replaced wholesale by the next analysis or by picking a history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub probabilities: HashMap<String, f64>,
    /// Ready-to-use data URL of the Grad-CAM overlay. `None` means the
    /// backend sent no heatmap; display degrades, parsing does not fail.
    #[serde(default)]
    pub gradcam_image: Option<String>,
}

/// One row of the confidence chart, derived from `probabilities`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProbability {
    pub label: String,
    pub probability: f64,
    /// Display percentage, rounded to one decimal.
    pub percentage: f64,
}

/// The currently selected image. Bytes are shared so state transitions and
/// submission tickets stay cheap to clone.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
    /// Displayable encoding of the selection for the preview pane.
    pub preview: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    PreviewReady,
    Submitting,
    Result,
    Error,
}

/// Snapshot of the screen state handed to the frontend. Always derived from
/// the tagged session state, so `error` and `result` can never both be set.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub file_name: Option<String>,
    pub preview: Option<String>,
    pub result: Option<PredictionResult>,
    pub ranking: Vec<RankedProbability>,
    pub error: Option<String>,
}
