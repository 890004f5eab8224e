use crate::models::analysis_types::PredictionResult;
use serde::Serialize;

/// One persisted analysis. Read-only to the UI; ordering is most recent
/// first.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    /// Unix seconds.
    pub created_at: i64,
    /// Stored upload path, when the storage leg succeeded.
    pub image_path: Option<String>,
    pub result: PredictionResult,
}
