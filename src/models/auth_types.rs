use serde::{Deserialize, Serialize};

/// Session issued by the external account platform, cached in the app data
/// directory between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    /// Unix seconds.
    pub signed_in_at: i64,
}
