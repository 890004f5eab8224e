use crate::error::AppError;
use crate::models::history_types::HistoryEntry;
use crate::services::auth::AuthState;
use crate::services::config::BackendConfig;
use crate::services::db::Database;
use tauri::State;

/// Most recent analyses for the signed-in user, newest first.
#[tauri::command]
pub async fn list_history(
    database: State<'_, Database>,
    auth: State<'_, AuthState>,
    config: State<'_, BackendConfig>,
) -> Result<Vec<HistoryEntry>, AppError> {
    let user_id = auth.require_user()?;
    database.list_recent(&user_id, config.history_limit)
}
