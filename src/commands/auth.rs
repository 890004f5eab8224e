use crate::error::AppError;
use crate::models::auth_types::UserSession;
use crate::services::auth::AuthState;
use tauri::State;

#[tauri::command]
pub async fn get_session(auth: State<'_, AuthState>) -> Result<Option<UserSession>, AppError> {
    Ok(auth.current_session())
}

/// Re-resolve the stored session on explicit refresh.
#[tauri::command]
pub async fn refresh_session(auth: State<'_, AuthState>) -> Result<Option<UserSession>, AppError> {
    Ok(auth.resolve())
}

#[tauri::command]
pub async fn sign_in(
    auth: State<'_, AuthState>,
    user_id: String,
) -> Result<UserSession, AppError> {
    auth.sign_in(user_id)
}

#[tauri::command]
pub async fn sign_out(auth: State<'_, AuthState>) -> Result<(), AppError> {
    auth.sign_out()
}
