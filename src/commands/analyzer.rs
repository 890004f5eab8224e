use crate::error::AppError;
use crate::models::analysis_types::SessionView;
use crate::services::auth::AuthState;
use crate::services::db::{self, Database};
use crate::services::inference::client::InferenceClient;
use crate::services::preview_service;
use crate::services::session::AnalysisSession;
use crate::services::storage_service::UploadStore;
use tauri::{AppHandle, Emitter, State};

/// Emitted with a fresh `SessionView` after every transition, so the
/// frontend stays current even when a command's return value went to a
/// superseded caller.
pub const STATE_EVENT: &str = "analysis-state-changed";

#[tauri::command]
pub async fn select_image(
    app: AppHandle,
    session: State<'_, AnalysisSession>,
    path: String,
) -> Result<SessionView, AppError> {
    let input = preview_service::load_image_input(&path).await?;
    let view = session.select_image(input);
    let _ = app.emit(STATE_EVENT, &view);
    Ok(view)
}

#[tauri::command]
pub async fn run_analysis(
    app: AppHandle,
    session: State<'_, AnalysisSession>,
    client: State<'_, InferenceClient>,
    database: State<'_, Database>,
    auth: State<'_, AuthState>,
    uploads: State<'_, UploadStore>,
) -> Result<SessionView, AppError> {
    let ticket = match session.begin_submit()? {
        Some(ticket) => ticket,
        // A submission is already in flight; this trigger is ignored.
        None => return Ok(session.view()),
    };
    let _ = app.emit(STATE_EVENT, &session.view());

    let user = auth.current_user();
    let bytes = ticket.input.bytes.as_ref().clone();

    // The storage upload and the inference call are independent, so they run
    // together when a user is signed in. History strictly follows both.
    let (stored_path, outcome) = match &user {
        Some(user_id) => {
            let save = uploads.save(user_id, &ticket.input.file_name, &ticket.input.bytes);
            let submit =
                client.submit_image(bytes, &ticket.input.file_name, &ticket.input.mime_type);
            let (saved, result) = tokio::join!(save, submit);
            let stored = match saved {
                Ok(path) => Some(path),
                Err(err) => {
                    eprintln!(
                        "Upload storage failed for {}: {}",
                        ticket.input.file_name, err
                    );
                    None
                }
            };
            (stored, result)
        }
        None => (
            None,
            client
                .submit_image(bytes, &ticket.input.file_name, &ticket.input.mime_type)
                .await,
        ),
    };

    if let Err(err) = &outcome {
        eprintln!("Analysis failed for {}: {}", ticket.input.file_name, err);
    }

    let applied = session.complete_submit(ticket.generation, &outcome);

    // history only records results that were actually shown
    if applied {
        if let (Some(user_id), Ok(result)) = (&user, &outcome) {
            db::record_analysis_best_effort(&database, user_id, stored_path.as_deref(), result);
        }
    }

    let view = session.view();
    let _ = app.emit(STATE_EVENT, &view);
    Ok(view)
}

#[tauri::command]
pub async fn reset_analysis(
    app: AppHandle,
    session: State<'_, AnalysisSession>,
) -> Result<SessionView, AppError> {
    let view = session.reset();
    let _ = app.emit(STATE_EVENT, &view);
    Ok(view)
}

#[tauri::command]
pub async fn get_analysis_state(
    session: State<'_, AnalysisSession>,
) -> Result<SessionView, AppError> {
    Ok(session.view())
}

#[tauri::command]
pub async fn select_history_entry(
    app: AppHandle,
    session: State<'_, AnalysisSession>,
    database: State<'_, Database>,
    auth: State<'_, AuthState>,
    id: i64,
) -> Result<SessionView, AppError> {
    let user_id = auth.require_user()?;
    let entry = database
        .get_log(&user_id, id)?
        .ok_or_else(|| AppError::validation("History entry not found"))?;

    let view = session.select_history_entry(entry.result);
    let _ = app.emit(STATE_EVENT, &view);
    Ok(view)
}
