mod commands;
mod error;
mod models;
mod services;

use services::auth::AuthState;
use services::config::BackendConfig;
use services::db::Database;
use services::inference::client::InferenceClient;
use services::session::AnalysisSession;
use services::storage_service::UploadStore;
use tauri::{Emitter, Manager};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .setup(|app| {
            let app_data_dir = app
                .path()
                .app_data_dir()
                .expect("Failed to get app data directory");

            if !app_data_dir.exists() {
                std::fs::create_dir_all(&app_data_dir).expect("Failed to create app data directory");
            }

            let config = BackendConfig::load(&app_data_dir);
            let client = InferenceClient::new(&config);
            app.manage(config);
            app.manage(client.clone());

            app.manage(AnalysisSession::new());
            app.manage(UploadStore::new(&app_data_dir));

            // Resolve the stored identity once per launch; commands refresh
            // it explicitly from there.
            let auth = AuthState::new(&app_data_dir);
            auth.resolve();
            app.manage(auth);

            let db_path = app_data_dir.join("history.db");
            let database = Database::new(db_path).expect("Failed to initialize history database");
            app.manage(database);

            // Probe the backend once at startup so the UI can say whether
            // analysis is available.
            let app_handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let status = match client.health_check().await {
                    Ok(()) => "ready",
                    Err(e) => {
                        eprintln!("Backend health check failed: {}", e);
                        "unreachable"
                    }
                };
                let _ = app_handle.emit("backend-status", serde_json::json!({
                    "status": status
                }));
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::analyzer::select_image,
            commands::analyzer::run_analysis,
            commands::analyzer::reset_analysis,
            commands::analyzer::get_analysis_state,
            commands::analyzer::select_history_entry,
            commands::history::list_history,
            commands::auth::get_session,
            commands::auth::refresh_session,
            commands::auth::sign_in,
            commands::auth::sign_out,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
