use crate::error::AppError;
use crate::models::auth_types::UserSession;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

const SESSION_FILE: &str = "session.json";

/// Identity issued by the external account platform. The client only needs
/// "is a user present": the session is resolved once at startup, re-resolved
/// on explicit refresh and dropped on sign-out — never looked up ambiently.
#[derive(Clone)]
pub struct AuthState {
    session_path: PathBuf,
    current: Arc<Mutex<Option<UserSession>>>,
}

impl AuthState {
    pub fn new(app_data_dir: &Path) -> Self {
        Self {
            session_path: app_data_dir.join(SESSION_FILE),
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Re-read the stored session. Called once at startup and on explicit
    /// refresh.
    pub fn resolve(&self) -> Option<UserSession> {
        let session = std::fs::read_to_string(&self.session_path)
            .ok()
            .and_then(|content| serde_json::from_str::<UserSession>(&content).ok());
        *self.current.lock().unwrap() = session.clone();
        session
    }

    pub fn current_session(&self) -> Option<UserSession> {
        self.current.lock().unwrap().clone()
    }

    pub fn current_user(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.user_id.clone())
    }

    /// Gate for history and storage actions.
    pub fn require_user(&self) -> Result<String, AppError> {
        self.current_user()
            .ok_or_else(|| AppError::auth_required("Sign in to use analysis history"))
    }

    pub fn sign_in(&self, user_id: String) -> Result<UserSession, AppError> {
        let user_id = user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(AppError::validation("User id must not be empty"));
        }

        let session = UserSession {
            user_id,
            signed_in_at: now_secs(),
        };
        let content = serde_json::to_string_pretty(&session)?;
        std::fs::write(&self.session_path, content)?;

        *self.current.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<(), AppError> {
        if self.session_path.exists() {
            std::fs::remove_file(&self.session_path)?;
        }
        *self.current.lock().unwrap() = None;
        Ok(())
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0) as i64
}
