use crate::error::AppError;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-user storage for analyzed uploads. The stored path is what history
/// records as `image_path`.
#[derive(Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(app_data_dir: &Path) -> Self {
        Self {
            root: app_data_dir.join("uploads"),
        }
    }

    /// Store upload bytes under the user's directory and return the stored
    /// path. Failure here is non-fatal to the analysis; callers log and
    /// move on.
    pub async fn save(
        &self,
        user_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        let dir = self.root.join(sanitize_component(user_id));
        tokio::fs::create_dir_all(&dir).await?;

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let dest = dir.join(format!("{}_{}", stamp, sanitize_component(file_name)));
        tokio::fs::write(&dest, bytes).await?;

        Ok(dest.to_string_lossy().to_string())
    }
}

/// Reduce a path component to a safe character set so user ids and original
/// file names cannot escape the upload root.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').trim().to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
