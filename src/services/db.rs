use crate::error::AppError;
use crate::models::analysis_types::PredictionResult;
use crate::models::history_types::HistoryEntry;
use rusqlite::{params, Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Persisted per-user log of past analyses. The UI consumes it only through
/// the narrow append/list/get interface.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Enable WAL mode for better concurrency and performance
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS inference_logs (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                image_path TEXT,
                result_json TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_logs_user_created
             ON inference_logs(user_id, created_at DESC)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Append one completed analysis for a user. Returns the new row id.
    pub fn append_log(
        &self,
        user_id: &str,
        image_path: Option<&str>,
        result: &PredictionResult,
    ) -> std::result::Result<i64, AppError> {
        let result_json = serde_json::to_string(result)?;
        let created_at = now_secs();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO inference_logs (user_id, image_path, result_json, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, image_path, result_json, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent entries for a user, newest first, capped at `limit`.
    pub fn list_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> std::result::Result<Vec<HistoryEntry>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, created_at, image_path, result_json
             FROM inference_logs
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, created_at, image_path, result_json) = row?;
            let result: PredictionResult = serde_json::from_str(&result_json)?;
            entries.push(HistoryEntry {
                id,
                created_at,
                image_path,
                result,
            });
        }
        Ok(entries)
    }

    /// Fetch one entry, scoped to its owner.
    pub fn get_log(
        &self,
        user_id: &str,
        id: i64,
    ) -> std::result::Result<Option<HistoryEntry>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, created_at, image_path, result_json
             FROM inference_logs
             WHERE user_id = ?1 AND id = ?2",
        )?;
        let mut rows = stmt.query(params![user_id, id])?;

        if let Some(row) = rows.next()? {
            let result_json: String = row.get(3)?;
            let result: PredictionResult = serde_json::from_str(&result_json)?;
            Ok(Some(HistoryEntry {
                id: row.get(0)?,
                created_at: row.get(1)?,
                image_path: row.get(2)?,
                result,
            }))
        } else {
            Ok(None)
        }
    }

    #[cfg(test)]
    fn break_schema(&self) {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("DROP TABLE inference_logs").unwrap();
    }
}

/// Record a completed analysis without letting a logging failure surface.
/// The result the user is looking at stays untouched either way.
pub fn record_analysis_best_effort(
    db: &Database,
    user_id: &str,
    image_path: Option<&str>,
    result: &PredictionResult,
) {
    if let Err(err) = db.append_log(user_id, image_path, result) {
        eprintln!("Failed to record analysis for {}: {}", user_id, err);
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0) as i64
}
