use serde::Serialize;
use std::fmt;

/// Error taxonomy for the analysis flow. Serialized to the frontend as a
/// tagged object so it can branch on `kind`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppError {
    /// No file/image provided, or the selection is not a usable image file.
    Validation { message: String },
    /// Network unreachable, timeout, connection reset.
    Transport { message: String },
    /// Non-success HTTP status from the inference backend.
    Backend { status: u16, message: String },
    /// Response body not decodable into the expected shape.
    Parse { message: String },
    /// History/storage action attempted with no signed-in user.
    AuthRequired { message: String },
    /// Storage or history logging failure. Non-fatal to the analysis.
    Persistence { message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        AppError::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse {
            message: message.into(),
        }
    }

    pub fn auth_required(message: impl Into<String>) -> Self {
        AppError::AuthRequired {
            message: message.into(),
        }
    }

    /// Message shown in the UI. Transport, backend and parse failures all
    /// collapse to one "analysis failed" surface; the full cause only goes
    /// to the log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport { .. } | AppError::Backend { .. } | AppError::Parse { .. } => {
                "Analysis failed. Please try again.".to_string()
            }
            AppError::Validation { message }
            | AppError::AuthRequired { message }
            | AppError::Persistence { message } => message.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { message } => write!(f, "{}", message),
            AppError::Transport { message } => write!(f, "network error: {}", message),
            AppError::Backend { status, message } => {
                write!(f, "backend returned HTTP {}: {}", status, message)
            }
            AppError::Parse { message } => write!(f, "unexpected backend response: {}", message),
            AppError::AuthRequired { message } => write!(f, "{}", message),
            AppError::Persistence { message } => write!(f, "storage error: {}", message),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Persistence {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Persistence {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_transport_and_parse_collapse_for_the_user() {
        let collapsed = "Analysis failed. Please try again.";
        assert_eq!(AppError::backend(500, "boom").user_message(), collapsed);
        let transport = AppError::Transport {
            message: "refused".to_string(),
        };
        assert_eq!(transport.user_message(), collapsed);
        assert_eq!(AppError::parse("bad json").user_message(), collapsed);
    }

    #[test]
    fn validation_message_shown_verbatim() {
        let err = AppError::validation("No image selected");
        assert_eq!(err.user_message(), "No image selected");
    }

    #[test]
    fn display_keeps_causes_distinguishable() {
        assert!(AppError::backend(503, "unavailable")
            .to_string()
            .contains("HTTP 503"));
        let transport = AppError::Transport {
            message: "timed out".to_string(),
        };
        assert!(transport.to_string().starts_with("network error"));
        assert!(AppError::parse("eof")
            .to_string()
            .starts_with("unexpected backend response"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(AppError::backend(500, "boom")).unwrap();
        assert_eq!(json["kind"], "backend");
        assert_eq!(json["status"], 500);
    }
}
