use crate::error::AppError;
use crate::models::analysis_types::PredictionResult;
use crate::services::config::{BackendConfig, TransportMode};
use crate::services::inference::protocol;
use serde::Deserialize;

/// HTTP client for the inference backend. One attempt per user-initiated
/// submission; a retry is the user pressing the button again.
#[derive(Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
    transport: TransportMode,
}

impl InferenceClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport: config.transport,
        }
    }

    /// Submit an image for analysis and parse the classification response.
    pub async fn submit_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
    ) -> Result<PredictionResult, AppError> {
        if bytes.is_empty() {
            return Err(AppError::validation("No image provided"));
        }
        let body = match self.transport {
            TransportMode::Direct => self.submit_multipart(bytes, file_name, mime_type).await?,
            TransportMode::Gateway => self.submit_gateway(bytes, mime_type).await?,
        };
        parse_prediction(&body)
    }

    /// Primary convention: `POST /predict` with a multipart `file` field.
    async fn submit_multipart(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
    ) -> Result<String, AppError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| {
                AppError::validation(format!("Unsupported content type {}: {}", mime_type, e))
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::backend(status.as_u16(), text));
        }
        Ok(text)
    }

    /// Alternate convention: the image travels as a data URL inside a JSON
    /// envelope, itself wrapped in a synthetic gateway invocation event.
    async fn submit_gateway(&self, bytes: Vec<u8>, mime_type: &str) -> Result<String, AppError> {
        let event = protocol::wrap_event(&protocol::to_data_url(mime_type, &bytes))?;

        let response = self
            .client
            .post(format!("{}{}", self.base_url, protocol::INVOCATION_PATH))
            .json(&event)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::backend(status.as_u16(), text));
        }
        protocol::unwrap_response(&text)
    }

    /// Probe the backend's health endpoint. Only the direct deployment
    /// exposes one; the gateway emulator answers on its invocation path
    /// alone.
    pub async fn health_check(&self) -> Result<(), AppError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::backend(status.as_u16(), "health check failed"));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct BackendErrorBody {
    error: String,
}

/// Parse a backend response body. `prediction` and `probabilities` are
/// required; a missing heatmap is tolerated, a present one is normalized to
/// a data URL at this boundary.
pub fn parse_prediction(body: &str) -> Result<PredictionResult, AppError> {
    match serde_json::from_str::<PredictionResult>(body) {
        Ok(mut result) => {
            result.gradcam_image = result.gradcam_image.map(protocol::normalize_heatmap);
            Ok(result)
        }
        Err(err) => {
            // some backends report failures as `{"error": ...}` with a
            // success status
            if let Ok(reported) = serde_json::from_str::<BackendErrorBody>(body) {
                Err(AppError::parse(format!(
                    "backend reported: {}",
                    reported.error
                )))
            } else {
                Err(err.into())
            }
        }
    }
}
