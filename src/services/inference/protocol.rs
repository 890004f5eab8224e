use crate::error::AppError;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Invocation path of the gateway emulator fronting the containerized
/// backend.
pub const INVOCATION_PATH: &str = "/2015-03-31/functions/function/invocations";

/// Synthetic gateway invocation event. The backend process expects its
/// payload JSON-stringified under `body`, regardless of which front-end
/// carried the request.
#[derive(Debug, Serialize)]
pub struct GatewayEvent {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct GatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub body: String,
}

/// Wrap an image payload for the gateway convention: the `{image}` envelope
/// is stringified into the event's `body` field.
pub fn wrap_event(image_data_url: &str) -> Result<GatewayEvent, AppError> {
    let payload = serde_json::to_string(&serde_json::json!({ "image": image_data_url }))?;
    Ok(GatewayEvent { body: payload })
}

/// Unwrap one level of gateway envelope, surfacing the inner status code as
/// a backend error. Returns the inner body text untouched; the relay never
/// transforms result contents.
pub fn unwrap_response(text: &str) -> Result<String, AppError> {
    let response: GatewayResponse = serde_json::from_str(text)?;
    if !(200..300).contains(&response.status_code) {
        return Err(AppError::backend(response.status_code, response.body));
    }
    Ok(response.body)
}

pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Normalize a heatmap payload to a ready-to-use data URL. Backends have
/// been observed returning either a raw base64 string or a pre-built data
/// URL; the contract boundary enforces the latter.
pub fn normalize_heatmap(value: String) -> String {
    if value.starts_with("data:") {
        value
    } else {
        format!("data:image/png;base64,{}", value)
    }
}
