//! REST clients for the backend: session/run persistence and the LLM-backed
//! AI endpoints. Pure request/response wrappers; no business logic and no
//! automatic retry — a failed call is returned to the caller, who decides
//! whether to re-invoke.

pub mod ai;
pub mod session;
pub mod types;

pub use ai::AiClient;
pub use session::SessionClient;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("{code}: {message}")]
    Api { code: String, message: String },
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

fn error_from_body(status: reqwest::StatusCode, body: &str) -> GatewayError {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let err = envelope.error;
        if err.code == "NOT_FOUND" {
            return GatewayError::NotFound(err.message);
        }
        return GatewayError::Api {
            code: err.code,
            message: err.message,
        };
    }
    GatewayError::Api {
        code: status.as_u16().to_string(),
        message: body.to_string(),
    }
}

/// Decodes a bare-payload response (session/run endpoints).
pub(crate) async fn decode_plain<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_from_body(status, &body))
}

/// Decodes a `{data: ...}` enveloped response (AI endpoints).
pub(crate) async fn decode_enveloped<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_success() {
        let envelope: DataEnvelope<T> = serde_json::from_str(&body)?;
        return Ok(envelope.data);
    }
    Err(error_from_body(status, &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_maps_codes() {
        let not_found = error_from_body(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"error": {"message": "session gone", "code": "NOT_FOUND"}}"#,
        );
        assert!(matches!(not_found, GatewayError::NotFound(m) if m == "session gone"));

        let config = error_from_body(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": {"message": "no credential", "code": "CONFIG_ERROR"}}"#,
        );
        match config {
            GatewayError::Api { code, message } => {
                assert_eq!(code, "CONFIG_ERROR");
                assert_eq!(message, "no credential");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unstructured_error_body_still_produces_an_error() {
        let err = error_from_body(reqwest::StatusCode::BAD_GATEWAY, "upstream fell over");
        match err {
            GatewayError::Api { code, message } => {
                assert_eq!(code, "502");
                assert_eq!(message, "upstream fell over");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
