use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// API-surface errors. Everything crossing the wire is rendered as the
/// `{error: {message, code}}` envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("AI provider is not configured: {0}")]
    Config(String),

    #[error("AI request failed: {0}")]
    Ai(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Ai(_) => "AI_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(error.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": {
                "message": self.to_string(),
                "code": self.code(),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_line_up() {
        let not_found = ApiError::NotFound("session gone".to_string());
        assert_eq!(not_found.code(), "NOT_FOUND");
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let config = ApiError::Config("missing key".to_string());
        assert_eq!(config.code(), "CONFIG_ERROR");
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let ai = ApiError::Ai("provider 500".to_string());
        assert_eq!(ai.code(), "AI_ERROR");
        assert_eq!(ai.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn response_body_is_the_error_envelope() {
        let response = ApiError::NotFound("session 42 not found".to_string()).error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "session 42 not found");
    }
}
