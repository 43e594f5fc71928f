use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures of the link, redirect and analytics operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("URL not found")]
    NotFound,
    #[error("URL has expired")]
    Expired,
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Custom alias already in use")]
    AliasTaken,
    #[error("Invalid custom alias")]
    InvalidAlias,
    /// Request body that could not be read as the expected JSON
    #[error("{0}")]
    InvalidRequest(String),
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// JSON body of every message-style response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Expired => StatusCode::GONE,
            Self::InvalidUrl | Self::AliasTaken | Self::InvalidAlias | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let msg = match &self {
            Self::Storage(err) => {
                tracing::error!(error = ?err, "request failed with storage error");
                "Server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageResponse { msg })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_expected_status() {
        assert_eq!(ServiceError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Expired.status_code(), StatusCode::GONE);
        assert_eq!(ServiceError::InvalidUrl.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::AliasTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::InvalidAlias.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::InvalidRequest("bad body".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn storage_errors_do_not_leak_details() {
        let err = ServiceError::Storage(anyhow::anyhow!("connection refused to 10.0.0.5"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["msg"], "Server error");
    }
}
