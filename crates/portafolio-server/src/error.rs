use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use portafolio_core::UpstreamError;
use serde_json::json;
use thiserror::Error;

/// Failures reported to the caller as `{ "error": ... }`
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0} is not configured")]
    MissingCredential(String),
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(e) if e.is_rejection() => StatusCode::BAD_GATEWAY,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
