use crate::error::AllocError;
use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

/// Error body: `{"code": ..., "message": ...}`. Store details never leave the
/// process.
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    StoreUnavailable,
    Internal,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::StoreUnavailable => "store_unavailable",
            ApiError::Internal => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::StoreUnavailable => "inventory is temporarily unavailable".to_string(),
            ApiError::Internal => "internal error".to_string(),
        }
    }
}

impl From<AllocError> for ApiError {
    fn from(e: AllocError) -> Self {
        match e {
            AllocError::InvalidInput(msg) => {
                warn!(reason = %msg, "rejected request");
                ApiError::InvalidInput(msg)
            }
            AllocError::StoreUnavailable(source) => {
                error!(error = %source, "store unavailable");
                ApiError::StoreUnavailable
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({"code": self.code(), "message": self.message()}));
        let mut resp = (status, body).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            resp.headers_mut()
                .insert("retry-after", HeaderValue::from_static("3"));
        }
        resp
    }
}
