use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tickerdeck_core::{CoreError, ProviderError, ProviderErrorKind, StoreError, ValidationError};

/// Handler error rendered as `{"error": {"code", "message"}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Provider(error) => match error.kind() {
                ProviderErrorKind::NotFound => StatusCode::NOT_FOUND,
                ProviderErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ProviderErrorKind::Upstream | ProviderErrorKind::RateLimited => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::DuplicateSymbol { .. }) => StatusCode::CONFLICT,
            Self::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Store(StoreError::Validation(_)) => "request.invalid",
            Self::Body(_) => "request.body",
            Self::Provider(error) => error.code(),
            Self::Store(StoreError::NotFound { .. }) => "store.not_found",
            Self::Store(StoreError::DuplicateSymbol { .. }) => "store.duplicate",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), code = self.code(), error = %self, "request rejected");
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Failure while bringing the server up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
