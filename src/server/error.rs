use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::error::JournalError;
use crate::identity::IdentityError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

/// Error body: `{"error": kind, "message": text}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Journal(e) => match e {
                JournalError::Validation(_) => StatusCode::BAD_REQUEST,
                JournalError::NotFound(_) => StatusCode::NOT_FOUND,
                JournalError::Store(crate::store::StoreError::InvalidUserId(_)) => {
                    StatusCode::BAD_REQUEST
                }
                JournalError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Identity(_) => StatusCode::UNAUTHORIZED,
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Journal(e) => e.kind(),
            ApiError::Identity(e) => e.code(),
            ApiError::MalformedPayload(_) => "validation",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "request failed: {}", self);
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
