//! API Error Handling
//!
//! Structured error responses with request tracking. Policy rejections map to
//! 400 with the protocol error code; everything else is a generic 500.

use crate::errors::RgsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Protocol error code (ERR_IPB, ERR_RIP, ERR_GEN)
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    Rejected { code: &'static str, message: String },
    InternalError(String),
}

impl ApiError {
    pub fn rejected(request_id: String, code: &'static str, message: String) -> Self {
        Self {
            kind: ApiErrorKind::Rejected { code, message },
            request_id,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::InternalError(message),
            request_id,
        }
    }

    /// Classify a core error
    pub fn from_core(request_id: String, err: RgsError) -> Self {
        if err.is_rejection() {
            Self::rejected(request_id, err.code(), err.to_string())
        } else {
            tracing::error!(request_id = %request_id, error = %err, "Request failed");
            Self::internal_error(request_id, err.to_string())
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::Rejected { code, message } => {
                write!(f, "[{}] Rejected ({}): {}", self.request_id, code, message)
            }
            ApiErrorKind::InternalError(msg) => {
                write!(f, "[{}] Internal Error: {}", self.request_id, msg)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self.kind {
            ApiErrorKind::Rejected { code, message } => (StatusCode::BAD_REQUEST, code, message),
            // Internal details stay in the logs
            ApiErrorKind::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ERR_GEN",
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
