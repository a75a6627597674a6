// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::models::{BackendErrorBody, ConnectErrorBody, GatewayErrorBody, RequestInfo};

pub const BACKEND_ERROR_MESSAGE: &str = "Backend server returned an error";
pub const UNPARSEABLE_BACKEND_ERROR: &str = "Backend error with unparseable response";
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect to backend server";
pub const INVALID_BACKEND_RESPONSE: &str = "Invalid response from backend server";

/// Failure of a gateway handler, rendered as the JSON envelopes the
/// dashboard expects.
#[derive(Debug)]
pub enum GatewayError {
    /// Rejected before contacting the backend.
    BadRequest(String),
    /// Backend answered non-2xx; status is preserved.
    Backend { status: StatusCode, error: Value },
    /// Backend rejected a login; status is preserved.
    Rejected { status: StatusCode, message: String },
    /// No response from the backend.
    Unreachable { error: String, request_info: RequestInfo },
    /// Backend answered 2xx with something unusable.
    InvalidResponse {
        message: String,
        details: Option<String>,
    },
}

impl GatewayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Envelope for a backend non-2xx response with the raw body.
    pub fn backend(status: StatusCode, body: &str) -> Self {
        let error = serde_json::from_str(body)
            .unwrap_or_else(|_| json!({ "message": UNPARSEABLE_BACKEND_ERROR }));
        Self::Backend { status, error }
    }

    pub fn invalid_response(message: impl Into<String>, details: Option<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Backend { status, .. } | GatewayError::Rejected { status, .. } => *status,
            GatewayError::Unreachable { .. } | GatewayError::InvalidResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            GatewayError::BadRequest(message) | GatewayError::Rejected { message, .. } => (
                status,
                Json(GatewayErrorBody {
                    success: false,
                    message,
                    details: None,
                }),
            )
                .into_response(),
            GatewayError::Backend { error, .. } => (
                status,
                Json(BackendErrorBody {
                    success: false,
                    message: BACKEND_ERROR_MESSAGE.to_string(),
                    status_code: status.as_u16(),
                    error,
                }),
            )
                .into_response(),
            GatewayError::Unreachable {
                error,
                request_info,
            } => (
                status,
                Json(ConnectErrorBody {
                    success: false,
                    message: CONNECT_FAILED_MESSAGE.to_string(),
                    error,
                    request_info,
                }),
            )
                .into_response(),
            GatewayError::InvalidResponse { message, details } => (
                status,
                Json(GatewayErrorBody {
                    success: false,
                    message,
                    details,
                }),
            )
                .into_response(),
        }
    }
}
