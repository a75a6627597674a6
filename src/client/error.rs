// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outcome classification for facade calls.

use serde_json::Value;

use crate::error::BACKEND_ERROR_MESSAGE as GATEWAY_GENERIC_MESSAGE;

/// Sub-kind of a 4xx rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unauthorized,
    Forbidden,
    Other,
}

impl Rejection {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Rejection::Unauthorized,
            403 => Rejection::Forbidden,
            _ => Rejection::Other,
        }
    }

    /// 401 and 403 both end the session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Rejection::Unauthorized | Rejection::Forbidden)
    }
}

/// Error returned by every facade call.
///
/// Carries the physical URL and elapsed time for diagnostics. Never carries
/// the bearer token.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("no response from {url} after {elapsed_ms} ms: {message}")]
    Unreachable {
        url: String,
        elapsed_ms: u64,
        message: String,
    },

    #[error("malformed response from {url} (status {status}): {reason}")]
    MalformedResponse {
        status: u16,
        url: String,
        elapsed_ms: u64,
        reason: String,
        /// Raw body, truncated to 200 characters
        snippet: String,
    },

    #[error("request to {url} rejected with status {status}")]
    ClientRejected {
        status: u16,
        rejection: Rejection,
        payload: Option<Value>,
        url: String,
        elapsed_ms: u64,
    },

    #[error("server failure from {url} (status {status})")]
    ServerFailure {
        status: u16,
        payload: Option<Value>,
        url: String,
        elapsed_ms: u64,
    },

    /// 2xx response whose body reports `success: false`.
    #[error("request to {url} refused (status {status}): {message}")]
    Refused {
        status: u16,
        message: String,
        url: String,
        elapsed_ms: u64,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::MalformedResponse { status, .. }
            | ApiError::ClientRejected { status, .. }
            | ApiError::ServerFailure { status, .. }
            | ApiError::Refused { status, .. } => Some(*status),
            ApiError::Unreachable { .. } | ApiError::InvalidRequest(_) => None,
        }
    }

    pub fn elapsed_ms(&self) -> Option<u64> {
        match self {
            ApiError::Unreachable { elapsed_ms, .. }
            | ApiError::MalformedResponse { elapsed_ms, .. }
            | ApiError::ClientRejected { elapsed_ms, .. }
            | ApiError::ServerFailure { elapsed_ms, .. }
            | ApiError::Refused { elapsed_ms, .. } => Some(*elapsed_ms),
            ApiError::InvalidRequest(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            ApiError::ClientRejected { rejection, .. } => Some(*rejection),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable { .. })
    }

    /// Backend-supplied message, if present.
    ///
    /// Falls back from top-level `message` to `error.message`, where the
    /// gateway nests the backend's own text under its generic message.
    pub fn backend_message(&self) -> Option<&str> {
        let payload = match self {
            ApiError::ClientRejected { payload, .. } | ApiError::ServerFailure { payload, .. } => {
                payload.as_ref()
            }
            ApiError::Refused { message, .. } => return Some(message.as_str()),
            _ => None,
        }?;
        let nested = payload
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty());
        let top = payload
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty());
        match top {
            Some(message) if message == GATEWAY_GENERIC_MESSAGE => nested.or(top),
            Some(message) => Some(message),
            None => nested,
        }
    }

    /// Short text suitable for display in a view.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unreachable { .. } => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            ApiError::MalformedResponse { .. } => {
                "The server returned an invalid response.".to_string()
            }
            ApiError::ClientRejected { rejection, .. } => match (rejection, self.backend_message()) {
                (_, Some(message)) => message.to_string(),
                (Rejection::Unauthorized, None) => {
                    "Your session has expired. Please log in again.".to_string()
                }
                (Rejection::Forbidden, None) => {
                    "You do not have permission to perform this action.".to_string()
                }
                (Rejection::Other, None) => "The request was rejected.".to_string(),
            },
            ApiError::ServerFailure { .. } => {
                "The server encountered an error. Please try again later.".to_string()
            }
            ApiError::Refused { message, .. } | ApiError::InvalidRequest(message) => {
                message.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejection_from_status() {
        assert_eq!(Rejection::from_status(401), Rejection::Unauthorized);
        assert_eq!(Rejection::from_status(403), Rejection::Forbidden);
        assert_eq!(Rejection::from_status(404), Rejection::Other);
        assert!(Rejection::Forbidden.is_auth_failure());
        assert!(!Rejection::Other.is_auth_failure());
    }

    #[test]
    fn user_message_prefers_backend_message() {
        let err = ApiError::ClientRejected {
            status: 400,
            rejection: Rejection::Other,
            payload: Some(json!({"message": "Address already exists"})),
            url: "http://gw/api/admin/public-addresses".to_string(),
            elapsed_ms: 12,
        };
        assert_eq!(err.user_message(), "Address already exists");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn nested_backend_message_beats_gateway_wrapper() {
        let err = ApiError::ClientRejected {
            status: 409,
            rejection: Rejection::Other,
            payload: Some(json!({
                "success": false,
                "message": "Backend server returned an error",
                "statusCode": 409,
                "error": {"success": false, "message": "Address already exists"}
            })),
            url: "http://gw/api/admin/public-addresses".to_string(),
            elapsed_ms: 8,
        };
        assert_eq!(err.backend_message(), Some("Address already exists"));
        assert_eq!(err.user_message(), "Address already exists");

        let err = ApiError::ServerFailure {
            status: 500,
            payload: Some(json!({"error": {"message": "Database offline"}})),
            url: "u".to_string(),
            elapsed_ms: 0,
        };
        assert_eq!(err.backend_message(), Some("Database offline"));
    }

    #[test]
    fn refused_carries_backend_message() {
        let err = ApiError::Refused {
            status: 200,
            message: "Settings are locked".to_string(),
            url: "u".to_string(),
            elapsed_ms: 3,
        };
        assert_eq!(err.status(), Some(200));
        assert_eq!(err.user_message(), "Settings are locked");
    }

    #[test]
    fn user_message_falls_back_per_kind() {
        let err = ApiError::ClientRejected {
            status: 401,
            rejection: Rejection::Unauthorized,
            payload: None,
            url: "u".to_string(),
            elapsed_ms: 0,
        };
        assert!(err.user_message().contains("expired"));

        let err = ApiError::Unreachable {
            url: "u".to_string(),
            elapsed_ms: 0,
            message: "refused".to_string(),
        };
        assert!(err.is_unreachable());
        assert_eq!(err.status(), None);
        assert!(err.user_message().contains("Unable to reach"));
    }
}
