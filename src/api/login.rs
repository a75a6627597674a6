// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    api::proxy::DETAILS_MAX_CHARS,
    error::{GatewayError, INVALID_BACKEND_RESPONSE},
    models::{ConnectErrorBody, GatewayErrorBody, LoginRequest},
    redact,
    state::AppState,
};

const LOGIN_PATH: &str = "/api/admin/login";

/// Forward a login to the backend.
///
/// Both fields are required before the backend is contacted. Logs carry the
/// email and whether a password was supplied, never the password.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token and principal from the backend"),
        (status = 400, description = "Email or password missing", body = GatewayErrorBody),
        (status = 401, description = "Backend rejected the credentials", body = GatewayErrorBody),
        (status = 502, description = "Backend unreachable or gave no token", body = ConnectErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let request: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();

    info!(email = %email, has_password = !password.is_empty(), "Login request");

    if email.is_empty() || password.is_empty() {
        return Err(GatewayError::bad_request("Email and password are required"));
    }

    let forwarded = state
        .forwarder
        .forward(
            Method::POST,
            LOGIN_PATH,
            None,
            headers.get(header::AUTHORIZATION),
            Some(json!({ "email": email, "password": password })),
        )
        .await?;

    let data: Value = serde_json::from_str(&forwarded.text).map_err(|_| {
        warn!(status = forwarded.status.as_u16(), "Login response was not JSON");
        GatewayError::invalid_response(
            INVALID_BACKEND_RESPONSE,
            Some(redact::snippet(&forwarded.text, DETAILS_MAX_CHARS)),
        )
    })?;

    if !forwarded.status.is_success() {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("Login failed")
            .to_string();
        warn!(email = %email, status = forwarded.status.as_u16(), "Login rejected by backend");
        return Err(GatewayError::Rejected {
            status: forwarded.status,
            message,
        });
    }

    let has_token = data
        .get("token")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());
    if !has_token {
        return Err(GatewayError::invalid_response(
            "Backend did not provide an authentication token",
            None,
        ));
    }

    info!(email = %email, "Login succeeded");
    Ok((forwarded.status, Json(data)).into_response())
}
