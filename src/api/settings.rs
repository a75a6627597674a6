// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method},
    response::Response,
};

use crate::{
    api::proxy::{parse_body, relay},
    error::GatewayError,
    models::{BackendErrorBody, ConnectErrorBody, FeeSettings},
    state::AppState,
};

const BACKEND_SETTINGS_PATH: &str = "/api/admin/settings";

/// Read fee settings.
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "`{ success, settings }` from the backend"),
        (status = 502, description = "Backend unreachable", body = ConnectErrorBody)
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let forwarded = state
        .forwarder
        .forward(
            Method::GET,
            BACKEND_SETTINGS_PATH,
            None,
            headers.get(header::AUTHORIZATION),
            None,
        )
        .await?;
    relay(forwarded)
}

/// Update fee settings.
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = FeeSettings,
    responses(
        (status = 200, description = "Settings updated"),
        (status = 400, description = "Backend rejected the values", body = BackendErrorBody),
        (status = 502, description = "Backend unreachable", body = ConnectErrorBody)
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let body = parse_body(&body)?;
    let forwarded = state
        .forwarder
        .forward(
            Method::PUT,
            BACKEND_SETTINGS_PATH,
            None,
            headers.get(header::AUTHORIZATION),
            body,
        )
        .await?;
    relay(forwarded)
}
