// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic forwarding of `/api/admin/{*path}` to the exchange backend.
//!
//! The query string is forwarded verbatim and `Authorization` is forwarded
//! when present. The header value itself is never logged.

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::{
    error::{GatewayError, INVALID_BACKEND_RESPONSE},
    models::{BackendErrorBody, ConnectErrorBody, RequestInfo},
    redact,
    state::AppState,
};

/// Longest excerpt of an invalid backend body echoed to the caller.
pub const DETAILS_MAX_CHARS: usize = 200;

/// Raw backend reply.
#[derive(Debug)]
pub struct Forwarded {
    pub status: StatusCode,
    pub text: String,
}

/// Outbound side of the gateway: one HTTP client bound to the backend URL.
#[derive(Debug, Clone)]
pub struct Forwarder {
    http: Client,
    backend_url: String,
}

impl Forwarder {
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            backend_url: backend_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Send one request to `{backend}{path}`.
    ///
    /// Non-GET/HEAD requests always carry a JSON body; an absent body is sent
    /// as `{}`.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        authorization: Option<&HeaderValue>,
        body: Option<Value>,
    ) -> Result<Forwarded, GatewayError> {
        let mut target = format!("{}{}", self.backend_url, path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        let has_authorization = authorization.is_some();

        let mut builder = self
            .http
            .request(method.clone(), &target)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value.clone());
        }
        if method != Method::GET && method != Method::HEAD {
            builder = builder.json(&body.unwrap_or_else(|| json!({})));
        }

        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let message = redact::redact_bearer(&e.to_string());
                error!(
                    method = %method,
                    target = %target,
                    has_authorization,
                    error = %message,
                    "Backend unreachable"
                );
                return Err(GatewayError::Unreachable {
                    error: message,
                    request_info: RequestInfo {
                        target_url: target,
                        method: method.to_string(),
                        has_authorization,
                    },
                });
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            GatewayError::invalid_response(
                INVALID_BACKEND_RESPONSE,
                Some(format!("failed to read backend body: {e}")),
            )
        })?;

        info!(
            method = %method,
            target = %target,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            has_authorization,
            "Forwarded to backend"
        );

        Ok(Forwarded { status, text })
    }

    /// `true` if the backend answers at all.
    pub async fn backend_reachable(&self) -> bool {
        self.http.get(&self.backend_url).send().await.is_ok()
    }
}

/// Parse a request body as JSON; empty means absent.
pub(crate) fn parse_body(body: &Bytes) -> Result<Option<Value>, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| GatewayError::bad_request(format!("Request body must be JSON: {e}")))
}

/// Turn a backend reply into the gateway response.
///
/// Non-2xx keeps the status inside the error envelope. A 2xx must be JSON or
/// empty.
pub(crate) fn relay(forwarded: Forwarded) -> Result<Response, GatewayError> {
    let Forwarded { status, text } = forwarded;
    if !status.is_success() {
        return Err(GatewayError::backend(status, &text));
    }
    if text.trim().is_empty() {
        return Ok(status.into_response());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok((status, Json(value)).into_response()),
        Err(_) => Err(GatewayError::invalid_response(
            INVALID_BACKEND_RESPONSE,
            Some(redact::snippet(&text, DETAILS_MAX_CHARS)),
        )),
    }
}

/// Forward any admin call to the backend.
#[utoipa::path(
    get,
    path = "/api/admin/{path}",
    tag = "Proxy",
    params(("path" = String, Path, description = "Admin resource path, e.g. `users` or `transactions/{id}/approve`")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Backend response, passed through"),
        (status = 400, description = "Request body is not JSON"),
        (status = 502, description = "Backend unreachable", body = ConnectErrorBody),
        (status = 500, description = "Backend error, status preserved", body = BackendErrorBody)
    )
)]
pub async fn forward_admin(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let body = parse_body(&body)?;
    let forwarded = state
        .forwarder
        .forward(
            method,
            &format!("/api/admin/{path}"),
            query.as_deref(),
            headers.get(header::AUTHORIZATION),
            body,
        )
        .await?;
    relay(forwarded)
}

/// Plain `OPTIONS` without preflight headers.
pub async fn options_ok() -> StatusCode {
    StatusCode::OK
}
