// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # HTTP Client Facade
//!
//! The single outbound call surface of the dashboard. Every call:
//!
//! 1. Resolves the logical path through the [`RouteTable`]
//! 2. Attaches `Authorization: Bearer <token>` when a token is stored
//! 3. Reads the raw body, then parses JSON
//! 4. Classifies the outcome into `Ok(Value)` or an [`ApiError`]
//!
//! A 401/403 on a call that carried a token expires the session before the
//! error is returned.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::{
    error::{ApiError, Rejection},
    normalizer::RouteTable,
    retry::RetryPolicy,
};
use crate::{auth::SessionContext, config, redact};

/// Longest raw-body excerpt kept on an error.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// A logical call: path, method, extra query parameters and optional body.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub path: String,
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn carries_body(&self) -> bool {
        self.method != Method::GET && self.method != Method::HEAD
    }
}

/// Successful response with its diagnostics.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    pub elapsed_ms: u64,
    /// `Value::Null` for an empty body
    pub payload: Value,
}

/// Authenticated client for the admin gateway.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    routes: Arc<RouteTable>,
    context: Arc<SessionContext>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(
        routes: RouteTable,
        context: Arc<SessionContext>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            routes: Arc::new(routes),
            context,
            retry: RetryPolicy::default(),
        })
    }

    /// Gateway URL from `ADMIN_GATEWAY_URL`, timeout from `REQUEST_TIMEOUT_SECS`.
    pub fn from_env(context: Arc<SessionContext>) -> Result<Self, ApiError> {
        let timeout = config::request_timeout_from_env()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        Self::new(RouteTable::from_env()?, context, timeout)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Execute `endpoint` and return the parsed payload.
    pub async fn request(&self, endpoint: Endpoint) -> Result<Value, ApiError> {
        self.call(endpoint).await.map(|r| r.payload)
    }

    /// Execute `endpoint` and decode the payload into `T`.
    ///
    /// A payload that does not match `T` is a [`ApiError::MalformedResponse`].
    pub async fn request_as<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let response = self.call(endpoint).await?;
        decode(response)
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Endpoint::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request(Endpoint::post(path, body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request(Endpoint::put(path, body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Endpoint::delete(path)).await
    }

    /// Execute `endpoint`, keeping status, URL and timing of the response.
    pub async fn call(&self, endpoint: Endpoint) -> Result<ApiResponse, ApiError> {
        if !is_supported(&endpoint.method) {
            return Err(ApiError::InvalidRequest(format!(
                "unsupported method {}",
                endpoint.method
            )));
        }

        let token = self.context.token();
        let result = if RetryPolicy::applies_to(&endpoint.method) {
            self.retry
                .run(|| self.execute(&endpoint, token.as_deref()))
                .await
        } else {
            self.execute(&endpoint, token.as_deref()).await
        };

        if let (Err(ApiError::ClientRejected { rejection, .. }), Some(token)) = (&result, &token) {
            if rejection.is_auth_failure() {
                self.context.expire_if_current(token).await;
            }
        }
        result
    }

    async fn execute(&self, endpoint: &Endpoint, token: Option<&str>) -> Result<ApiResponse, ApiError> {
        let url = self
            .routes
            .resolve(&endpoint.path, &endpoint.method, &endpoint.query)?;
        let url_str = url.to_string();
        let has_token = token.is_some();

        let mut builder = self
            .http
            .request(endpoint.method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if endpoint.carries_body() {
            if let Some(body) = &endpoint.body {
                builder = builder.json(body);
            }
        }

        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let elapsed_ms = elapsed_ms(start);
                let message = redact::redact_bearer(&e.to_string());
                warn!(
                    method = %endpoint.method,
                    url = %url_str,
                    elapsed_ms,
                    has_token,
                    error = %message,
                    "Admin API call failed without response"
                );
                return Err(ApiError::Unreachable {
                    url: url_str,
                    elapsed_ms,
                    message,
                });
            }
        };

        let status = response.status().as_u16();
        let text = response.text().await;
        let elapsed_ms = elapsed_ms(start);

        info!(
            method = %endpoint.method,
            url = %url_str,
            status,
            elapsed_ms,
            has_token,
            "Admin API call"
        );

        let text = match text {
            Ok(text) => text,
            Err(e) => {
                return Err(ApiError::MalformedResponse {
                    status,
                    url: url_str,
                    elapsed_ms,
                    reason: format!("failed to read body: {e}"),
                    snippet: String::new(),
                })
            }
        };

        classify(status, &text, url_str, elapsed_ms)
    }
}

fn is_supported(method: &Method) -> bool {
    [
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ]
    .contains(method)
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn body_snippet(text: &str) -> String {
    redact::snippet(&redact::redact_bearer(text), SNIPPET_MAX_CHARS)
}

/// Classify a received response. Status is decided before the body is
/// trusted; only a 2xx requires the body to be JSON.
pub(crate) fn classify(
    status: u16,
    text: &str,
    url: String,
    elapsed_ms: u64,
) -> Result<ApiResponse, ApiError> {
    let parsed: Result<Value, serde_json::Error> = if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(text)
    };

    match status {
        200..=299 => match parsed {
            Ok(payload) => Ok(ApiResponse {
                status,
                url,
                elapsed_ms,
                payload,
            }),
            Err(e) => Err(ApiError::MalformedResponse {
                status,
                url,
                elapsed_ms,
                reason: e.to_string(),
                snippet: body_snippet(text),
            }),
        },
        400..=499 => Err(ApiError::ClientRejected {
            status,
            rejection: Rejection::from_status(status),
            payload: parsed.ok().filter(|v| !v.is_null()),
            url,
            elapsed_ms,
        }),
        500..=599 => Err(ApiError::ServerFailure {
            status,
            payload: parsed.ok().filter(|v| !v.is_null()),
            url,
            elapsed_ms,
        }),
        _ => Err(ApiError::MalformedResponse {
            status,
            url,
            elapsed_ms,
            reason: format!("unexpected status {status}"),
            snippet: body_snippet(text),
        }),
    }
}

/// Decode a successful payload into `T`.
pub(crate) fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
    let ApiResponse {
        status,
        url,
        elapsed_ms,
        payload,
    } = response;
    serde_json::from_value(payload.clone()).map_err(|e| ApiError::MalformedResponse {
        status,
        url,
        elapsed_ms,
        reason: e.to_string(),
        snippet: body_snippet(&payload.to_string()),
    })
}
