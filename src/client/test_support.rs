// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process HTTP backends for client and session tests.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use super::{normalizer::RouteTable, retry::RetryPolicy, ApiClient};
use crate::auth::{MemoryCredentialStore, SessionContext};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Recorder(Arc<Mutex<Vec<RecordedRequest>>>);

impl Recorder {
    pub fn record(&self, method: Method, uri: Uri, headers: &HeaderMap, body: &Bytes) {
        let header_str = |name| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let request = RecordedRequest {
            method,
            uri,
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
            body: serde_json::from_slice(body).ok(),
        };
        self.0.lock().unwrap().push(request);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests().last().cloned().expect("no request recorded")
    }
}

/// Backend answering every request with `status` and `body`.
pub(crate) fn canned(status: StatusCode, body: &'static str, recorder: Recorder) -> Router {
    Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, bytes: Bytes| {
            let recorder = recorder.clone();
            async move {
                recorder.record(method, uri, &headers, &bytes);
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        },
    )
}

/// Serve `router` on an ephemeral port and return its base URL.
pub(crate) async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL with nothing listening.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Client without retries over an in-memory credential store.
pub(crate) fn test_client(base_url: &str, store: Arc<MemoryCredentialStore>) -> ApiClient {
    let context = SessionContext::new(store);
    let routes = RouteTable::new(Some(base_url)).unwrap();
    ApiClient::new(routes, context, Duration::from_secs(5))
        .unwrap()
        .with_retry_policy(RetryPolicy::none())
}
