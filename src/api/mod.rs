// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{Principal, Role},
    models::{
        AdminUser, BackendErrorBody, ConnectErrorBody, CustomerDetails, DashboardStats,
        FeeSettings, GatewayErrorBody, LoginRequest, PublicAddress, RejectTransactionRequest,
        RequestInfo, Transaction, TransactionStatus, TransactionType,
    },
    state::AppState,
};

pub mod health;
pub mod login;
pub mod proxy;
pub mod settings;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// CORS for the dashboard: listed origins only, with credentials.
///
/// A `*` entry is dropped; credentialed CORS never echoes a wildcard.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|origin| {
            if origin.as_str() == "*" {
                warn!("Ignoring wildcard CORS origin; credentials require explicit origins");
                return false;
            }
            true
        })
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let api_routes = Router::new()
        .route(
            "/admin/login",
            post(login::login).options(proxy::options_ok),
        )
        .route(
            "/admin/{*path}",
            get(proxy::forward_admin)
                .post(proxy::forward_admin)
                .put(proxy::forward_admin)
                .delete(proxy::forward_admin)
                .options(proxy::options_ok),
        )
        .route(
            "/settings",
            get(settings::get_settings)
                .put(settings::update_settings)
                .options(proxy::options_ok),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(allowed_origins))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        login::login,
        proxy::forward_admin,
        settings::get_settings,
        settings::update_settings,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            LoginRequest,
            Principal,
            Role,
            Transaction,
            TransactionStatus,
            TransactionType,
            CustomerDetails,
            RejectTransactionRequest,
            AdminUser,
            FeeSettings,
            PublicAddress,
            DashboardStats,
            BackendErrorBody,
            ConnectErrorBody,
            GatewayErrorBody,
            RequestInfo,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Admin login"),
        (name = "Proxy", description = "Forwarding to the exchange backend"),
        (name = "Settings", description = "Network fee and exchange rate"),
        (name = "Health", description = "Liveness and readiness")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::proxy::Forwarder,
        client::test_support::{canned, spawn_backend, unreachable_base_url, Recorder},
        error::CONNECT_FAILED_MESSAGE,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    const ORIGIN: &str = "https://admin-snowy-iota.vercel.app";

    fn app_for(backend_url: &str) -> Router {
        let forwarder = Forwarder::new(backend_url, Duration::from_secs(5)).unwrap();
        router(AppState::new(forwarder), &[ORIGIN.to_string()])
    }

    async fn app_with_backend(status: StatusCode, body: &'static str) -> (Router, Recorder) {
        let recorder = Recorder::default();
        let base = spawn_backend(canned(status, body, recorder.clone())).await;
        (app_for(&base), recorder)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn preflight_is_answered_without_backend_call() {
        let (app, recorder) = app_with_backend(StatusCode::OK, "{}").await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/admin/users")
                    .header(header::ORIGIN, ORIGIN)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert!(recorder.requests().is_empty());
    }

    #[tokio::test]
    async fn disallowed_origin_gets_no_allow_origin_header() {
        let (app, _) = app_with_backend(StatusCode::OK, "{}").await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/users")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn wildcard_origin_is_dropped_from_the_allow_list() {
        let recorder = Recorder::default();
        let base = spawn_backend(canned(StatusCode::OK, "{}", recorder)).await;
        let forwarder = Forwarder::new(&base, Duration::from_secs(5)).unwrap();
        let app = router(
            AppState::new(forwarder),
            &["*".to_string(), ORIGIN.to_string()],
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/users")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn login_without_password_is_rejected_locally() {
        let (app, recorder) = app_with_backend(StatusCode::OK, "{}").await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/admin/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"a@b.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "Email and password are required"
        );
        assert!(recorder.requests().is_empty());
    }

    #[tokio::test]
    async fn login_without_token_is_bad_gateway() {
        let (app, _) = app_with_backend(StatusCode::OK, r#"{"user":{}}"#).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/admin/login")
                    .body(Body::from(r#"{"email":"a@b.com","password":"secret"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            json_body(response).await["message"],
            "Backend did not provide an authentication token"
        );
    }

    #[tokio::test]
    async fn login_rejection_keeps_status_and_message() {
        let (app, recorder) =
            app_with_backend(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid credentials"}"#)
                .await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/admin/login")
                    .body(Body::from(r#"{"email":"a@b.com","password":"wrong"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Invalid credentials");
        assert_eq!(recorder.last().uri.path(), "/api/admin/login");
    }

    #[tokio::test]
    async fn admin_calls_are_forwarded_with_query_and_authorization() {
        let (app, recorder) = app_with_backend(StatusCode::OK, r#"[{"_id":"u1"}]"#).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/users?_t=42")
                    .header(header::AUTHORIZATION, "Bearer T")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([{"_id": "u1"}]));

        let seen = recorder.last();
        assert_eq!(seen.uri.path(), "/api/admin/users");
        assert_eq!(seen.uri.query(), Some("_t=42"));
        assert_eq!(seen.authorization.as_deref(), Some("Bearer T"));
    }

    #[tokio::test]
    async fn delete_without_body_sends_empty_object() {
        let (app, recorder) = app_with_backend(StatusCode::OK, r#"{"success":true}"#).await;
        app.oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/api/admin/transactions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

        let seen = recorder.last();
        assert_eq!(seen.method, Method::DELETE);
        assert_eq!(seen.body, Some(json!({})));
    }

    #[tokio::test]
    async fn backend_error_is_wrapped_with_original_status() {
        let (app, _) = app_with_backend(StatusCode::NOT_FOUND, "Cannot GET").await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/nothing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["statusCode"], 404);
        assert_eq!(
            body["error"]["message"],
            "Backend error with unparseable response"
        );
    }

    #[tokio::test]
    async fn settings_route_to_backend_admin_settings() {
        let (app, recorder) = app_with_backend(
            StatusCode::OK,
            r#"{"success":true,"settings":{"networkFeePercentage":1,"exchangeRate":2}}"#,
        )
        .await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/api/settings")
                    .body(Body::from(r#"{"networkFeePercentage":1,"exchangeRate":2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let seen = recorder.last();
        assert_eq!(seen.uri.path(), "/api/admin/settings");
        assert_eq!(
            seen.body,
            Some(json!({"networkFeePercentage": 1, "exchangeRate": 2}))
        );
    }

    #[tokio::test]
    async fn unreachable_backend_reports_request_info() {
        let app = app_for(&unreachable_base_url().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/me")
                    .header(header::AUTHORIZATION, "Bearer secret-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["message"], CONNECT_FAILED_MESSAGE);
        assert_eq!(body["requestInfo"]["method"], "GET");
        assert_eq!(body["requestInfo"]["hasAuthorization"], true);
        assert!(!body.to_string().contains("secret-token"));
    }

    #[tokio::test]
    async fn readiness_reflects_backend() {
        let app = app_for(&unreachable_base_url().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["checks"]["backend"], "unreachable");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = app_for(&unreachable_base_url().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}
