// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session state machine.
//!
//! ## States
//!
//! ```text
//! Anonymous --login--> Authenticating --ok--> Authenticated
//!     ^                     |                      |
//!     +------- failure -----+        401/403 from an authenticated call
//!     |                                            v
//!     +--------------- login / logout -------- Expired
//! ```
//!
//! `Expired` and `Anonymous` both route to the login view; only
//! `Authenticated` opens dashboard views.
//!
//! ## Ownership
//!
//! [`SessionContext`] is the single owned session value. It is created once,
//! handed to the [`ApiClient`] constructor and read through the
//! [`SessionManager`]. Only the manager's transitions and the client's
//! authorization-failure signal write to it.
//!
//! ## Stale results
//!
//! Every transition that discards a session bumps an epoch. A login or
//! verification result is applied only if the epoch it started under is
//! still current; otherwise it is dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use super::{credentials::CredentialStore, principal::Principal};
use crate::client::{ApiClient, ApiError, Endpoint, Rejection};

pub const LOGIN_PATH: &str = "/admin/login";
pub const WHOAMI_PATH: &str = "/admin/me";

/// Lifecycle status of the admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Anonymous,
    Authenticating,
    Authenticated,
    Expired,
}

/// Navigation targets driven by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Users,
    Transactions,
    Fees,
    PublicAddresses,
}

impl View {
    /// Every view except the login page requires an authenticated session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, View::Login)
    }
}

/// Login failure as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("Unable to reach the server. Check your connection and try again.")]
    Unreachable,
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
    #[error("Cannot log in while the session is {0:?}")]
    InvalidState(SessionStatus),
    #[error("Login was superseded by another session change")]
    Superseded,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Success payload of `POST /admin/login`. Both fields are required.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: Principal,
}

#[derive(Debug)]
struct SessionInner {
    status: SessionStatus,
    principal: Option<Principal>,
    epoch: u64,
}

/// Shared session value: status, principal and the credential store.
pub struct SessionContext {
    credentials: Arc<dyn CredentialStore>,
    inner: RwLock<SessionInner>,
    view: watch::Sender<View>,
}

impl SessionContext {
    /// Initial state is `Authenticating` when a token is already stored,
    /// `Anonymous` otherwise.
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Arc<Self> {
        let status = if credentials.get().is_some() {
            SessionStatus::Authenticating
        } else {
            SessionStatus::Anonymous
        };
        let (view, _) = watch::channel(View::Login);
        Arc::new(Self {
            credentials,
            inner: RwLock::new(SessionInner {
                status,
                principal: None,
                epoch: 0,
            }),
            view,
        })
    }

    pub async fn status(&self) -> SessionStatus {
        self.inner.read().await.status
    }

    pub async fn principal(&self) -> Option<Principal> {
        self.inner.read().await.principal.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.status().await == SessionStatus::Authenticated
    }

    pub fn current_view(&self) -> View {
        *self.view.borrow()
    }

    /// Receiver notified on every redirect.
    pub fn subscribe_view(&self) -> watch::Receiver<View> {
        self.view.subscribe()
    }

    /// Auth-gated routing: protected views resolve to `Login` unless the
    /// session is authenticated.
    pub async fn route(&self, requested: View) -> View {
        if requested.is_protected() && !self.is_authenticated().await {
            View::Login
        } else {
            requested
        }
    }

    /// Navigate to `requested`, subject to [`SessionContext::route`].
    pub async fn navigate(&self, requested: View) -> View {
        let target = self.route(requested).await;
        self.view.send_replace(target);
        target
    }

    /// Bearer token to attach to outbound calls, if any.
    pub(crate) fn token(&self) -> Option<String> {
        self.credentials.get().filter(|t| !t.is_empty())
    }

    async fn begin_authenticating(&self) -> u64 {
        let mut inner = self.inner.write().await;
        inner.epoch += 1;
        inner.status = SessionStatus::Authenticating;
        inner.epoch
    }

    async fn current_epoch(&self) -> u64 {
        self.inner.read().await.epoch
    }

    async fn establish(&self, epoch: u64, token: Option<&str>, principal: Principal) -> bool {
        let mut inner = self.inner.write().await;
        if inner.epoch != epoch || inner.status != SessionStatus::Authenticating {
            return false;
        }
        if let Some(token) = token {
            self.credentials.set(token);
        }
        inner.status = SessionStatus::Authenticated;
        inner.principal = Some(principal);
        drop(inner);
        self.view.send_replace(View::Dashboard);
        true
    }

    async fn fail(&self, epoch: u64) {
        let mut inner = self.inner.write().await;
        if inner.epoch != epoch {
            return;
        }
        self.credentials.clear();
        inner.status = SessionStatus::Anonymous;
        inner.principal = None;
        drop(inner);
        self.view.send_replace(View::Login);
    }

    async fn reset(&self) {
        let mut inner = self.inner.write().await;
        self.credentials.clear();
        inner.epoch += 1;
        inner.status = SessionStatus::Anonymous;
        inner.principal = None;
        drop(inner);
        self.view.send_replace(View::Login);
    }

    /// Authorization-failure signal from the client.
    ///
    /// Applies only while `used_token` is still the stored token, so a 401 for
    /// a token that has since been replaced cannot end the newer session.
    pub(crate) async fn expire_if_current(&self, used_token: &str) -> bool {
        let mut inner = self.inner.write().await;
        if self.credentials.get().as_deref() != Some(used_token) {
            return false;
        }
        self.credentials.clear();
        inner.status = SessionStatus::Expired;
        inner.principal = None;
        drop(inner);
        self.view.send_replace(View::Login);
        warn!("Session expired; redirecting to login");
        true
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("view", &*self.view.borrow())
            .finish_non_exhaustive()
    }
}

/// Drives session transitions through the client facade.
#[derive(Clone)]
pub struct SessionManager {
    client: ApiClient,
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        self.client.context()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Verify a stored token on process start.
    ///
    /// Does nothing unless the session started in `Authenticating`. Success
    /// authenticates with the returned principal; any failure clears the
    /// token and falls back to `Anonymous`.
    pub async fn restore(&self) -> SessionStatus {
        let ctx = self.context();
        if ctx.status().await != SessionStatus::Authenticating {
            return ctx.status().await;
        }
        let epoch = ctx.current_epoch().await;

        match self
            .client
            .request_as::<Principal>(Endpoint::get(WHOAMI_PATH))
            .await
        {
            Ok(principal) => {
                info!(role = %principal.role, "Stored session verified");
                ctx.establish(epoch, None, principal).await;
            }
            Err(e) => {
                warn!(error = %e, "Stored session rejected");
                ctx.fail(epoch).await;
            }
        }
        ctx.status().await
    }

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, LoginError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let ctx = self.context();
        match ctx.status().await {
            SessionStatus::Anonymous | SessionStatus::Expired => {}
            other => return Err(LoginError::InvalidState(other)),
        }

        let epoch = ctx.begin_authenticating().await;
        info!(email = %email, "Login attempt");

        let body = serde_json::to_value(LoginRequest { email, password })
            .map_err(|e| LoginError::InvalidResponse(e.to_string()))?;
        let result = self
            .client
            .request_as::<LoginResponse>(Endpoint::post(LOGIN_PATH, body))
            .await;

        let response = match result {
            Ok(response) if !response.token.trim().is_empty() => response,
            Ok(_) => {
                ctx.fail(epoch).await;
                return Err(LoginError::InvalidResponse(
                    "response did not include a token".to_string(),
                ));
            }
            Err(e) => {
                ctx.fail(epoch).await;
                let error = login_error_from(&e);
                warn!(email = %email, error = %error, "Login failed");
                return Err(error);
            }
        };

        if ctx
            .establish(epoch, Some(&response.token), response.user.clone())
            .await
        {
            info!(email = %email, role = %response.user.role, "Login succeeded");
            Ok(response.user)
        } else {
            Err(LoginError::Superseded)
        }
    }

    /// Explicit logout. No server round-trip.
    pub async fn logout(&self) {
        self.context().reset().await;
        info!("Logged out");
    }
}

fn login_error_from(error: &ApiError) -> LoginError {
    match error {
        ApiError::Unreachable { .. } => LoginError::Unreachable,
        ApiError::ClientRejected {
            rejection, payload, ..
        } => {
            let message = payload
                .as_ref()
                .and_then(|p| p.get("message"))
                .and_then(|m| m.as_str())
                .filter(|m| !m.trim().is_empty())
                .map(str::to_string);
            match (rejection, message) {
                (_, Some(message)) => LoginError::InvalidCredentials(message),
                (Rejection::Unauthorized | Rejection::Forbidden, None) => {
                    LoginError::InvalidCredentials("Invalid credentials".to_string())
                }
                (Rejection::Other, None) => LoginError::InvalidCredentials("Login failed".to_string()),
            }
        }
        ApiError::MalformedResponse { reason, .. } => LoginError::InvalidResponse(reason.clone()),
        ApiError::Refused { message, .. } => LoginError::InvalidCredentials(message.clone()),
        ApiError::ServerFailure { status, .. } => {
            LoginError::InvalidResponse(format!("server error (status {status})"))
        }
        ApiError::InvalidRequest(msg) => LoginError::InvalidResponse(msg.clone()),
    }
}
