// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Connectivity diagnostics.
//!
//! A probe is a single `GET /admin/me` through the facade. The outcome tells
//! the dashboard whether to show "check your connection", "log in again" or
//! "check configuration".

use serde::Serialize;
use tracing::info;

use super::{
    error::ApiError,
    facade::{ApiClient, Endpoint},
};
use crate::auth::session::WHOAMI_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    Healthy,
    Unreachable,
    Unauthenticated,
    Misconfigured,
}

/// Suggested next step for the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Remediation {
    None,
    CheckConnection,
    LogInAgain,
    CheckConfiguration,
}

impl ProbeOutcome {
    pub fn remediation(&self) -> Remediation {
        match self {
            ProbeOutcome::Healthy => Remediation::None,
            ProbeOutcome::Unreachable => Remediation::CheckConnection,
            ProbeOutcome::Unauthenticated => Remediation::LogInAgain,
            ProbeOutcome::Misconfigured => Remediation::CheckConfiguration,
        }
    }
}

/// Result of one probe. Produced fresh each time; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    pub reachable: bool,
    pub authenticated: bool,
    pub latency_ms: u64,
    pub raw_status: Option<u16>,
    pub diagnostic_message: String,
    pub outcome: ProbeOutcome,
    pub remediation: Remediation,
}

impl ConnectivityReport {
    fn new(
        outcome: ProbeOutcome,
        latency_ms: u64,
        raw_status: Option<u16>,
        diagnostic_message: String,
    ) -> Self {
        Self {
            reachable: outcome != ProbeOutcome::Unreachable,
            authenticated: outcome == ProbeOutcome::Healthy,
            latency_ms,
            raw_status,
            diagnostic_message,
            outcome,
            remediation: outcome.remediation(),
        }
    }
}

#[derive(Clone)]
pub struct ConnectivityProber {
    client: ApiClient,
}

impl ConnectivityProber {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn probe(&self) -> ConnectivityReport {
        let report = match self.client.call(Endpoint::get(WHOAMI_PATH)).await {
            Ok(response) => ConnectivityReport::new(
                ProbeOutcome::Healthy,
                response.elapsed_ms,
                Some(response.status),
                "Connected and authenticated".to_string(),
            ),
            Err(e) => report_from_error(&e),
        };

        info!(
            outcome = ?report.outcome,
            reachable = report.reachable,
            authenticated = report.authenticated,
            latency_ms = report.latency_ms,
            raw_status = ?report.raw_status,
            "Connectivity probe"
        );
        report
    }
}

fn report_from_error(error: &ApiError) -> ConnectivityReport {
    let latency_ms = error.elapsed_ms().unwrap_or_default();
    let status = error.status();
    match error {
        ApiError::Unreachable { message, .. } => ConnectivityReport::new(
            ProbeOutcome::Unreachable,
            latency_ms,
            None,
            format!("Server unreachable: {message}"),
        ),
        ApiError::ClientRejected { rejection, .. } if rejection.is_auth_failure() => {
            ConnectivityReport::new(
                ProbeOutcome::Unauthenticated,
                latency_ms,
                status,
                "Server reachable but the session is not authenticated".to_string(),
            )
        }
        ApiError::InvalidRequest(message) => ConnectivityReport::new(
            ProbeOutcome::Misconfigured,
            latency_ms,
            None,
            format!("Client misconfigured: {message}"),
        ),
        other => ConnectivityReport::new(
            ProbeOutcome::Misconfigured,
            latency_ms,
            status,
            format!("Server reachable but answered unexpectedly: {other}"),
        ),
    }
}
