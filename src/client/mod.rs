// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Admin API Client
//!
//! Everything the dashboard sends to the gateway goes through [`ApiClient`].
//!
//! ## Components
//!
//! - `normalizer` - Logical path to physical proxy path, cache busting
//! - `facade` - Header injection, execution, outcome classification
//! - `retry` - Backoff for idempotent calls that got no response
//! - `probe` / `monitor` - Connectivity diagnostics
//! - `admin` - Typed resource helpers

pub mod admin;
pub mod error;
pub mod facade;
pub mod monitor;
pub mod normalizer;
pub mod probe;
pub mod retry;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin::{AdminClient, SettingsError};
pub use error::{ApiError, Rejection};
pub use facade::{ApiClient, ApiResponse, Endpoint};
pub use monitor::ConnectivityMonitor;
pub use normalizer::{normalize, MatchedRule, RouteTable};
pub use probe::{ConnectivityProber, ConnectivityReport, ProbeOutcome, Remediation};
pub use retry::RetryPolicy;
