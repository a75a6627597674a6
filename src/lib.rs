// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wasit Admin - Exchange Administration Gateway
//!
//! This crate provides the authenticated API-access facade used by the
//! exchange admin dashboard, together with the thin proxy gateway that
//! forwards dashboard calls to the exchange backend.
//!
//! ## Modules
//!
//! - `api` - Proxy gateway handlers (Axum)
//! - `auth` - Credential store, principal, roles and the session state machine
//! - `client` - Request normalizer, HTTP client facade, connectivity prober
//! - `format` - Display helpers for amounts, percentages and dates

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod redact;
pub mod state;
