// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Client-side admin session for the exchange dashboard.
//!
//! ## Auth Flow
//!
//! 1. Admin submits email and password
//! 2. `POST /admin/login` through the client facade
//! 3. Backend answers `{ token, user: { id, email, role } }`
//! 4. Token is persisted in the [`CredentialStore`] and attached as
//!    `Authorization: Bearer <token>` to every later call
//! 5. A 401/403 on an authenticated call expires the session
//!
//! ## Security
//!
//! - The token is opaque; it is never decoded or validated locally
//! - The token never appears in logs or error values

pub mod credentials;
pub mod principal;
pub mod roles;
pub mod session;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use principal::Principal;
pub use roles::Role;
pub use session::{LoginError, SessionContext, SessionManager, SessionStatus, View};
