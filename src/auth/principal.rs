// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authenticated identity returned by the backend on login and verify.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Authenticated administrator.
///
/// Decoded once at the API boundary from the login response (`user`) and from
/// `GET /admin/me`. Documents the backend may still key the id as `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    /// Backend account identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Login email
    pub email: String,
    /// Administrative role
    pub role: Role,
}

impl Principal {
    /// Check if the principal has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}
