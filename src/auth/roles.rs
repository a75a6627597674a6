// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Administrator roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Roles the exchange backend assigns to dashboard accounts.
///
/// ## Role Hierarchy
///
/// - `SuperAdmin` - Everything an admin can do, plus account administration
/// - `Admin` - Transaction review, fee configuration, address inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Dashboard administrator
    Admin,
    /// Administrator with account-management rights
    SuperAdmin,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::SuperAdmin, _) => true,
            (Role::Admin, Role::Admin) => true,
            _ => false,
        }
    }

    /// Parse role from string (case-insensitive, `-` and `_` interchangeable).
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ADMIN" => Some(Role::Admin),
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::SuperAdmin => write!(f, "SUPER_ADMIN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_has_all_privileges() {
        assert!(Role::SuperAdmin.has_privilege(Role::Admin));
        assert!(Role::SuperAdmin.has_privilege(Role::SuperAdmin));
    }

    #[test]
    fn admin_lacks_super_admin_privilege() {
        assert!(Role::Admin.has_privilege(Role::Admin));
        assert!(!Role::Admin.has_privilege(Role::SuperAdmin));
    }

    #[test]
    fn parse_accepts_wire_and_loose_spellings() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("super-admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("Super_Admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("client"), None);
    }

    #[test]
    fn serializes_in_wire_format() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, r#""SUPER_ADMIN""#);
        let role: Role = serde_json::from_str(r#""ADMIN""#).unwrap();
        assert_eq!(role, Role::Admin);
    }
}
