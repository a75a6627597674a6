// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request Normalizer
//!
//! Maps a logical endpoint path to the physical path served by the gateway.
//! The rule table below is the single source of path-mapping truth.
//!
//! ## Rules (first match wins)
//!
//! | Logical path | Physical path | Rule |
//! |--------------|---------------|------|
//! | `/admin/settings`, `/settings`, `/api/admin/settings` | `/api/settings` | special case |
//! | `/admin/...` | `/api/admin/...` | admin prefix |
//! | `/api/...`, `http(s)://...` | unchanged | pass-through |
//! | anything else (`users`, `/users`) | `/api/admin/users` | implicit admin |
//!
//! Path mapping is pure and idempotent. The cache-busting `_t` parameter is
//! added to GET requests at resolve time from a process-wide monotonic
//! counter, so two GETs issued in the same millisecond still differ.

use std::sync::atomic::{AtomicI64, Ordering};

use reqwest::Method;
use url::Url;

use super::error::ApiError;
use crate::config::{env_or_default, DEFAULT_GATEWAY_URL, GATEWAY_URL_ENV};

/// Query parameter carrying the cache-bust value.
pub const CACHE_BUST_PARAM: &str = "_t";

const ADMIN_PREFIX: &str = "/admin";
const PROXY_NAMESPACE: &str = "/api";

/// Endpoints served by a dedicated gateway handler.
const SPECIAL_CASES: &[(&str, &str)] = &[
    ("/admin/settings", "/api/settings"),
    ("/settings", "/api/settings"),
    ("/api/admin/settings", "/api/settings"),
];

/// Which rule produced a physical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedRule {
    SpecialCase,
    AdminPrefix,
    PassThrough,
    ImplicitAdmin,
}

/// Result of mapping a logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub path: String,
    pub rule: MatchedRule,
}

/// `true` when `path` is `prefix` itself or continues with `/` or `?`.
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

fn is_absolute_url(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Map a logical path to its physical path. Any query string is preserved.
///
/// Trailing slashes are dropped before matching, so `settings/` and
/// `/settings` map alike. The HTTP method does not affect the path; the
/// method-aware entry point is [`RouteTable::resolve`], which also applies
/// the GET cache-bust.
pub fn normalize(logical: &str) -> Normalized {
    let logical = logical.trim();
    if is_absolute_url(logical) {
        return Normalized {
            path: logical.to_string(),
            rule: MatchedRule::PassThrough,
        };
    }

    let (path, query) = match logical.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (logical, None),
    };
    let path = match path.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed if trimmed.starts_with('/') => trimmed.to_string(),
        trimmed => format!("/{trimmed}"),
    };

    let (mapped, rule) = if let Some((_, target)) =
        SPECIAL_CASES.iter().find(|(from, _)| *from == path)
    {
        (target.to_string(), MatchedRule::SpecialCase)
    } else if has_segment_prefix(&path, ADMIN_PREFIX) {
        (format!("{PROXY_NAMESPACE}{path}"), MatchedRule::AdminPrefix)
    } else if has_segment_prefix(&path, PROXY_NAMESPACE) {
        (path, MatchedRule::PassThrough)
    } else {
        let suffix = if path == "/" { "" } else { path.as_str() };
        (
            format!("{PROXY_NAMESPACE}{ADMIN_PREFIX}{suffix}"),
            MatchedRule::ImplicitAdmin,
        )
    };

    let path = match query {
        Some(query) if !query.is_empty() => format!("{mapped}?{query}"),
        _ => mapped,
    };
    Normalized { path, rule }
}

/// Strictly increasing millisecond timestamps.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicI64,
}

impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in milliseconds, or one past the previous value if the
    /// clock has not advanced.
    pub fn next(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1)
    }
}

/// Rule table bound to a base URL.
#[derive(Debug)]
pub struct RouteTable {
    base_url: Url,
    cache_buster: CacheBuster,
}

impl RouteTable {
    /// Use `base_url` when given, otherwise the fixed default gateway.
    pub fn new(base_url: Option<&str>) -> Result<Self, ApiError> {
        let raw = base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_GATEWAY_URL);
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base URL {raw}: {e}")))?;
        Ok(Self {
            base_url,
            cache_buster: CacheBuster::new(),
        })
    }

    /// Base URL from `ADMIN_GATEWAY_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(Some(&env_or_default(GATEWAY_URL_ENV, DEFAULT_GATEWAY_URL)))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full physical URL for a call.
    ///
    /// `query` pairs are appended after any query already on the logical
    /// path. GET requests get a fresh `_t`; a caller-supplied `_t` is
    /// replaced.
    pub fn resolve(
        &self,
        logical: &str,
        method: &Method,
        query: &[(String, String)],
    ) -> Result<Url, ApiError> {
        let normalized = normalize(logical);
        let raw = if normalized.rule == MatchedRule::PassThrough && is_absolute_url(&normalized.path)
        {
            normalized.path
        } else {
            let base = self.base_url.as_str().trim_end_matches('/');
            format!("{base}{}", normalized.path)
        };

        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid URL {raw}: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        if *method == Method::GET {
            let existing: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != CACHE_BUST_PARAM)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.set_query(None);
            let bust = self.cache_buster.next().to_string();
            url.query_pairs_mut()
                .extend_pairs(existing)
                .append_pair(CACHE_BUST_PARAM, &bust);
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_bust(url: &Url) -> i64 {
        url.query_pairs()
            .find(|(k, _)| k == CACHE_BUST_PARAM)
            .and_then(|(_, v)| v.parse().ok())
            .unwrap()
    }

    #[test]
    fn admin_paths_get_the_proxy_namespace_exactly_once() {
        let once = normalize("/admin/users");
        assert_eq!(once.path, "/api/admin/users");
        assert_eq!(once.rule, MatchedRule::AdminPrefix);

        let twice = normalize(&once.path);
        assert_eq!(twice.path, "/api/admin/users");
        assert_eq!(twice.rule, MatchedRule::PassThrough);
    }

    #[test]
    fn normalization_is_idempotent_for_every_rule() {
        for logical in [
            "/admin/transactions/42/approve",
            "/admin/settings",
            "/settings",
            "/api/admin/settings",
            "users",
            "/dashboard/stats",
            "/api/health",
            "https://other.example/api/x",
            "/admin/transactions?status=PENDING",
            "settings/",
            "/settings/",
            "/admin/users/",
            "/",
        ] {
            let once = normalize(logical).path;
            assert_eq!(normalize(&once).path, once, "not idempotent for {logical}");
        }
    }

    #[test]
    fn settings_paths_map_to_dedicated_handler() {
        for logical in [
            "/admin/settings",
            "/settings",
            "/api/admin/settings",
            "settings/",
            "/settings/",
            "/admin/settings/",
        ] {
            let n = normalize(logical);
            assert_eq!(n.path, "/api/settings");
            assert_eq!(n.rule, MatchedRule::SpecialCase);
        }
    }

    #[test]
    fn bare_paths_are_treated_as_admin() {
        assert_eq!(normalize("users").path, "/api/admin/users");
        assert_eq!(normalize("/users").path, "/api/admin/users");
        assert_eq!(normalize("/administrators").path, "/api/admin/administrators");
        assert_eq!(normalize("users").rule, MatchedRule::ImplicitAdmin);
    }

    #[test]
    fn query_string_is_preserved() {
        assert_eq!(
            normalize("/admin/transactions?status=PENDING").path,
            "/api/admin/transactions?status=PENDING"
        );
    }

    #[test]
    fn consecutive_gets_get_increasing_cache_bust_values() {
        let table = RouteTable::new(Some("http://gateway.local")).unwrap();
        let a = table.resolve("/admin/users", &Method::GET, &[]).unwrap();
        let b = table.resolve("/admin/users", &Method::GET, &[]).unwrap();
        assert_ne!(a, b);
        assert!(cache_bust(&b) > cache_bust(&a));
    }

    #[test]
    fn only_get_carries_cache_bust() {
        let table = RouteTable::new(None).unwrap();
        let url = table
            .resolve("/admin/login", &Method::POST, &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/admin/login");
    }

    #[test]
    fn caller_cache_bust_is_replaced() {
        let table = RouteTable::new(Some("http://gateway.local/")).unwrap();
        let url = table
            .resolve("/admin/users?_t=1&page=2", &Method::GET, &[])
            .unwrap();
        let busts: Vec<_> = url
            .query_pairs()
            .filter(|(k, _)| k == CACHE_BUST_PARAM)
            .collect();
        assert_eq!(busts.len(), 1);
        assert!(cache_bust(&url) > 1);
        assert!(url.query_pairs().any(|(k, v)| k == "page" && v == "2"));
        assert_eq!(url.path(), "/api/admin/users");
    }

    #[test]
    fn absolute_urls_bypass_the_base() {
        let table = RouteTable::new(Some("http://gateway.local")).unwrap();
        let url = table
            .resolve("https://other.example/api/x", &Method::DELETE, &[])
            .unwrap();
        assert_eq!(url.as_str(), "https://other.example/api/x");
    }

    #[test]
    fn extra_query_pairs_are_appended() {
        let table = RouteTable::new(Some("http://gateway.local")).unwrap();
        let url = table
            .resolve(
                "/admin/transactions",
                &Method::PUT,
                &[("status".to_string(), "PENDING".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://gateway.local/api/admin/transactions?status=PENDING"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            RouteTable::new(Some("not a url")),
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
