// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Retry of idempotent calls with exponential backoff and jitter.
//!
//! Only [`ApiError::Unreachable`] is retried. A response of any kind, even a
//! 5xx, is returned as-is.

use std::{future::Future, time::Duration};

use reqwest::Method;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};
use tracing::debug;

use super::error::ApiError;

pub const DEFAULT_MAX_RETRIES: usize = 2;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn applies_to(method: &Method) -> bool {
        *method == Method::GET || *method == Method::HEAD
    }

    /// Delays `base, 2*base, 4*base, ...` capped at `max_delay`, each jittered.
    fn strategy(&self) -> impl Iterator<Item = Duration> {
        let half_base = (self.base_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(half_base)
            .max_delay(self.max_delay)
            .take(self.max_retries)
            .map(jitter)
    }

    /// Run `attempt`, retrying while it reports `Unreachable`.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if self.max_retries == 0 {
            return attempt().await;
        }

        Retry::start(self.strategy(), || {
            let fut = attempt();
            async move {
                let result = fut.await;
                match &result {
                    Err(e) if e.is_unreachable() => {
                        debug!(error = %e, "Transient error - will retry");
                        Err(result)
                    }
                    _ => Ok(result),
                }
            }
        })
        .await
        .unwrap_or_else(|e| e)
    }
}
