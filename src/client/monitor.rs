// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Connectivity Monitor
//!
//! Background task that probes the gateway every `interval` (default 30 s)
//! and publishes the latest [`ConnectivityReport`] on a `watch` channel.
//! Views read the channel instead of probing on their own.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`; the loop exits between probes.

use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::probe::{ConnectivityProber, ConnectivityReport};

/// Default interval between probes.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(30);

pub struct ConnectivityMonitor {
    prober: ConnectivityProber,
    interval: Duration,
    latest: watch::Sender<Option<ConnectivityReport>>,
}

impl ConnectivityMonitor {
    pub fn new(prober: ConnectivityProber) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            prober,
            interval: DEFAULT_PROBE_INTERVAL,
            latest,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Receiver for the most recent report; `None` until the first probe.
    pub fn subscribe(&self) -> watch::Receiver<Option<ConnectivityReport>> {
        self.latest.subscribe()
    }

    /// Run the probe loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// let reports = monitor.subscribe();
    /// tokio::spawn(monitor.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Connectivity monitor starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Connectivity monitor shutting down");
                return;
            }

            let report = self.prober.probe().await;
            if !report.reachable {
                warn!(
                    diagnostic = %report.diagnostic_message,
                    "Connectivity monitor: gateway unreachable"
                );
            }
            self.latest.send_replace(Some(report));

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Connectivity monitor shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::MemoryCredentialStore,
        client::test_support::{canned, spawn_backend, test_client, Recorder},
    };
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn publishes_reports_until_cancelled() {
        let recorder = Recorder::default();
        let base = spawn_backend(canned(
            StatusCode::OK,
            r#"{"id":"1","email":"a@b.com","role":"ADMIN"}"#,
            recorder.clone(),
        ))
        .await;
        let client = test_client(&base, Arc::new(MemoryCredentialStore::with_token("T")));
        let monitor = ConnectivityMonitor::new(ConnectivityProber::new(client))
            .with_interval(Duration::from_millis(20));
        let mut reports = monitor.subscribe();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(monitor.run(shutdown.clone()));

        reports.changed().await.unwrap();
        let report = reports.borrow_and_update().clone().unwrap();
        assert!(report.authenticated);

        reports.changed().await.unwrap();
        shutdown.cancel();
        handle.await.unwrap();
        assert!(recorder.requests().len() >= 2);
    }

    #[tokio::test]
    async fn cancelled_before_start_never_probes() {
        let recorder = Recorder::default();
        let base = spawn_backend(canned(StatusCode::OK, "{}", recorder.clone())).await;
        let client = test_client(&base, Arc::new(MemoryCredentialStore::new()));
        let monitor = ConnectivityMonitor::new(ConnectivityProber::new(client));
        let reports = monitor.subscribe();

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        monitor.run(shutdown).await;

        assert!(reports.borrow().is_none());
        assert!(recorder.requests().is_empty());
    }
}
