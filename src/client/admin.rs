// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed helpers for the administrative resources.
//!
//! Each helper is one facade call plus an explicit decoder. Input that the
//! backend would reject anyway (blank ids, out-of-range fees) is refused
//! locally without a network call.

use serde_json::json;
use thiserror::Error;

use super::{
    error::ApiError,
    facade::{ApiClient, Endpoint},
};
use crate::models::{
    AdminUser, DashboardStats, FeeSettings, MutationOutcome, PublicAddress, PublicAddressList,
    RejectTransactionRequest, SettingsEnvelope, Transaction, TransactionList,
};

const USERS_PATH: &str = "/admin/users";
const TRANSACTIONS_PATH: &str = "/admin/transactions";
const SETTINGS_PATH: &str = "/admin/settings";
const PUBLIC_ADDRESSES_PATH: &str = "/admin/public-addresses";
const DASHBOARD_STATS_PATH: &str = "/admin/dashboard/stats";

pub const MAX_NETWORK_FEE_PERCENTAGE: f64 = 100.0;

const REFUSED_FALLBACK_MESSAGE: &str = "The server did not apply the change.";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Network fee must be between 0 and 100, got {0}")]
    FeeOutOfRange(f64),
    #[error("Exchange rate must be greater than 0, got {0}")]
    InvalidExchangeRate(f64),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FeeSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let fee = self.network_fee_percentage;
        if !fee.is_finite() || !(0.0..=MAX_NETWORK_FEE_PERCENTAGE).contains(&fee) {
            return Err(SettingsError::FeeOutOfRange(fee));
        }
        let rate = self.exchange_rate;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SettingsError::InvalidExchangeRate(rate));
        }
        Ok(())
    }
}

/// A single path segment, or `InvalidRequest` if blank or containing a
/// separator.
fn segment<'a>(what: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() || value.contains(['/', '?', '#']) {
        return Err(ApiError::InvalidRequest(format!("invalid {what}: {value:?}")));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct AdminClient {
    client: ApiClient,
}

impl AdminClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Run a mutating call. A 2xx body with `success: false` is
    /// [`ApiError::Refused`].
    async fn mutate(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        let response = self.client.call(endpoint).await?;
        let outcome: MutationOutcome =
            serde_json::from_value(response.payload).unwrap_or_default();
        if outcome.success == Some(false) {
            let message = outcome
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| REFUSED_FALLBACK_MESSAGE.to_string());
            return Err(ApiError::Refused {
                status: response.status,
                message,
                url: response.url,
                elapsed_ms: response.elapsed_ms,
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub async fn list_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.client.request_as(Endpoint::get(USERS_PATH)).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let id = segment("user id", id)?;
        self.mutate(Endpoint::delete(format!("{USERS_PATH}/{id}")))
            .await
    }

    // -------------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------------

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        let list: TransactionList = self
            .client
            .request_as(Endpoint::get(TRANSACTIONS_PATH))
            .await?;
        Ok(list.into())
    }

    pub async fn approve_transaction(&self, id: &str) -> Result<(), ApiError> {
        let id = segment("transaction id", id)?;
        self.mutate(Endpoint::put(
            format!("{TRANSACTIONS_PATH}/{id}/approve"),
            json!({}),
        ))
        .await
    }

    pub async fn reject_transaction(&self, id: &str, reason: &str) -> Result<(), ApiError> {
        let id = segment("transaction id", id)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApiError::InvalidRequest(
                "rejection reason is required".to_string(),
            ));
        }
        let body = serde_json::to_value(RejectTransactionRequest {
            rejection_reason: reason.to_string(),
        })
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.mutate(Endpoint::put(format!("{TRANSACTIONS_PATH}/{id}/reject"), body))
            .await
    }

    pub async fn delete_all_transactions(&self) -> Result<(), ApiError> {
        self.mutate(Endpoint::delete(TRANSACTIONS_PATH)).await
    }

    // -------------------------------------------------------------------------
    // Fees
    // -------------------------------------------------------------------------

    pub async fn fee_settings(&self) -> Result<FeeSettings, ApiError> {
        let envelope: SettingsEnvelope = self
            .client
            .request_as(Endpoint::get(SETTINGS_PATH))
            .await?;
        Ok(envelope.settings)
    }

    pub async fn update_fee_settings(
        &self,
        network_fee_percentage: f64,
        exchange_rate: f64,
    ) -> Result<FeeSettings, SettingsError> {
        let settings = FeeSettings {
            network_fee_percentage,
            exchange_rate,
        };
        settings.validate()?;
        let body = serde_json::to_value(settings)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.mutate(Endpoint::put(SETTINGS_PATH, body)).await?;
        Ok(settings)
    }

    // -------------------------------------------------------------------------
    // Public addresses
    // -------------------------------------------------------------------------

    pub async fn list_public_addresses(&self) -> Result<Vec<PublicAddress>, ApiError> {
        let list: PublicAddressList = self
            .client
            .request_as(Endpoint::get(PUBLIC_ADDRESSES_PATH))
            .await?;
        Ok(list.into())
    }

    pub async fn add_public_address(&self, address: &str) -> Result<(), ApiError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ApiError::InvalidRequest(
                "Please enter a valid address".to_string(),
            ));
        }
        self.mutate(Endpoint::post(
            PUBLIC_ADDRESSES_PATH,
            json!({ "address": address }),
        ))
        .await
    }

    pub async fn set_public_address_status(&self, id: &str, status: &str) -> Result<(), ApiError> {
        let id = segment("address id", id)?;
        let status = segment("address status", status)?;
        self.mutate(Endpoint::put(
            format!("{PUBLIC_ADDRESSES_PATH}/{id}/status"),
            json!({ "status": status }),
        ))
        .await
    }

    pub async fn delete_public_address(&self, id: &str) -> Result<(), ApiError> {
        let id = segment("address id", id)?;
        self.mutate(Endpoint::delete(format!("{PUBLIC_ADDRESSES_PATH}/{id}")))
            .await
    }

    // -------------------------------------------------------------------------
    // Dashboard
    // -------------------------------------------------------------------------

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.client
            .request_as(Endpoint::get(DASHBOARD_STATS_PATH))
            .await
    }
}
