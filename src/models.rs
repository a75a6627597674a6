// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Wire types of the exchange admin API, decoded once at the API boundary.
//! All types derive `Serialize`, `Deserialize`, and `ToSchema` so the
//! gateway's OpenAPI document can describe them.
//!
//! ## Model Categories
//!
//! - **Transactions**: Exchange transactions awaiting or past review
//! - **Users**: Exchange customer accounts
//! - **Fees**: Network fee and exchange rate settings
//! - **Public Addresses**: Deposit address inventory
//! - **Gateway**: Error envelopes produced by the proxy gateway

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// =============================================================================
// Transaction Models
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
    Send,
    Receive,
    Withdraw,
}

/// Review status. Accepted in any letter case on input, emitted uppercase.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        *self == Self::Pending
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            serde::de::Error::unknown_variant(&raw, &["PENDING", "APPROVED", "REJECTED"])
        })
    }
}

/// Contact details captured for over-the-counter transactions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub location: String,
}

/// An exchange transaction as returned by `GET /admin/transactions`.
///
/// `metadata` is a flat string map. Lookups are by exact key only; a
/// non-string value fails the decode rather than being coerced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub main_account_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Decimal amount as sent by the backend
    pub amount: String,
    pub status: TransactionStatus,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub to_address: Option<String>,
    /// Receipt image URL
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// `{ success, transactions }` envelope. Older deployments send a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TransactionList {
    Envelope { transactions: Vec<Transaction> },
    Bare(Vec<Transaction>),
}

impl From<TransactionList> for Vec<Transaction> {
    fn from(list: TransactionList) -> Self {
        match list {
            TransactionList::Envelope { transactions } => transactions,
            TransactionList::Bare(transactions) => transactions,
        }
    }
}

/// Body of `PUT /admin/transactions/{id}/reject`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectTransactionRequest {
    pub rejection_reason: String,
}

// =============================================================================
// User Models
// =============================================================================

/// Exchange customer account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub phone_number: String,
    #[serde(default)]
    pub name: Option<String>,
    pub created_at: String,
}

// =============================================================================
// Fee Settings
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeSettings {
    /// Network fee, 0 to 100
    pub network_fee_percentage: f64,
    /// Units of local currency per USDT, strictly positive
    pub exchange_rate: f64,
}

/// `{ success, message }` reply to a mutating admin call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MutationOutcome {
    pub success: Option<bool>,
    pub message: Option<String>,
}

/// `{ success, settings }` envelope of `GET /api/settings`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SettingsEnvelope {
    pub settings: FeeSettings,
}

// =============================================================================
// Public Address Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicAddress {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub address: String,
    #[serde(default)]
    pub network: Option<String>,
    pub created_at: String,
    pub status: String,
}

/// Bare array, or `{ data }` on newer deployments.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum PublicAddressList {
    Bare(Vec<PublicAddress>),
    Data { data: Vec<PublicAddress> },
}

impl From<PublicAddressList> for Vec<PublicAddress> {
    fn from(list: PublicAddressList) -> Self {
        match list {
            PublicAddressList::Bare(addresses) | PublicAddressList::Data { data: addresses } => {
                addresses
            }
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_transactions: u64,
    pub pending_transactions: u64,
    pub total_volume: f64,
}

// =============================================================================
// Gateway Models
// =============================================================================

/// Login body accepted by the gateway. Both fields are checked before the
/// backend is contacted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Envelope for a backend non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendErrorBody {
    pub success: bool,
    pub message: String,
    pub status_code: u16,
    /// Backend JSON, or `{ message }` when it was not JSON
    #[schema(value_type = Object)]
    pub error: Value,
}

/// What the gateway was attempting when the backend could not be reached.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    pub target_url: String,
    pub method: String,
    pub has_authorization: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectErrorBody {
    pub success: bool,
    pub message: String,
    pub error: String,
    pub request_info: RequestInfo,
}

/// Generic gateway failure. `details` carries at most 200 characters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GatewayErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
