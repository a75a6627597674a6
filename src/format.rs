// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Display helpers for amounts, percentages and timestamps.
//!
//! Timestamps are rendered in UTC. Unparseable input is echoed back rather
//! than rejected.

use chrono::{DateTime, NaiveDateTime, Utc};

const DATE_FORMAT: &str = "%b %d, %Y %H:%M";
const NOT_AVAILABLE: &str = "N/A";

fn parse_amount(amount: &str) -> Option<f64> {
    amount.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `"$"`, `"12.5"`, 2 -> `"$12.50"`. Empty or non-numeric input formats as zero.
pub fn format_amount(amount: &str, currency: &str, decimals: usize) -> String {
    match parse_amount(amount) {
        Some(value) => format!("{currency}{value:.decimals$}"),
        None => format!("{currency}0.00"),
    }
}

pub fn format_percentage(value: &str, decimals: usize) -> String {
    match parse_amount(value) {
        Some(value) => format!("{value:.decimals$}%"),
        None => "0.00%".to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// `2024-05-01T10:03:00Z` -> `May 01, 2024 10:03`.
pub fn format_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    match parse_timestamp(raw) {
        Some(dt) => dt.format(DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// "just now", "5 minutes ago", ... relative to the current time.
pub fn relative_time(raw: &str) -> String {
    relative_time_at(raw, Utc::now())
}

/// Same as [`relative_time`] against a fixed `now`. Older than 30 days falls
/// back to [`format_date`].
pub fn relative_time_at(raw: &str, now: DateTime<Utc>) -> String {
    if raw.trim().is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    let Some(then) = parse_timestamp(raw) else {
        return raw.to_string();
    };

    let seconds = (now - then).num_seconds();
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("{n} {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };

    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => plural(s / 60, "minute"),
        s if s < 86_400 => plural(s / 3_600, "hour"),
        s if s < 2_592_000 => plural(s / 86_400, "day"),
        _ => format_date(raw),
    }
}
