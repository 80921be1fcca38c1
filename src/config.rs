// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::HIGH_EXPENSE_THRESHOLD;
use crate::calendar::BusinessCalendar;
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub const EXCLUDED_WEEKDAYS: &str = "excluded_weekdays";
pub const ALERT_THRESHOLD: &str = "alert_threshold";
pub const CURRENCY_SYMBOL: &str = "currency_symbol";

pub const KEYS: [&str; 3] = [EXCLUDED_WEEKDAYS, ALERT_THRESHOLD, CURRENCY_SYMBOL];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub calendar: BusinessCalendar,
    pub alert_threshold: f64,
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            calendar: BusinessCalendar::default(),
            alert_threshold: HIGH_EXPENSE_THRESHOLD,
            currency_symbol: "$".to_string(),
        }
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn load(conn: &Connection) -> Result<Settings> {
    let mut s = Settings::default();
    if let Some(v) = get_setting(conn, EXCLUDED_WEEKDAYS)? {
        s.calendar = BusinessCalendar::parse(&v)
            .with_context(|| format!("Bad '{}' setting '{}'", EXCLUDED_WEEKDAYS, v))?;
    }
    if let Some(v) = get_setting(conn, ALERT_THRESHOLD)? {
        s.alert_threshold = v
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Bad '{}' setting '{}'", ALERT_THRESHOLD, v))?;
    }
    if let Some(v) = get_setting(conn, CURRENCY_SYMBOL)? {
        s.currency_symbol = v;
    }
    Ok(s)
}

/// Validates and stores one setting, returning the value as stored.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    let stored = match key {
        EXCLUDED_WEEKDAYS => BusinessCalendar::parse(value)?.to_setting(),
        ALERT_THRESHOLD => {
            let t = value
                .parse::<f64>()
                .with_context(|| format!("Invalid threshold '{}'", value))?;
            if !t.is_finite() || t < 0.0 {
                return Err(anyhow!("Threshold must be a non-negative number"));
            }
            t.to_string()
        }
        CURRENCY_SYMBOL => value.to_string(),
        other => {
            return Err(anyhow!(
                "Unknown setting '{}' (known: {})",
                other,
                KEYS.join(", ")
            ));
        }
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, stored],
    )?;
    tracing::info!(key, value = %stored, "setting updated");
    Ok(stored)
}
