// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::{month_range, ordered};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `--from/--to` as given, current month when both are absent, swapped when
/// reversed.
pub fn range_args(
    sub: &clap::ArgMatches,
    from_key: &str,
    to_key: &str,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let from = sub.get_one::<String>(from_key);
    let to = sub.get_one::<String>(to_key);
    match (from, to) {
        (Some(f), Some(t)) => Ok(ordered(parse_date(f)?, parse_date(t)?)),
        (None, None) => Ok(month_range(today)),
        _ => Err(anyhow::anyhow!(
            "Both --{} and --{} are required when one is given",
            from_key,
            to_key
        )),
    }
}

/// `$ 1.234.567`: rounded to whole units, period grouping.
pub fn fmt_money(v: f64) -> String {
    fmt_money_with(v, "$")
}

pub fn fmt_money_with(v: f64, symbol: &str) -> String {
    let n = if v.is_finite() { v.round() as i64 } else { 0 };
    let sign = if n < 0 { "-" } else { "" };
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{}{} {}", sign, symbol, grouped)
}

pub fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(p) => format!("{:+.1}%", p),
        None => "—".to_string(),
    }
}

/// Collapses whitespace runs and trims, so "  Rent   Shop " == "Rent Shop".
pub fn normalize_name(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
