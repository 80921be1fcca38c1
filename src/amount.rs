// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Locale-tolerant money parsing.
//!
//! Accepts both the Argentine convention (`221.223,50`) and the US one
//! (`221,223.50`), with or without a currency marker. Anything that cannot be
//! read as a number becomes `0.0`; callers that need a strictly positive
//! amount check the result themselves.

use once_cell::sync::Lazy;
use regex::Regex;

static COMMA_GROUPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d{1,3}(,\d{3})+$").expect("static regex"));
static PERIOD_GROUPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d{1,3}(\.\d{3})+$").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountInput<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl From<f64> for AmountInput<'_> {
    fn from(v: f64) -> Self {
        AmountInput::Number(v)
    }
}

impl From<i64> for AmountInput<'_> {
    fn from(v: i64) -> Self {
        AmountInput::Number(v as f64)
    }
}

impl<'a> From<&'a str> for AmountInput<'a> {
    fn from(s: &'a str) -> Self {
        AmountInput::Text(s)
    }
}

impl<'a> From<&'a String> for AmountInput<'a> {
    fn from(s: &'a String) -> Self {
        AmountInput::Text(s.as_str())
    }
}

impl<'a> From<Option<&'a str>> for AmountInput<'a> {
    fn from(v: Option<&'a str>) -> Self {
        v.map_or(AmountInput::Missing, AmountInput::Text)
    }
}

pub fn parse_amount<'a>(input: impl Into<AmountInput<'a>>) -> f64 {
    match input.into() {
        AmountInput::Number(n) => n,
        AmountInput::Missing => 0.0,
        AmountInput::Text(s) => parse_text(s),
    }
}

fn parse_text(raw: &str) -> f64 {
    let s: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if s.is_empty() || matches!(s.as_str(), "-" | "," | ".") {
        return 0.0;
    }

    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(period)) => {
            if period > comma {
                s.replace(',', "")
            } else {
                s.replace('.', "").replace(',', ".")
            }
        }
        (Some(_), None) => {
            if COMMA_GROUPS.is_match(&s) {
                s.replace(',', "")
            } else {
                s.replace(',', ".")
            }
        }
        (None, Some(_)) => {
            if PERIOD_GROUPS.is_match(&s) {
                s.replace('.', "")
            } else {
                s
            }
        }
        (None, None) => s,
    };
    normalized.parse::<f64>().unwrap_or(0.0)
}
