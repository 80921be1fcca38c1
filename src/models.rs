// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    Fixed,
    Variable,
}

impl ExpenseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseKind::Fixed => "fixed",
            ExpenseKind::Variable => "variable",
        }
    }
}

impl fmt::Display for ExpenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(ExpenseKind::Fixed),
            "variable" => Ok(ExpenseKind::Variable),
            other => Err(anyhow!(
                "Invalid expense kind '{}', expected fixed|variable",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftLabel {
    Morning,
    Afternoon,
}

impl ShiftLabel {
    pub const ALL: [ShiftLabel; 2] = [ShiftLabel::Morning, ShiftLabel::Afternoon];

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftLabel::Morning => "Morning",
            ShiftLabel::Afternoon => "Afternoon",
        }
    }

    /// Lenient match used by the spreadsheet importer: "mañana", "Morning",
    /// "MA" and "mo" all land on the morning shift.
    pub fn normalize(raw: &str) -> Option<ShiftLabel> {
        let s = raw.trim().to_lowercase();
        if s.starts_with("ma") || s.starts_with("mo") {
            Some(ShiftLabel::Morning)
        } else if s.starts_with("ta") || s.starts_with("af") {
            Some(ShiftLabel::Afternoon)
        } else {
            None
        }
    }
}

impl fmt::Display for ShiftLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(ShiftLabel::Morning),
            "afternoon" => Ok(ShiftLabel::Afternoon),
            other => Err(anyhow!(
                "Invalid shift '{}', expected morning|afternoon",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Draft,
    Complete,
}

impl DayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Draft => "draft",
            DayStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftEntry {
    pub id: i64,
    pub shift: ShiftLabel,
    pub income: f64,
    pub legacy_variable_expense: f64, // bulk-import totals
    pub legacy_fixed_expense: f64,
    pub closed: bool,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: i64,
    pub kind: ExpenseKind,
    pub name: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub id: i64,
    pub kind: ExpenseKind,
    pub category_id: i64,
    pub category_name: String,
    pub amount: f64,
    pub note: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub note: String,
    pub shifts: Vec<ShiftEntry>,
    pub expenses: Vec<ExpenseEntry>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate) -> Self {
        DailyRecord {
            id: 0,
            date,
            note: String::new(),
            shifts: Vec::new(),
            expenses: Vec::new(),
        }
    }

    /// A day counts as complete once any one shift is closed.
    pub fn status(&self) -> DayStatus {
        if self.shifts.iter().any(|s| s.closed) {
            DayStatus::Complete
        } else {
            DayStatus::Draft
        }
    }

    pub fn shift(&self, label: ShiftLabel) -> Option<&ShiftEntry> {
        self.shifts.iter().find(|s| s.shift == label)
    }
}
