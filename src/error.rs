// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::ExpenseKind;
use chrono::{NaiveDate, Weekday};
use thiserror::Error;

/// Writes the store refuses. These are user-facing outcomes, not faults.
#[derive(Debug, Error, PartialEq)]
pub enum Rejected {
    #[error("{date} is a {weekday}; the shop is closed that day")]
    ExcludedDay { date: NaiveDate, weekday: Weekday },

    #[error("No record for {0}")]
    DayNotFound(NaiveDate),

    #[error("Category '{name}' ({kind}) already exists")]
    DuplicateCategory { kind: ExpenseKind, name: String },

    #[error("Category '{name}' has {entries} expense(s) and cannot be removed")]
    CategoryInUse { name: String, entries: i64 },

    #[error("Category {0} not found")]
    CategoryNotFound(String),

    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    #[error("Category '{name}' is {category_kind}, not {requested}")]
    KindMismatch {
        name: String,
        category_kind: ExpenseKind,
        requested: ExpenseKind,
    },

    #[error("Amount must be greater than 0 (got {0})")]
    NonPositiveAmount(f64),

    #[error("Expense {0} not found")]
    ExpenseNotFound(i64),
}
