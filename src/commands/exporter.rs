// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::day_totals;
use crate::calendar::BusinessCalendar;
use crate::config;
use crate::models::{DayStatus, ExpenseKind, ShiftLabel};
use crate::store;
use crate::utils::range_args;
use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("backup", sub)) => export_backup(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BackupRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BackupDay {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub note: String,
    pub income: f64,
    pub variable_expense: f64,
    pub fixed_expense: f64,
    pub expense_total: f64,
    pub profit: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BackupShift {
    pub date: NaiveDate,
    pub shift: ShiftLabel,
    pub income: f64,
    pub note: String,
    pub is_closed: bool,
    pub legacy_variable_expense_total: f64,
    pub legacy_fixed_expense_total: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BackupExpense {
    pub date: NaiveDate,
    pub kind: ExpenseKind,
    pub category_id: i64,
    pub category_name: String,
    pub amount: f64,
    pub note: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BackupCategory {
    pub id: i64,
    pub kind: ExpenseKind,
    pub name: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    pub range: BackupRange,
    pub generated_at: String,
    pub days: Vec<BackupDay>,
    pub shifts: Vec<BackupShift>,
    pub expenses: Vec<BackupExpense>,
    pub categories: Vec<BackupCategory>,
}

pub fn build_backup(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
) -> Result<Backup> {
    let categories = store::list_categories(conn, None)?
        .into_iter()
        .map(|(c, _)| BackupCategory {
            id: c.id,
            kind: c.kind,
            name: c.name,
            created_at: c.created_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
        })
        .collect();

    let mut days = Vec::new();
    let mut shifts = Vec::new();
    let mut expenses = Vec::new();
    for rec in store::load_days(conn, from, to)? {
        if !cal.is_business_day(rec.date) {
            continue;
        }
        let t = day_totals(&rec);
        days.push(BackupDay {
            date: rec.date,
            status: rec.status(),
            note: rec.note.clone(),
            income: t.income,
            variable_expense: t.variable_expense,
            fixed_expense: t.fixed_expense,
            expense_total: t.expense_total,
            profit: t.profit,
        });
        for s in &rec.shifts {
            shifts.push(BackupShift {
                date: rec.date,
                shift: s.shift,
                income: s.income,
                note: s.note.clone(),
                is_closed: s.closed,
                legacy_variable_expense_total: s.legacy_variable_expense,
                legacy_fixed_expense_total: s.legacy_fixed_expense,
            });
        }
        for e in &rec.expenses {
            expenses.push(BackupExpense {
                date: rec.date,
                kind: e.kind,
                category_id: e.category_id,
                category_name: e.category_name.clone(),
                amount: e.amount,
                note: e.note.clone(),
                created_at: e.created_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            });
        }
    }

    Ok(Backup {
        range: BackupRange { from, to },
        generated_at: Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
        days,
        shifts,
        expenses,
        categories,
    })
}

fn export_backup(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "json" && fmt != "csv" {
        return Err(anyhow!("Unknown format: {} (use json|csv)", fmt));
    }
    let settings = config::load(conn)?;
    let (from, to) = range_args(sub, "from", "to", chrono::Local::now().date_naive())?;
    let backup = build_backup(conn, from, to, &settings.calendar)?;

    if fmt == "json" {
        std::fs::write(out, serde_json::to_string_pretty(&backup)?)
            .with_context(|| format!("Write {}", out))?;
    } else {
        write_csv_sheets(&backup, Path::new(out))?;
    }
    tracing::info!(
        format = %fmt,
        out,
        days = backup.days.len(),
        expenses = backup.expenses.len(),
        "backup exported"
    );
    println!("Exported {} to {} ({} days)", fmt, out, backup.days.len());
    Ok(())
}

/// One CSV per sheet: summary, days, expenses, categories. Plain numbers, no
/// currency formatting.
pub fn write_csv_sheets(backup: &Backup, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Create {}", dir.display()))?;

    let income: f64 = backup.days.iter().map(|d| d.income).sum();
    let expense: f64 = backup.days.iter().map(|d| d.expense_total).sum();
    let mut wtr = csv::Writer::from_path(dir.join("summary.csv"))?;
    wtr.write_record(["field", "value"])?;
    wtr.write_record([
        "range".to_string(),
        format!("{} to {}", backup.range.from, backup.range.to),
    ])?;
    wtr.write_record(["income".to_string(), income.to_string()])?;
    wtr.write_record(["expenses".to_string(), expense.to_string()])?;
    wtr.write_record(["profit".to_string(), (income - expense).to_string()])?;
    wtr.write_record(["days".to_string(), backup.days.len().to_string()])?;
    wtr.flush()?;

    let mut wtr = csv::Writer::from_path(dir.join("days.csv"))?;
    wtr.write_record([
        "date",
        "status",
        "note",
        "income",
        "variable_expense",
        "fixed_expense",
        "expense_total",
        "profit",
    ])?;
    for d in &backup.days {
        wtr.write_record([
            d.date.to_string(),
            d.status.to_string(),
            d.note.clone(),
            d.income.to_string(),
            d.variable_expense.to_string(),
            d.fixed_expense.to_string(),
            d.expense_total.to_string(),
            d.profit.to_string(),
        ])?;
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_path(dir.join("expenses.csv"))?;
    wtr.write_record(["date", "kind", "category", "amount", "note", "created_at"])?;
    for e in &backup.expenses {
        wtr.write_record([
            e.date.to_string(),
            e.kind.to_string(),
            e.category_name.clone(),
            e.amount.to_string(),
            e.note.clone(),
            e.created_at.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_path(dir.join("categories.csv"))?;
    wtr.write_record(["id", "kind", "name", "created_at"])?;
    for c in &backup.categories {
        wtr.write_record([
            c.id.to_string(),
            c.kind.to_string(),
            c.name.clone(),
            c.created_at.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
