// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record store over SQLite.
//!
//! Reads hand back fully assembled `DailyRecord`s with shifts and expenses
//! attached. Writes enforce the referential rules and refuse with
//! [`Rejected`] when one would be broken.

use crate::aggregate::CategoryTotal;
use crate::calendar::BusinessCalendar;
use crate::error::Rejected;
use crate::models::{
    DailyRecord, ExpenseCategory, ExpenseEntry, ExpenseKind, ShiftEntry, ShiftLabel,
};
use crate::utils::normalize_name;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date '{}'", s))
}

fn parse_timestamp(s: Option<String>) -> Option<NaiveDateTime> {
    s.and_then(|s| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").ok())
}

pub fn find_day(conn: &Connection, date: NaiveDate) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM business_days WHERE day=?1",
            params![date.to_string()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Returns the id of the day, creating it on first use. Closed weekdays are
/// refused.
pub fn ensure_day(conn: &Connection, date: NaiveDate, cal: &BusinessCalendar) -> Result<i64> {
    if !cal.is_business_day(date) {
        return Err(Rejected::ExcludedDay {
            date,
            weekday: date.weekday(),
        }
        .into());
    }
    if let Some(id) = find_day(conn, date)? {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO business_days(day, note) VALUES (?1, '')",
        params![date.to_string()],
    )?;
    tracing::debug!(%date, "created business day");
    Ok(conn.last_insert_rowid())
}

pub fn set_day_note(
    conn: &Connection,
    date: NaiveDate,
    note: &str,
    cal: &BusinessCalendar,
) -> Result<()> {
    let id = ensure_day(conn, date, cal)?;
    conn.execute(
        "UPDATE business_days SET note=?1 WHERE id=?2",
        params![note.trim(), id],
    )?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ShiftInput {
    pub shift: ShiftLabel,
    pub income: f64,
    pub note: Option<String>,
    pub closed: bool,
}

/// Creates or updates the single `(day, shift)` row. Legacy import totals on
/// an existing row are left alone.
pub fn upsert_shift(
    conn: &Connection,
    date: NaiveDate,
    input: &ShiftInput,
    cal: &BusinessCalendar,
) -> Result<i64> {
    let day_id = ensure_day(conn, date, cal)?;
    let note = input.note.as_deref().map(str::trim);
    conn.execute(
        "INSERT INTO shift_records(business_day_id, shift, income, note, is_closed)
         VALUES (?1, ?2, ?3, COALESCE(?4, ''), ?5)
         ON CONFLICT(business_day_id, shift) DO UPDATE SET
            income=excluded.income,
            note=COALESCE(?4, shift_records.note),
            is_closed=excluded.is_closed",
        params![day_id, input.shift.as_str(), input.income, note, input.closed],
    )?;
    let id: i64 = conn.query_row(
        "SELECT id FROM shift_records WHERE business_day_id=?1 AND shift=?2",
        params![day_id, input.shift.as_str()],
        |r| r.get(0),
    )?;
    tracing::info!(%date, shift = %input.shift, income = input.income, closed = input.closed, "shift saved");
    Ok(id)
}

pub fn find_shift(conn: &Connection, day_id: i64, shift: ShiftLabel) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM shift_records WHERE business_day_id=?1 AND shift=?2",
            params![day_id, shift.as_str()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Writes spreadsheet totals onto a shift and marks it closed.
pub fn write_legacy_shift(
    conn: &Connection,
    day_id: i64,
    shift: ShiftLabel,
    income: f64,
    variable_expense: f64,
    fixed_expense: f64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO shift_records(business_day_id, shift, income, variable_expense_total, fixed_expense_total, is_closed)
         VALUES (?1, ?2, ?3, ?4, ?5, 1)
         ON CONFLICT(business_day_id, shift) DO UPDATE SET
            income=excluded.income,
            variable_expense_total=excluded.variable_expense_total,
            fixed_expense_total=excluded.fixed_expense_total,
            is_closed=1",
        params![day_id, shift.as_str(), income, variable_expense, fixed_expense],
    )?;
    Ok(())
}

/// Every stored day in `[from, to]` with its children, oldest first.
pub fn load_days(conn: &Connection, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyRecord>> {
    let (from_s, to_s) = (from.to_string(), to.to_string());

    let mut days: Vec<DailyRecord> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    {
        let mut stmt = conn.prepare_cached(
            "SELECT id, day, note FROM business_days WHERE day>=?1 AND day<=?2 ORDER BY day",
        )?;
        let mut rows = stmt.query(params![from_s, to_s])?;
        while let Some(r) = rows.next()? {
            let id: i64 = r.get(0)?;
            let day: String = r.get(1)?;
            let mut rec = DailyRecord::new(parse_day(&day)?);
            rec.id = id;
            rec.note = r.get(2)?;
            index.insert(id, days.len());
            days.push(rec);
        }
    }
    if days.is_empty() {
        return Ok(days);
    }

    {
        let mut stmt = conn.prepare_cached(
            "SELECT s.id, s.business_day_id, s.shift, s.income, s.variable_expense_total,
                    s.fixed_expense_total, s.is_closed, s.note
             FROM shift_records s JOIN business_days d ON d.id=s.business_day_id
             WHERE d.day>=?1 AND d.day<=?2
             ORDER BY d.day, s.shift DESC",
        )?;
        let mut rows = stmt.query(params![from_s, to_s])?;
        while let Some(r) = rows.next()? {
            let day_id: i64 = r.get(1)?;
            let label: String = r.get(2)?;
            let shift = ShiftEntry {
                id: r.get(0)?,
                shift: label.parse()?,
                income: r.get(3)?,
                legacy_variable_expense: r.get(4)?,
                legacy_fixed_expense: r.get(5)?,
                closed: r.get(6)?,
                note: r.get(7)?,
            };
            if let Some(&i) = index.get(&day_id) {
                days[i].shifts.push(shift);
            }
        }
    }

    {
        let mut stmt = conn.prepare_cached(
            "SELECT e.id, e.business_day_id, e.kind, e.category_id, c.name, e.amount, e.note, e.created_at
             FROM expense_entries e
             JOIN business_days d ON d.id=e.business_day_id
             JOIN expense_categories c ON c.id=e.category_id
             WHERE d.day>=?1 AND d.day<=?2
             ORDER BY d.day, e.id",
        )?;
        let mut rows = stmt.query(params![from_s, to_s])?;
        while let Some(r) = rows.next()? {
            let day_id: i64 = r.get(1)?;
            let kind: String = r.get(2)?;
            let entry = ExpenseEntry {
                id: r.get(0)?,
                kind: kind.parse()?,
                category_id: r.get(3)?,
                category_name: r.get(4)?,
                amount: r.get(5)?,
                note: r.get(6)?,
                created_at: parse_timestamp(r.get(7)?),
            };
            if let Some(&i) = index.get(&day_id) {
                days[i].expenses.push(entry);
            }
        }
    }
    Ok(days)
}

pub fn load_day(conn: &Connection, date: NaiveDate) -> Result<Option<DailyRecord>> {
    Ok(load_days(conn, date, date)?.into_iter().next())
}

/// The `limit` most recent stored days, newest first.
pub fn recent_days(conn: &Connection, limit: usize) -> Result<Vec<DailyRecord>> {
    let mut stmt = conn.prepare("SELECT day FROM business_days ORDER BY day DESC LIMIT ?1")?;
    let dates = stmt
        .query_map(params![limit as i64], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    let (Some(newest), Some(oldest)) = (dates.first(), dates.last()) else {
        return Ok(Vec::new());
    };
    let mut days = load_days(conn, parse_day(oldest)?, parse_day(newest)?)?;
    days.reverse();
    Ok(days)
}

fn read_category(r: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String, Option<String>)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
}

fn to_category(row: (i64, String, String, Option<String>)) -> Result<ExpenseCategory> {
    let (id, kind, name, created_at) = row;
    Ok(ExpenseCategory {
        id,
        kind: kind.parse()?,
        name,
        created_at: parse_timestamp(created_at),
    })
}

pub fn get_category(conn: &Connection, id: i64) -> Result<ExpenseCategory> {
    let row = conn
        .query_row(
            "SELECT id, kind, name, created_at FROM expense_categories WHERE id=?1",
            params![id],
            read_category,
        )
        .optional()?
        .ok_or_else(|| Rejected::CategoryNotFound(id.to_string()))?;
    to_category(row)
}

/// Looks a category up by name, preferring `kind`. Falls back to the other
/// kind so the caller can report a kind mismatch instead of "not found".
pub fn find_category(conn: &Connection, kind: ExpenseKind, name: &str) -> Result<ExpenseCategory> {
    let clean = normalize_name(name);
    let row = conn
        .query_row(
            "SELECT id, kind, name, created_at FROM expense_categories
             WHERE name=?1 ORDER BY CASE WHEN kind=?2 THEN 0 ELSE 1 END LIMIT 1",
            params![clean, kind.as_str()],
            read_category,
        )
        .optional()?
        .ok_or_else(|| Rejected::CategoryNotFound(format!("'{}'", clean)))?;
    to_category(row)
}

pub fn list_categories(
    conn: &Connection,
    kind: Option<ExpenseKind>,
) -> Result<Vec<(ExpenseCategory, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.kind, c.name, c.created_at,
                (SELECT COUNT(*) FROM expense_entries e WHERE e.category_id=c.id)
         FROM expense_categories c
         WHERE ?1 IS NULL OR c.kind=?1
         ORDER BY c.kind, c.name",
    )?;
    let rows = stmt.query_map(params![kind.map(|k| k.as_str())], |r| {
        Ok((read_category(r)?, r.get::<_, i64>(4)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (cat, used) = row?;
        out.push((to_category(cat)?, used));
    }
    Ok(out)
}

fn category_exists(conn: &Connection, kind: ExpenseKind, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM expense_categories WHERE kind=?1 AND name=?2",
            params![kind.as_str(), name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn add_category(conn: &Connection, kind: ExpenseKind, name: &str) -> Result<i64> {
    let clean = normalize_name(name);
    if clean.is_empty() {
        return Err(Rejected::EmptyCategoryName.into());
    }
    if category_exists(conn, kind, &clean)?.is_some() {
        return Err(Rejected::DuplicateCategory { kind, name: clean }.into());
    }
    conn.execute(
        "INSERT INTO expense_categories(kind, name) VALUES (?1, ?2)",
        params![kind.as_str(), clean],
    )?;
    tracing::info!(%kind, name = %clean, "category added");
    Ok(conn.last_insert_rowid())
}

pub fn rename_category(conn: &Connection, id: i64, name: &str) -> Result<ExpenseCategory> {
    let cat = get_category(conn, id)?;
    let clean = normalize_name(name);
    if clean.is_empty() {
        return Err(Rejected::EmptyCategoryName.into());
    }
    if let Some(other) = category_exists(conn, cat.kind, &clean)? {
        if other != id {
            return Err(Rejected::DuplicateCategory {
                kind: cat.kind,
                name: clean,
            }
            .into());
        }
    }
    conn.execute(
        "UPDATE expense_categories SET name=?1 WHERE id=?2",
        params![clean, id],
    )?;
    tracing::info!(id, from = %cat.name, to = %clean, "category renamed");
    get_category(conn, id)
}

pub fn category_usage(conn: &Connection, id: i64) -> Result<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM expense_entries WHERE category_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    Ok(n)
}

pub fn delete_category(conn: &Connection, id: i64) -> Result<ExpenseCategory> {
    let cat = get_category(conn, id)?;
    let used = category_usage(conn, id)?;
    if used > 0 {
        return Err(Rejected::CategoryInUse {
            name: cat.name,
            entries: used,
        }
        .into());
    }
    conn.execute("DELETE FROM expense_categories WHERE id=?1", params![id])?;
    tracing::info!(id, name = %cat.name, "category removed");
    Ok(cat)
}

#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub kind: ExpenseKind,
    pub category_id: i64,
    pub amount: f64,
    pub note: String,
}

pub fn add_expense(
    conn: &Connection,
    date: NaiveDate,
    input: &ExpenseInput,
    cal: &BusinessCalendar,
) -> Result<i64> {
    if input.amount.is_nan() || input.amount <= 0.0 {
        return Err(Rejected::NonPositiveAmount(input.amount).into());
    }
    let cat = get_category(conn, input.category_id)?;
    if cat.kind != input.kind {
        return Err(Rejected::KindMismatch {
            name: cat.name,
            category_kind: cat.kind,
            requested: input.kind,
        }
        .into());
    }
    let day_id = ensure_day(conn, date, cal)?;
    conn.execute(
        "INSERT INTO expense_entries(business_day_id, kind, category_id, amount, note)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            day_id,
            input.kind.as_str(),
            input.category_id,
            input.amount,
            input.note.trim()
        ],
    )?;
    tracing::info!(%date, category = %cat.name, amount = input.amount, "expense added");
    Ok(conn.last_insert_rowid())
}

pub fn delete_expense(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM expense_entries WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Rejected::ExpenseNotFound(id).into());
    }
    tracing::info!(id, "expense removed");
    Ok(())
}

/// Categorized spend per (kind, name) computed in SQL, largest first.
pub fn category_totals(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
) -> Result<Vec<CategoryTotal>> {
    let closed = cal
        .excluded()
        .iter()
        .map(|w| w.num_days_from_sunday().to_string())
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!(
        "SELECT c.kind, c.name, SUM(e.amount) AS total, COUNT(e.id)
         FROM expense_entries e
         JOIN expense_categories c ON c.id=e.category_id
         JOIN business_days d ON d.id=e.business_day_id
         WHERE d.day>=?1 AND d.day<=?2
           AND CAST(strftime('%w', d.day) AS INTEGER) NOT IN ({})
         GROUP BY c.kind, c.name
         ORDER BY total DESC, c.kind, c.name",
        closed
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![from.to_string(), to.to_string()], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, f64>(2)?,
            r.get::<_, i64>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (kind, name, total, entries) = row?;
        out.push(CategoryTotal {
            kind: kind.parse()?,
            name,
            total,
            entries: entries as usize,
        });
    }
    Ok(out)
}
