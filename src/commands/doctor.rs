// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config;
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let settings = config::load(conn)?;
    let mut rows = Vec::new();

    // 1) Days stored on a weekday the shop is closed
    let mut stmt = conn.prepare("SELECT day FROM business_days ORDER BY day")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let d: String = r.get(0)?;
        let date = NaiveDate::parse_from_str(&d, "%Y-%m-%d")?;
        if !settings.calendar.is_business_day(date) {
            rows.push(vec!["day_on_closed_weekday".into(), d]);
        }
    }

    // 2) Expense kind disagrees with its category
    let mut stmt2 = conn.prepare(
        "SELECT e.id, d.day, e.kind, c.kind, c.name
         FROM expense_entries e
         JOIN expense_categories c ON c.id=e.category_id
         JOIN business_days d ON d.id=e.business_day_id
         WHERE e.kind != c.kind ORDER BY d.day, e.id",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let day: String = r.get(1)?;
        let kind: String = r.get(2)?;
        let cat_kind: String = r.get(3)?;
        let name: String = r.get(4)?;
        rows.push(vec![
            "expense_kind_mismatch".into(),
            format!("#{} {} {} vs '{}' ({})", id, day, kind, name, cat_kind),
        ]);
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
