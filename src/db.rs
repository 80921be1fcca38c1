// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Tillbook", "tillbook"));

pub const DB_ENV: &str = "TILLBOOK_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tillbook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS business_days(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        day TEXT NOT NULL UNIQUE,
        note TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS shift_records(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        business_day_id INTEGER NOT NULL,
        shift TEXT NOT NULL CHECK(shift IN ('Morning','Afternoon')),
        income REAL NOT NULL DEFAULT 0,
        -- legacy totals from spreadsheet imports
        variable_expense_total REAL NOT NULL DEFAULT 0,
        fixed_expense_total REAL NOT NULL DEFAULT 0,
        note TEXT NOT NULL DEFAULT '',
        is_closed INTEGER NOT NULL DEFAULT 0,
        UNIQUE(business_day_id, shift),
        FOREIGN KEY(business_day_id) REFERENCES business_days(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS expense_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL CHECK(kind IN ('fixed','variable')),
        name TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(kind, name)
    );

    CREATE TABLE IF NOT EXISTS expense_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        business_day_id INTEGER NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('fixed','variable')),
        category_id INTEGER NOT NULL,
        amount REAL NOT NULL DEFAULT 0,
        note TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(business_day_id) REFERENCES business_days(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES expense_categories(id) ON DELETE RESTRICT
    );
    CREATE INDEX IF NOT EXISTS idx_expense_entries_day ON expense_entries(business_day_id);
    "#,
    )?;
    Ok(())
}
