// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount::parse_amount;
use crate::config;
use crate::models::ShiftLabel;
use crate::store;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use rusqlite::Connection;
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Skip,
    Replace,
}

impl FromStr for ImportMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(ImportMode::Skip),
            "replace" => Ok(ImportMode::Replace),
            other => Err(anyhow!("Unknown import mode '{}' (use skip|replace)", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub replaced: usize,
    pub skipped: usize,
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("shifts", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let mode: ImportMode = sub
                .get_one::<String>("mode")
                .map(|s| s.as_str())
                .unwrap_or("skip")
                .parse()?;
            let file = std::fs::File::open(path).with_context(|| format!("Open CSV {}", path))?;
            let summary = import_shifts(conn, file, mode)?;
            println!(
                "Imported from {}: new {}, replaced {}, skipped {}",
                path, summary.imported, summary.replaced, summary.skipped
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

fn parse_date_cell(s: &str) -> Option<NaiveDate> {
    ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Loads legacy per-shift totals (`date, shift, income, variable, fixed`).
///
/// Spreadsheets only write the date on the first row of a day, so a blank
/// date cell reuses the previous one. Rows that cannot be placed on an open
/// business day with a known shift, or that carry no money at all, are
/// dropped without counting.
pub fn import_shifts<R: Read>(conn: &mut Connection, input: R, mode: ImportMode) -> Result<ImportSummary> {
    let settings = config::load(conn)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();
    let mut last_date: Option<NaiveDate> = None;

    for (line, result) in rdr.records().enumerate() {
        let rec = result.with_context(|| format!("Read CSV row {}", line + 2))?;
        let cell = |i: usize| rec.get(i).map(str::trim).unwrap_or("");

        let raw_shift = cell(1);
        if raw_shift.is_empty() {
            continue;
        }
        let raw_date = cell(0);
        let date = if raw_date.is_empty() {
            match last_date {
                Some(d) => d,
                None => continue,
            }
        } else {
            match parse_date_cell(raw_date) {
                Some(d) => {
                    last_date = Some(d);
                    d
                }
                None => {
                    tracing::warn!(row = line + 2, value = raw_date, "unreadable date, row ignored");
                    continue;
                }
            }
        };
        if !settings.calendar.is_business_day(date) {
            continue;
        }
        let Some(shift) = ShiftLabel::normalize(raw_shift) else {
            tracing::warn!(row = line + 2, value = raw_shift, "unknown shift, row ignored");
            continue;
        };

        let income = parse_amount(cell(2));
        let variable = parse_amount(cell(3));
        let fixed = parse_amount(cell(4));
        if income == 0.0 && variable == 0.0 && fixed == 0.0 {
            continue;
        }

        let day_id = store::ensure_day(&tx, date, &settings.calendar)?;
        match (store::find_shift(&tx, day_id, shift)?, mode) {
            (Some(_), ImportMode::Skip) => {
                summary.skipped += 1;
                continue;
            }
            (Some(_), ImportMode::Replace) => summary.replaced += 1,
            (None, _) => summary.imported += 1,
        }
        store::write_legacy_shift(&tx, day_id, shift, income, variable, fixed)?;
    }
    tx.commit()?;
    tracing::info!(
        imported = summary.imported,
        replaced = summary.replaced,
        skipped = summary.skipped,
        "shift import finished"
    );
    Ok(summary)
}
