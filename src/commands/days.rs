// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{DayTotals, day_totals};
use crate::amount::parse_amount;
use crate::config;
use crate::error::Rejected;
use crate::models::{DailyRecord, DayStatus, ShiftLabel};
use crate::store::{self, ShiftInput};
use crate::utils::{fmt_money_with, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("note", sub)) => note(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = config::load(conn)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let shift: ShiftLabel = sub.get_one::<String>("shift").unwrap().parse()?;
    let income = parse_amount(sub.get_one::<String>("income").unwrap());
    let input = ShiftInput {
        shift,
        income,
        note: sub.get_one::<String>("note").cloned(),
        closed: sub.get_flag("closed"),
    };
    store::upsert_shift(conn, date, &input, &settings.calendar)?;
    println!(
        "Saved {} {}: income {}{}",
        date,
        shift,
        fmt_money_with(income, &settings.currency_symbol),
        if input.closed { " (closed)" } else { "" }
    );
    Ok(())
}

fn note(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = config::load(conn)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let text = sub.get_one::<String>("text").unwrap();
    store::set_day_note(conn, date, text, &settings.calendar)?;
    println!("Note saved for {}", date);
    Ok(())
}

#[derive(Serialize)]
pub struct DayView {
    #[serde(flatten)]
    pub record: DailyRecord,
    pub status: DayStatus,
    pub totals: DayTotals,
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = config::load(conn)?;
    let sym = settings.currency_symbol.as_str();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let record = store::load_day(conn, date)?.ok_or(Rejected::DayNotFound(date))?;
    let view = DayView {
        status: record.status(),
        totals: day_totals(&record),
        record,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }

    println!("{}  [{}]", view.record.date, view.status);
    if !view.record.note.is_empty() {
        println!("Note: {}", view.record.note);
    }
    let shifts = ShiftLabel::ALL
        .iter()
        .map(|label| match view.record.shift(*label) {
            Some(s) => vec![
                label.to_string(),
                fmt_money_with(s.income, sym),
                fmt_money_with(s.legacy_variable_expense, sym),
                fmt_money_with(s.legacy_fixed_expense, sym),
                if s.closed { "yes" } else { "no" }.to_string(),
                s.note.clone(),
            ],
            None => vec![
                label.to_string(),
                "-".into(),
                "-".into(),
                "-".into(),
                "no".into(),
                String::new(),
            ],
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Shift", "Income", "Legacy var.", "Legacy fixed", "Closed", "Note"],
            shifts
        )
    );
    if !view.record.expenses.is_empty() {
        let rows = view
            .record
            .expenses
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.kind.to_string(),
                    e.category_name.clone(),
                    fmt_money_with(e.amount, sym),
                    e.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Kind", "Category", "Amount", "Note"], rows)
        );
    }
    let t = view.totals;
    println!(
        "Income {} | Variable {} | Fixed {} | Expenses {} | Profit {}",
        fmt_money_with(t.income, sym),
        fmt_money_with(t.variable_expense, sym),
        fmt_money_with(t.fixed_expense, sym),
        fmt_money_with(t.expense_total, sym),
        fmt_money_with(t.profit, sym)
    );
    Ok(())
}

#[derive(Serialize)]
pub struct DayRow {
    pub date: String,
    pub status: DayStatus,
    pub income: f64,
    pub expense_total: f64,
    pub profit: f64,
}

pub fn list_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<DayRow>> {
    let settings = config::load(conn)?;
    let limit = *sub.get_one::<usize>("limit").unwrap_or(&180);
    let rows = store::recent_days(conn, limit)?
        .into_iter()
        .filter(|r| settings.calendar.is_business_day(r.date))
        .map(|r| {
            let t = day_totals(&r);
            DayRow {
                date: r.date.to_string(),
                status: r.status(),
                income: t.income,
                expense_total: t.expense_total,
                profit: t.profit,
            }
        })
        .collect();
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = config::load(conn)?;
    let sym = settings.currency_symbol.as_str();
    let data = list_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    fmt_money_with(r.income, sym),
                    fmt_money_with(r.expense_total, sym),
                    fmt_money_with(r.profit, sym),
                    r.status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Income", "Expenses", "Profit", "Status"], rows)
        );
    }
    Ok(())
}
