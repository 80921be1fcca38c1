// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount::parse_amount;
use crate::config;
use crate::models::ExpenseKind;
use crate::store::{self, ExpenseInput};
use crate::utils::{fmt_money_with, parse_date};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("rm", sub)) => {
            let raw = sub.get_one::<String>("id").unwrap();
            let id = raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid expense id '{}'", raw))?;
            store::delete_expense(conn, id)?;
            println!("Removed expense {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = config::load(conn)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let kind: ExpenseKind = sub.get_one::<String>("kind").unwrap().parse()?;
    let category = store::find_category(conn, kind, sub.get_one::<String>("category").unwrap())?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap());
    let input = ExpenseInput {
        kind,
        category_id: category.id,
        amount,
        note: sub.get_one::<String>("note").cloned().unwrap_or_default(),
    };
    let id = store::add_expense(conn, date, &input, &settings.calendar)?;
    println!(
        "Recorded expense #{} on {}: {} {} ({})",
        id,
        date,
        category.name,
        fmt_money_with(amount, &settings.currency_symbol),
        kind
    );
    Ok(())
}
