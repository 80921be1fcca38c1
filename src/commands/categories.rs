// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::ExpenseKind;
use crate::store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind: ExpenseKind = sub.get_one::<String>("kind").unwrap().parse()?;
            let name = sub.get_one::<String>("name").unwrap();
            let id = store::add_category(conn, kind, name)?;
            let cat = store::get_category(conn, id)?;
            println!("Added {} category '{}' (id {})", kind, cat.name, id);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rename", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let cat = store::rename_category(conn, id, sub.get_one::<String>("name").unwrap())?;
            println!("Renamed category {} to '{}'", id, cat.name);
        }
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let cat = store::delete_category(conn, id)?;
            println!("Removed category '{}'", cat.name);
        }
        _ => {}
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid category id '{}'", raw))
}

#[derive(Serialize)]
pub struct CategoryRow {
    pub id: i64,
    pub kind: ExpenseKind,
    pub name: String,
    pub entries: i64,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind = sub
        .get_one::<String>("kind")
        .map(|k| k.parse::<ExpenseKind>())
        .transpose()?;
    let data: Vec<CategoryRow> = store::list_categories(conn, kind)?
        .into_iter()
        .map(|(c, entries)| CategoryRow {
            id: c.id,
            kind: c.kind,
            name: c.name,
            entries,
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.kind.to_string(),
                    c.name.clone(),
                    c.entries.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Kind", "Category", "Entries"], rows));
    }
    Ok(())
}
