// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let s = config::load(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                let rows = vec![
                    vec![
                        config::EXCLUDED_WEEKDAYS.to_string(),
                        s.calendar.to_setting(),
                    ],
                    vec![
                        config::ALERT_THRESHOLD.to_string(),
                        s.alert_threshold.to_string(),
                    ],
                    vec![config::CURRENCY_SYMBOL.to_string(), s.currency_symbol],
                ];
                println!("{}", pretty_table(&["Key", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap();
            let stored = config::set(conn, key, value)?;
            println!("{} = {}", key, stored);
        }
        _ => {}
    }
    Ok(())
}
