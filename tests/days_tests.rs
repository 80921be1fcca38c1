// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use tillbook::commands::{categories, days, expenses};
use tillbook::error::Rejected;
use tillbook::models::{DayStatus, ShiftLabel};
use tillbook::{cli, config, db, store};

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["tillbook"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("day", m)) => days::handle(conn, m),
        Some(("expense", m)) => expenses::handle(conn, m),
        Some(("category", m)) => categories::handle(conn, m),
        _ => panic!("unexpected subcommand"),
    }
}

#[test]
fn day_set_parses_locale_amounts_and_closes_shift() {
    let conn = base_conn();
    run(
        &conn,
        &[
            "day", "set", "--date", "2025-03-03", "--shift", "Morning", "--income",
            "221.223,50", "--note", "rain",
        ],
    )
    .unwrap();
    run(
        &conn,
        &[
            "day", "set", "--date", "2025-03-03", "--shift", "afternoon", "--income",
            "$ 1,500.25", "--closed",
        ],
    )
    .unwrap();
    run(&conn, &["day", "note", "--date", "2025-03-03", "--text", "  inventory  "]).unwrap();

    let rec = store::load_day(&conn, d("2025-03-03")).unwrap().unwrap();
    assert_eq!(rec.shift(ShiftLabel::Morning).unwrap().income, 221_223.5);
    assert_eq!(rec.shift(ShiftLabel::Morning).unwrap().note, "rain");
    assert_eq!(rec.shift(ShiftLabel::Afternoon).unwrap().income, 1_500.25);
    assert_eq!(rec.note, "inventory");
    assert_eq!(rec.status(), DayStatus::Complete);

    assert!(run(&conn, &["day", "set", "--date", "2025-03-03", "--shift", "night", "--income", "1"]).is_err());
    assert!(run(&conn, &["day", "set", "--date", "03/03/2025", "--shift", "morning", "--income", "1"]).is_err());
}

#[test]
fn day_show_reports_missing_day() {
    let conn = base_conn();
    let err = run(&conn, &["day", "show", "--date", "2025-03-04"]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<Rejected>(),
        Some(&Rejected::DayNotFound(d("2025-03-04")))
    );
}

#[test]
fn day_list_is_newest_first_and_hides_closed_weekdays() {
    let conn = base_conn();
    for date in ["2025-03-01", "2025-03-03", "2025-03-04"] {
        run(&conn, &["day", "set", "--date", date, "--shift", "morning", "--income", "100"]).unwrap();
    }
    config::set(&conn, config::EXCLUDED_WEEKDAYS, "sat,sun").unwrap();

    let matches = cli::build_cli().get_matches_from(["tillbook", "day", "list", "--limit", "10"]);
    let Some(("day", day_m)) = matches.subcommand() else {
        panic!("no day subcommand");
    };
    let Some(("list", list_m)) = day_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = days::list_rows(&conn, list_m).unwrap();
    let dates: Vec<_> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-03-04", "2025-03-03"]);
    assert_eq!(rows[0].status, DayStatus::Draft);
    assert_eq!(rows[0].profit, 100.0);
}

#[test]
fn expense_commands_resolve_categories_by_name() {
    let conn = base_conn();
    run(&conn, &["category", "add", "--kind", "fixed", "--name", "  Rent  "]).unwrap();
    run(&conn, &["category", "add", "--kind", "fixed", "--name", "Shop   Repairs"]).unwrap();
    let names: Vec<String> = store::list_categories(&conn, None)
        .unwrap()
        .into_iter()
        .map(|(c, _)| c.name)
        .collect();
    assert_eq!(names, vec!["Rent", "Shop Repairs"]);
    run(&conn, &["category", "add", "--kind", "variable", "--name", "Stock"]).unwrap();

    run(
        &conn,
        &[
            "expense", "add", "--date", "2025-03-03", "--kind", "variable", "--category",
            "stock", "--amount", "1.500,50",
        ],
    )
    .expect_err("category names are case sensitive");

    run(
        &conn,
        &[
            "expense", "add", "--date", "2025-03-03", "--kind", "variable", "--category",
            "Stock", "--amount", "1.500,50", "--note", "bread",
        ],
    )
    .unwrap();
    let err = run(
        &conn,
        &[
            "expense", "add", "--date", "2025-03-03", "--kind", "variable", "--category",
            "Rent", "--amount", "10",
        ],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Rejected>(),
        Some(Rejected::KindMismatch { .. })
    ));
    let err = run(
        &conn,
        &[
            "expense", "add", "--date", "2025-03-03", "--kind", "variable", "--category",
            "Stock", "--amount", "abc",
        ],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Rejected>(),
        Some(Rejected::NonPositiveAmount(_))
    ));

    let rec = store::load_day(&conn, d("2025-03-03")).unwrap().unwrap();
    assert_eq!(rec.expenses.len(), 1);
    assert_eq!(rec.expenses[0].amount, 1_500.5);
    assert_eq!(rec.expenses[0].note, "bread");

    let id = rec.expenses[0].id.to_string();
    let stock = rec.expenses[0].category_id.to_string();
    assert!(run(&conn, &["category", "rm", "--id", &stock]).is_err());
    run(&conn, &["expense", "rm", "--id", &id]).unwrap();
    run(&conn, &["category", "rename", "--id", &stock, "--name", "Goods"]).unwrap();
    run(&conn, &["category", "rm", "--id", &stock]).unwrap();
    assert!(run(&conn, &["expense", "rm", "--id", "x"]).is_err());
}
