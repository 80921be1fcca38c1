// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;
use tillbook::calendar::BusinessCalendar;
use tillbook::commands::exporter::{self, Backup};
use tillbook::models::{ExpenseKind, ShiftLabel};
use tillbook::store::{self, ExpenseInput, ShiftInput};
use tillbook::{cli, db};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn seeded_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let cal = BusinessCalendar::default();
    store::upsert_shift(
        &conn,
        d("2025-03-03"),
        &ShiftInput {
            shift: ShiftLabel::Morning,
            income: 1000.0,
            note: Some("busy".into()),
            closed: true,
        },
        &cal,
    )
    .unwrap();
    let rent = store::add_category(&conn, ExpenseKind::Fixed, "Rent").unwrap();
    store::add_expense(
        &conn,
        d("2025-03-03"),
        &ExpenseInput {
            kind: ExpenseKind::Fixed,
            category_id: rent,
            amount: 250.0,
            note: "March".into(),
        },
        &cal,
    )
    .unwrap();
    store::upsert_shift(
        &conn,
        d("2025-04-01"),
        &ShiftInput {
            shift: ShiftLabel::Afternoon,
            income: 5.0,
            note: None,
            closed: false,
        },
        &cal,
    )
    .unwrap();
    conn
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["tillbook", "export", "backup"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_backup_writes_json_document() {
    let conn = seeded_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("backup.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &conn,
        &[
            "--from", "2025-03-31", "--to", "2025-03-01", "--format", "json", "--out", &out_str,
        ],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["range"], json!({"from": "2025-03-01", "to": "2025-03-31"}));
    assert!(parsed["generated_at"].is_string());
    assert_eq!(
        parsed["days"],
        json!([{
            "date": "2025-03-03",
            "status": "complete",
            "note": "",
            "income": 1000.0,
            "variable_expense": 0.0,
            "fixed_expense": 250.0,
            "expense_total": 250.0,
            "profit": 750.0
        }])
    );
    assert_eq!(parsed["shifts"][0]["shift"], "Morning");
    assert_eq!(parsed["shifts"][0]["note"], "busy");
    assert_eq!(parsed["shifts"][0]["is_closed"], true);
    assert_eq!(parsed["expenses"][0]["category_name"], "Rent");
    assert_eq!(parsed["expenses"][0]["kind"], "fixed");
    assert_eq!(parsed["categories"].as_array().unwrap().len(), 1);

    let backup: Backup = serde_json::from_str(&contents).unwrap();
    assert_eq!(backup.shifts.len(), 1);
    assert_eq!(backup.expenses[0].amount, 250.0);
}

#[test]
fn export_backup_csv_writes_one_file_per_sheet() {
    let conn = seeded_conn();
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("sheets");
    let out_str = out_dir.to_string_lossy().to_string();

    run_export(
        &conn,
        &[
            "--from", "2025-03-01", "--to", "2025-04-30", "--format", "csv", "--out", &out_str,
        ],
    )
    .unwrap();

    for name in ["summary.csv", "days.csv", "expenses.csv", "categories.csv"] {
        assert!(out_dir.join(name).exists(), "missing {}", name);
    }
    let mut rdr = csv::Reader::from_path(out_dir.join("days.csv")).unwrap();
    let dates: Vec<String> = rdr
        .records()
        .map(|r| r.unwrap().get(0).unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2025-03-03", "2025-04-01"]);

    let summary = std::fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    assert!(summary.contains("profit,755"));
}

#[test]
fn csv_sheets_keep_headers_for_an_empty_range() {
    let conn = seeded_conn();
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("empty");
    let out_str = out_dir.to_string_lossy().to_string();

    run_export(
        &conn,
        &[
            "--from", "2025-05-01", "--to", "2025-05-31", "--format", "csv", "--out", &out_str,
        ],
    )
    .unwrap();

    let days = std::fs::read_to_string(out_dir.join("days.csv")).unwrap();
    assert_eq!(
        days,
        "date,status,note,income,variable_expense,fixed_expense,expense_total,profit\n"
    );
    let expenses = std::fs::read_to_string(out_dir.join("expenses.csv")).unwrap();
    assert_eq!(expenses, "date,kind,category,amount,note,created_at\n");
}

#[test]
fn export_backup_rejects_unknown_format() {
    let conn = seeded_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("backup.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let err = run_export(&conn, &["--format", "xml", "--out", &out_str]).unwrap_err();
    assert!(err.to_string().contains("Unknown format: xml"));
    assert!(!out_path.exists());
}

#[test]
fn export_backup_requires_both_range_bounds() {
    let conn = seeded_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("backup.json");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(run_export(
        &conn,
        &["--from", "2025-03-01", "--format", "json", "--out", &out_str]
    )
    .is_err());
    assert!(!out_path.exists());
}
