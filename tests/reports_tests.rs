// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use tillbook::aggregate::MarginBucket;
use tillbook::calendar::BusinessCalendar;
use tillbook::commands::{doctor, reports};
use tillbook::models::{ExpenseKind, ShiftLabel};
use tillbook::store::{self, ExpenseInput, ShiftInput};
use tillbook::{cli, config, db};

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn income(conn: &Connection, date: &str, shift: ShiftLabel, amount: f64) {
    store::upsert_shift(
        conn,
        d(date),
        &ShiftInput {
            shift,
            income: amount,
            note: None,
            closed: true,
        },
        &BusinessCalendar::default(),
    )
    .unwrap();
}

fn spend(conn: &Connection, date: &str, kind: ExpenseKind, name: &str, amount: f64) {
    let cat = match store::find_category(conn, kind, name) {
        Ok(c) => c.id,
        Err(_) => store::add_category(conn, kind, name).unwrap(),
    };
    store::add_expense(
        conn,
        d(date),
        &ExpenseInput {
            kind,
            category_id: cat,
            amount,
            note: String::new(),
        },
        &BusinessCalendar::default(),
    )
    .unwrap();
}

#[test]
fn compare_defaults_to_the_previous_period() {
    let conn = base_conn();
    income(&conn, "2025-02-20", ShiftLabel::Morning, 500.0);
    income(&conn, "2025-02-18", ShiftLabel::Morning, 9999.0);
    income(&conn, "2025-03-03", ShiftLabel::Morning, 600.0);
    income(&conn, "2025-03-03", ShiftLabel::Afternoon, 400.0);

    let r = reports::compare_report(&conn, d("2025-03-01"), d("2025-03-10"), None).unwrap();
    assert_eq!(r.comparison.from, d("2025-02-19"));
    assert_eq!(r.comparison.to, d("2025-02-28"));
    assert_eq!(r.primary.totals.income, 1000.0);
    assert_eq!(r.comparison.totals.income, 500.0);
    assert_eq!(r.deltas.income.delta, 500.0);
    assert_eq!(r.deltas.income.delta_pct, Some(100.0));
    assert_eq!(r.deltas.expense.delta_pct, None);

    let custom = reports::compare_report(
        &conn,
        d("2025-03-01"),
        d("2025-03-10"),
        Some((d("2025-02-28"), d("2025-02-01"))),
    )
    .unwrap();
    assert_eq!(custom.comparison.from, d("2025-02-01"));
    assert_eq!(custom.comparison.totals.income, 10_499.0);
}

#[test]
fn summary_report_ranks_days_and_raises_alerts() {
    let conn = base_conn();
    income(&conn, "2025-03-03", ShiftLabel::Morning, 1000.0);
    spend(&conn, "2025-03-03", ExpenseKind::Variable, "Stock", 600.0);
    income(&conn, "2025-03-04", ShiftLabel::Morning, 800.0);
    income(&conn, "2025-03-05", ShiftLabel::Morning, 300.0);
    spend(&conn, "2025-03-05", ExpenseKind::Fixed, "Rent", 400.0);

    let r = reports::summary_report(&conn, d("2025-03-03"), d("2025-03-08"), 2).unwrap();
    let s = &r.summary;
    assert_eq!(s.totals.income, 2100.0);
    assert_eq!(s.totals.expense, 1000.0);
    assert_eq!(s.totals.profit, 1100.0);
    assert_eq!(s.margin_bucket, Some(MarginBucket::Good));
    assert_eq!(s.days_with_data, 3);
    assert_eq!(s.missing_days, vec![d("2025-03-06"), d("2025-03-07"), d("2025-03-08")]);
    assert_eq!(r.best.iter().map(|p| p.date).collect::<Vec<_>>(), vec![d("2025-03-04"), d("2025-03-03")]);
    assert_eq!(r.worst[0].date, d("2025-03-05"));
    assert!(r.alerts.is_empty());

    config::set(&conn, config::ALERT_THRESHOLD, "500").unwrap();
    let r = reports::summary_report(&conn, d("2025-03-03"), d("2025-03-08"), 2).unwrap();
    assert_eq!(r.alerts.len(), 1);
    assert_eq!(r.alerts[0].date, d("2025-03-03"));
    assert_eq!(r.alerts[0].detail, "Stock: $ 600");
}

#[test]
fn periods_report_averages_weeks_with_data() {
    let conn = base_conn();
    income(&conn, "2025-03-03", ShiftLabel::Morning, 100.0);
    income(&conn, "2025-03-17", ShiftLabel::Morning, 300.0);

    let r = reports::periods_report(&conn, d("2025-03-03"), d("2025-03-30")).unwrap();
    assert_eq!(r.weekly.len(), 2);
    assert_eq!(r.weekly_average.income, 200.0);
    assert_eq!(r.monthly.len(), 1);
    assert_eq!(r.monthly[0].label, "2025-03");
    assert_eq!(r.monthly_average.income, 400.0);
}

#[test]
fn categories_report_follows_the_configured_calendar() {
    let conn = base_conn();
    spend(&conn, "2025-03-01", ExpenseKind::Variable, "Stock", 70.0);
    spend(&conn, "2025-03-03", ExpenseKind::Variable, "Stock", 30.0);
    spend(&conn, "2025-03-03", ExpenseKind::Fixed, "Rent", 50.0);

    let all = reports::categories_report(&conn, d("2025-03-01"), d("2025-03-31")).unwrap();
    assert_eq!(all[0].name, "Stock");
    assert_eq!(all[0].total, 100.0);

    config::set(&conn, config::EXCLUDED_WEEKDAYS, "sat,sun").unwrap();
    let weekdays = reports::categories_report(&conn, d("2025-03-01"), d("2025-03-31")).unwrap();
    assert_eq!(weekdays[0].name, "Rent");
    assert_eq!(weekdays[1].total, 30.0);

    // the Saturday record now sits on a closed weekday
    let issues = doctor::find_issues(&conn).unwrap();
    assert_eq!(issues, vec![vec!["day_on_closed_weekday".to_string(), "2025-03-01".to_string()]]);
}

#[test]
fn category_trend_report_reads_the_store() {
    let conn = base_conn();
    spend(&conn, "2025-02-03", ExpenseKind::Fixed, "Rent", 100.0);
    spend(&conn, "2025-03-03", ExpenseKind::Variable, "Stock", 40.0);
    spend(&conn, "2025-03-04", ExpenseKind::Variable, "Stock", 60.0);

    let trend = reports::category_trend_report(&conn, d("2025-02-01"), d("2025-03-31")).unwrap();
    assert_eq!(trend.months, vec!["2025-02", "2025-03"]);
    assert_eq!(trend.series[0].name, "Rent");
    assert_eq!(trend.series[0].totals, vec![100.0, 0.0]);
    assert_eq!(trend.series[1].totals, vec![0.0, 100.0]);

    let matches = cli::build_cli().get_matches_from([
        "tillbook", "report", "categories", "--from", "2025-02-01", "--to", "2025-03-31",
        "--trend",
    ]);
    if let Some(("report", report_m)) = matches.subcommand() {
        reports::handle(&conn, report_m).unwrap();
    } else {
        panic!("no report subcommand");
    }
}

#[test]
fn alert_detail_follows_currency_setting() {
    let conn = base_conn();
    income(&conn, "2025-03-03", ShiftLabel::Morning, 10.0);
    spend(&conn, "2025-03-03", ExpenseKind::Fixed, "Rent", 900.0);
    config::set(&conn, config::ALERT_THRESHOLD, "500").unwrap();
    config::set(&conn, config::CURRENCY_SYMBOL, "ARS").unwrap();

    let r = reports::summary_report(&conn, d("2025-03-03"), d("2025-03-03"), 1).unwrap();
    assert_eq!(r.alerts[0].detail, "Rent: ARS 900");
}

#[test]
fn report_commands_accept_reversed_ranges() {
    let conn = base_conn();
    income(&conn, "2025-03-03", ShiftLabel::Morning, 100.0);

    for name in ["summary", "series", "periods", "compare", "categories"] {
        let matches = cli::build_cli().get_matches_from([
            "tillbook",
            "report",
            name,
            "--from",
            "2025-03-31",
            "--to",
            "2025-03-01",
            "--json",
        ]);
        if let Some(("report", report_m)) = matches.subcommand() {
            reports::handle(&conn, report_m).unwrap();
        } else {
            panic!("no report subcommand");
        }
    }
}

#[test]
fn half_open_custom_comparison_is_an_error() {
    let conn = base_conn();
    let matches = cli::build_cli().get_matches_from([
        "tillbook",
        "report",
        "compare",
        "--cfrom",
        "2025-02-01",
    ]);
    if let Some(("report", report_m)) = matches.subcommand() {
        assert!(reports::handle(&conn, report_m).is_err());
    } else {
        panic!("no report subcommand");
    }
}
