// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{
    self, CategoryTotal, CategoryTrend, ExpenseAlert, MarginBucket, PeriodComparison, PeriodTotals, Rollup,
    RollupAverage, SeriesPoint, Summary,
};
use crate::calendar::{ordered, previous_period};
use crate::config::{self, Settings};
use crate::store;
use crate::utils::{fmt_money_with, fmt_pct, maybe_print_json, parse_date, pretty_table, range_args};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("series", sub)) => series(conn, sub)?,
        Some(("periods", sub)) => periods(conn, sub)?,
        Some(("compare", sub)) => compare(conn, sub)?,
        Some(("categories", sub)) => categories(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn load_series(
    conn: &Connection,
    settings: &Settings,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<SeriesPoint>> {
    let records = store::load_days(conn, from, to)?;
    Ok(aggregate::range_series(&records, from, to, &settings.calendar))
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    #[serde(flatten)]
    pub summary: Summary,
    pub best: Vec<SeriesPoint>,
    pub worst: Vec<SeriesPoint>,
    pub alerts: Vec<ExpenseAlert>,
}

pub fn summary_report(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
    top: usize,
) -> Result<SummaryReport> {
    let settings = config::load(conn)?;
    let cal = &settings.calendar;
    let records = store::load_days(conn, from, to)?;
    let series = aggregate::range_series(&records, from, to, cal);
    Ok(SummaryReport {
        summary: aggregate::summarize(&series, from, to, cal),
        best: aggregate::best_days(&series, top),
        worst: aggregate::worst_days(&series, top),
        alerts: aggregate::high_expense_alerts(
            &records,
            from,
            to,
            cal,
            settings.alert_threshold,
            &settings.currency_symbol,
        ),
    })
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (from, to) = range_args(sub, "from", "to", today())?;
    let top = *sub.get_one::<usize>("top").unwrap_or(&3);
    let report = summary_report(conn, from, to, top)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let sym = config::load(conn)?.currency_symbol;
    let money = |v: f64| fmt_money_with(v, &sym);
    let s = &report.summary;

    println!("{} to {}", s.from, s.to);
    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Profit", "Margin", "Rating", "Days", "Avg/day"],
            vec![vec![
                money(s.totals.income),
                money(s.totals.expense),
                money(s.totals.profit),
                s.margin_pct
                    .map(|m| format!("{:.1}%", m))
                    .unwrap_or_else(|| "—".into()),
                MarginBucket::label(s.margin_bucket).to_string(),
                s.days_with_data.to_string(),
                money(s.avg_daily_income),
            ]],
        )
    );

    let rank_rows = |items: &[SeriesPoint]| -> Vec<Vec<String>> {
        items
            .iter()
            .map(|p| {
                vec![
                    p.date.to_string(),
                    money(p.totals.income),
                    money(p.totals.profit),
                ]
            })
            .collect()
    };
    println!("Best days");
    println!("{}", pretty_table(&["Date", "Income", "Profit"], rank_rows(&report.best)));
    println!("Worst days");
    println!("{}", pretty_table(&["Date", "Income", "Profit"], rank_rows(&report.worst)));

    if report.alerts.is_empty() {
        println!("No days with expenses above the alert threshold.");
    } else {
        let rows = report
            .alerts
            .iter()
            .map(|a| vec![a.date.to_string(), money(a.expense_total), a.detail.clone()])
            .collect();
        println!("{}", pretty_table(&["Date", "Expenses", "Detail"], rows));
    }

    if s.missing_days.is_empty() {
        println!("No missing days.");
    } else {
        let days: Vec<String> = s.missing_days.iter().map(|d| d.to_string()).collect();
        println!("Missing days: {}", days.join(", "));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SeriesRow {
    #[serde(flatten)]
    pub point: SeriesPoint,
    pub margin_pct: Option<f64>,
    pub margin_bucket: Option<MarginBucket>,
}

fn series(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = config::load(conn)?;
    let (from, to) = range_args(sub, "from", "to", today())?;
    let data: Vec<SeriesRow> = load_series(conn, &settings, from, to)?
        .into_iter()
        .map(|point| {
            let margin = aggregate::margin_pct(point.totals.profit, point.totals.income);
            SeriesRow {
                point,
                margin_pct: margin,
                margin_bucket: MarginBucket::classify(margin),
            }
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let money = |v: f64| fmt_money_with(v, &settings.currency_symbol);
        let rows = data
            .iter()
            .map(|r| {
                let t = &r.point.totals;
                vec![
                    r.point.date.to_string(),
                    money(t.income),
                    money(t.variable_expense),
                    money(t.fixed_expense),
                    money(t.expense_total),
                    money(t.profit),
                    MarginBucket::label(r.margin_bucket).to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Income", "Variable", "Fixed", "Expenses", "Profit", "Margin"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PeriodsReport {
    pub weekly: Vec<Rollup>,
    pub weekly_average: RollupAverage,
    pub monthly: Vec<Rollup>,
    pub monthly_average: RollupAverage,
}

pub fn periods_report(conn: &Connection, from: NaiveDate, to: NaiveDate) -> Result<PeriodsReport> {
    let settings = config::load(conn)?;
    let series = load_series(conn, &settings, from, to)?;
    let weekly = aggregate::weekly_rollup(&series);
    let monthly = aggregate::monthly_rollup(&series);
    Ok(PeriodsReport {
        weekly_average: aggregate::rollup_average(&weekly),
        monthly_average: aggregate::rollup_average(&monthly),
        weekly,
        monthly,
    })
}

fn periods(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (from, to) = range_args(sub, "from", "to", today())?;
    let report = periods_report(conn, from, to)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let sym = config::load(conn)?.currency_symbol;
    let money = |v: f64| fmt_money_with(v, &sym);
    let table = |rows: &[Rollup], avg: &RollupAverage, head: &str| {
        let mut data: Vec<Vec<String>> = rows
            .iter()
            .map(|r| vec![r.label.clone(), money(r.income), money(r.expense), money(r.profit)])
            .collect();
        data.push(vec![
            "Average".into(),
            money(avg.income),
            money(avg.expense),
            money(avg.profit),
        ]);
        pretty_table(&[head, "Income", "Expenses", "Profit"], data)
    };
    println!("{}", table(&report.weekly, &report.weekly_average, "Week"));
    println!("{}", table(&report.monthly, &report.monthly_average, "Month"));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PeriodSide {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub totals: PeriodTotals,
}

#[derive(Debug, Serialize)]
pub struct CompareReport {
    pub primary: PeriodSide,
    pub comparison: PeriodSide,
    pub deltas: PeriodComparison,
}

/// Compares `[from, to]` against `custom` or, when absent, the equally long
/// period right before it.
pub fn compare_report(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
    custom: Option<(NaiveDate, NaiveDate)>,
) -> Result<CompareReport> {
    let settings = config::load(conn)?;
    let (cfrom, cto) = match custom {
        Some((a, b)) => ordered(a, b),
        None => previous_period(from, to),
    };
    let primary = aggregate::period_totals(&load_series(conn, &settings, from, to)?);
    let comparison = aggregate::period_totals(&load_series(conn, &settings, cfrom, cto)?);
    Ok(CompareReport {
        deltas: aggregate::compare_periods(&primary, &comparison),
        primary: PeriodSide {
            from,
            to,
            totals: primary,
        },
        comparison: PeriodSide {
            from: cfrom,
            to: cto,
            totals: comparison,
        },
    })
}

fn compare(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (from, to) = range_args(sub, "from", "to", today())?;
    let custom = match (sub.get_one::<String>("cfrom"), sub.get_one::<String>("cto")) {
        (Some(a), Some(b)) => Some((parse_date(a)?, parse_date(b)?)),
        (None, None) => None,
        _ => return Err(anyhow!("Both --cfrom and --cto are required for a custom comparison")),
    };
    let report = compare_report(conn, from, to, custom)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let sym = config::load(conn)?.currency_symbol;
    let money = |v: f64| fmt_money_with(v, &sym);
    println!(
        "{} to {} vs {} to {}",
        report.primary.from, report.primary.to, report.comparison.from, report.comparison.to
    );
    let d = &report.deltas;
    let rows = [("Income", &d.income), ("Expenses", &d.expense), ("Profit", &d.profit)]
        .iter()
        .map(|(name, delta)| {
            vec![
                name.to_string(),
                money(delta.primary),
                money(delta.comparison),
                money(delta.delta),
                fmt_pct(delta.delta_pct),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["", "Period", "Compared", "Delta", "Delta %"], rows)
    );
    Ok(())
}

pub fn categories_report(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<CategoryTotal>> {
    let settings = config::load(conn)?;
    store::category_totals(conn, from, to, &settings.calendar)
}

pub fn category_trend_report(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<CategoryTrend> {
    let settings = config::load(conn)?;
    let records = store::load_days(conn, from, to)?;
    Ok(aggregate::category_trend(
        &records,
        from,
        to,
        &settings.calendar,
        aggregate::TREND_CATEGORIES,
    ))
}

fn category_trend(
    conn: &Connection,
    sub: &clap::ArgMatches,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<()> {
    let trend = category_trend_report(conn, from, to)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &trend)? {
        return Ok(());
    }
    let sym = config::load(conn)?.currency_symbol;
    let mut headers = vec!["Category"];
    headers.extend(trend.months.iter().map(String::as_str));
    let rows = trend
        .series
        .iter()
        .map(|s| {
            let mut row = vec![format!("{} ({})", s.name, s.kind)];
            row.extend(s.totals.iter().map(|v| fmt_money_with(*v, &sym)));
            row
        })
        .collect();
    println!("{}", pretty_table(&headers, rows));
    Ok(())
}

fn categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (from, to) = range_args(sub, "from", "to", today())?;
    if sub.get_flag("trend") {
        return category_trend(conn, sub, from, to);
    }
    let data = categories_report(conn, from, to)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let sym = config::load(conn)?.currency_symbol;
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.kind.to_string(),
                    c.name.clone(),
                    c.entries.to_string(),
                    fmt_money_with(c.total, &sym),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Kind", "Category", "Entries", "Total"], rows)
        );
    }
    Ok(())
}
