// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Day, week, month and period rollups over stored daily records.
//!
//! Everything here is a pure function of the records handed in. The record
//! store decides what to load; this module decides how it adds up.

use crate::calendar::BusinessCalendar;
use crate::models::{DailyRecord, ExpenseKind};
use crate::utils::fmt_money_with;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const HIGH_EXPENSE_THRESHOLD: f64 = 500_000.0;
pub const TREND_CATEGORIES: usize = 6;
const ALERT_DETAIL_LINES: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DayTotals {
    pub income: f64,
    pub variable_expense: f64,
    pub fixed_expense: f64,
    pub expense_total: f64,
    pub profit: f64,
}

/// Totals for a single day.
///
/// Expense entries win outright: as soon as a day has one categorized
/// expense, the legacy per-shift totals from bulk imports are ignored for
/// that day, even when nonzero. Days imported from old spreadsheets depend on
/// this, so the two sources are never blended.
pub fn day_totals(rec: &DailyRecord) -> DayTotals {
    let income: f64 = rec.shifts.iter().map(|s| s.income).sum();

    let (variable_expense, fixed_expense) = if rec.expenses.is_empty() {
        (
            rec.shifts.iter().map(|s| s.legacy_variable_expense).sum(),
            rec.shifts.iter().map(|s| s.legacy_fixed_expense).sum(),
        )
    } else {
        let sum_kind = |kind: ExpenseKind| -> f64 {
            rec.expenses
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| e.amount)
                .sum()
        };
        (sum_kind(ExpenseKind::Variable), sum_kind(ExpenseKind::Fixed))
    };

    let expense_total = variable_expense + fixed_expense;
    DayTotals {
        income,
        variable_expense,
        fixed_expense,
        expense_total,
        profit: income - expense_total,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: DayTotals,
}

/// Stored business days inside `[from, to]`, sorted by date.
pub fn days_in_range<'a>(
    records: &'a [DailyRecord],
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
) -> Vec<&'a DailyRecord> {
    let mut days: Vec<&DailyRecord> = records
        .iter()
        .filter(|r| r.date >= from && r.date <= to && cal.is_business_day(r.date))
        .collect();
    days.sort_by_key(|r| r.date);
    days
}

/// One point per stored business day; days without a record are absent,
/// so `len()` is "days with data", not "days in range".
pub fn range_series(
    records: &[DailyRecord],
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
) -> Vec<SeriesPoint> {
    days_in_range(records, from, to, cal)
        .into_iter()
        .map(|r| SeriesPoint {
            date: r.date,
            totals: day_totals(r),
        })
        .collect()
}

pub fn missing_days(
    series: &[SeriesPoint],
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
) -> Vec<NaiveDate> {
    cal.business_days(from, to)
        .filter(|d| !series.iter().any(|p| p.date == *d))
        .collect()
}

pub fn margin_pct(profit: f64, income: f64) -> Option<f64> {
    if income == 0.0 {
        None
    } else {
        Some(profit / income * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarginBucket {
    Poor,
    Fair,
    Good,
}

impl MarginBucket {
    pub fn from_margin(margin: f64) -> MarginBucket {
        if margin <= 20.0 {
            MarginBucket::Poor
        } else if margin <= 30.0 {
            MarginBucket::Fair
        } else {
            MarginBucket::Good
        }
    }

    pub fn classify(margin: Option<f64>) -> Option<MarginBucket> {
        margin.map(MarginBucket::from_margin)
    }

    pub fn label(bucket: Option<MarginBucket>) -> &'static str {
        match bucket {
            Some(MarginBucket::Poor) => "Poor",
            Some(MarginBucket::Fair) => "Fair",
            Some(MarginBucket::Good) => "Good",
            None => "—",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
}

pub fn period_totals(series: &[SeriesPoint]) -> PeriodTotals {
    let income: f64 = series.iter().map(|p| p.totals.income).sum();
    let expense: f64 = series.iter().map(|p| p.totals.expense_total).sum();
    PeriodTotals {
        income,
        expense,
        profit: income - expense,
    }
}

pub fn worst_days(series: &[SeriesPoint], n: usize) -> Vec<SeriesPoint> {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.totals.profit.total_cmp(&b.totals.profit));
    sorted.truncate(n);
    sorted
}

pub fn best_days(series: &[SeriesPoint], n: usize) -> Vec<SeriesPoint> {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| b.totals.profit.total_cmp(&a.totals.profit));
    sorted.truncate(n);
    sorted
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rollup {
    pub label: String,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
}

fn rollup_by<K: Ord>(
    series: &[SeriesPoint],
    key: impl Fn(NaiveDate) -> K,
    label: impl Fn(&K) -> String,
) -> Vec<Rollup> {
    let mut buckets: BTreeMap<K, (f64, f64)> = BTreeMap::new();
    for p in series {
        let entry = buckets.entry(key(p.date)).or_insert((0.0, 0.0));
        entry.0 += p.totals.income;
        entry.1 += p.totals.expense_total;
    }
    buckets
        .iter()
        .map(|(k, (income, expense))| Rollup {
            label: label(k),
            income: *income,
            expense: *expense,
            profit: income - expense,
        })
        .collect()
}

/// ISO-week buckets labelled `YYYY-Www`.
pub fn weekly_rollup(series: &[SeriesPoint]) -> Vec<Rollup> {
    rollup_by(
        series,
        |d| {
            let w = d.iso_week();
            (w.year(), w.week())
        },
        |&(y, w): &(i32, u32)| format!("{}-W{:02}", y, w),
    )
}

pub fn monthly_rollup(series: &[SeriesPoint]) -> Vec<Rollup> {
    rollup_by(
        series,
        |d| (d.year(), d.month()),
        |&(y, m): &(i32, u32)| format!("{}-{:02}", y, m),
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RollupAverage {
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
}

/// Averages over buckets that actually hold data; a week with no records
/// is not a zero week, it is no week at all.
pub fn rollup_average(rows: &[Rollup]) -> RollupAverage {
    if rows.is_empty() {
        return RollupAverage::default();
    }
    let n = rows.len() as f64;
    RollupAverage {
        income: rows.iter().map(|r| r.income).sum::<f64>() / n,
        expense: rows.iter().map(|r| r.expense).sum::<f64>() / n,
        profit: rows.iter().map(|r| r.profit).sum::<f64>() / n,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub primary: f64,
    pub comparison: f64,
    pub delta: f64,
    pub delta_pct: Option<f64>,
}

impl Delta {
    pub fn between(primary: f64, comparison: f64) -> Delta {
        let delta = primary - comparison;
        Delta {
            primary,
            comparison,
            delta,
            delta_pct: if comparison == 0.0 {
                None
            } else {
                Some(delta / comparison * 100.0)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub income: Delta,
    pub expense: Delta,
    pub profit: Delta,
}

pub fn compare_periods(primary: &PeriodTotals, comparison: &PeriodTotals) -> PeriodComparison {
    PeriodComparison {
        income: Delta::between(primary.income, comparison.income),
        expense: Delta::between(primary.expense, comparison.expense),
        profit: Delta::between(primary.profit, comparison.profit),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub kind: ExpenseKind,
    pub name: String,
    pub total: f64,
    pub entries: usize,
}

/// Categorized spend over the range, largest first. Legacy shift totals carry
/// no category and never show up here.
pub fn category_ranking(
    records: &[DailyRecord],
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
) -> Vec<CategoryTotal> {
    let mut sums: HashMap<(ExpenseKind, String), (f64, usize)> = HashMap::new();
    for rec in days_in_range(records, from, to, cal) {
        for e in &rec.expenses {
            let entry = sums
                .entry((e.kind, e.category_name.clone()))
                .or_insert((0.0, 0));
            entry.0 += e.amount;
            entry.1 += 1;
        }
    }
    let mut rows: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|((kind, name), (total, entries))| CategoryTotal {
            kind,
            name,
            total,
            entries,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub kind: ExpenseKind,
    pub name: String,
    pub totals: Vec<f64>,
}

/// Month-by-month spend of the largest categories. `series[i].totals[j]` is
/// the spend of category `i` in `months[j]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTrend {
    pub months: Vec<String>,
    pub series: Vec<CategorySeries>,
}

/// Splits the `top` largest categories of the range by `YYYY-MM`. Months
/// where none of them has entries are left out; a category with no entries
/// in a listed month gets 0 there.
pub fn category_trend(
    records: &[DailyRecord],
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
    top: usize,
) -> CategoryTrend {
    let leaders: Vec<(ExpenseKind, String)> = category_ranking(records, from, to, cal)
        .into_iter()
        .take(top)
        .map(|c| (c.kind, c.name))
        .collect();

    let mut by_month: BTreeMap<(i32, u32), HashMap<(ExpenseKind, &str), f64>> = BTreeMap::new();
    for rec in days_in_range(records, from, to, cal) {
        for e in &rec.expenses {
            if !leaders
                .iter()
                .any(|(k, n)| *k == e.kind && *n == e.category_name)
            {
                continue;
            }
            *by_month
                .entry((rec.date.year(), rec.date.month()))
                .or_default()
                .entry((e.kind, e.category_name.as_str()))
                .or_insert(0.0) += e.amount;
        }
    }

    let months = by_month
        .keys()
        .map(|(y, m)| format!("{}-{:02}", y, m))
        .collect();
    let series = leaders
        .iter()
        .map(|(kind, name)| CategorySeries {
            kind: *kind,
            name: name.clone(),
            totals: by_month
                .values()
                .map(|sums| sums.get(&(*kind, name.as_str())).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();
    CategoryTrend { months, series }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseAlert {
    pub date: NaiveDate,
    pub expense_total: f64,
    pub detail: String,
}

pub fn high_expense_alerts(
    records: &[DailyRecord],
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
    threshold: f64,
    symbol: &str,
) -> Vec<ExpenseAlert> {
    days_in_range(records, from, to, cal)
        .into_iter()
        .filter_map(|rec| {
            let totals = day_totals(rec);
            (totals.expense_total > threshold).then(|| ExpenseAlert {
                date: rec.date,
                expense_total: totals.expense_total,
                detail: alert_detail(rec, symbol),
            })
        })
        .collect()
}

fn alert_detail(rec: &DailyRecord, symbol: &str) -> String {
    let parts: Vec<String> = if rec.expenses.is_empty() {
        let mut parts = Vec::new();
        let note = rec.note.trim();
        if !note.is_empty() {
            parts.push(note.to_string());
        }
        for s in &rec.shifts {
            let n = s.note.trim();
            if !n.is_empty() {
                parts.push(format!("{}: {}", s.shift, n));
            }
        }
        parts
    } else {
        let mut lines: Vec<_> = rec.expenses.iter().collect();
        lines.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        lines
            .into_iter()
            .take(ALERT_DETAIL_LINES)
            .map(|e| format!("{}: {}", e.category_name, fmt_money_with(e.amount, symbol)))
            .collect()
    };
    let detail = parts.join(" | ");
    if detail.trim().is_empty() {
        "No details recorded.".to_string()
    } else {
        detail
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub totals: PeriodTotals,
    pub margin_pct: Option<f64>,
    pub margin_bucket: Option<MarginBucket>,
    pub days_with_data: usize,
    pub avg_daily_income: f64,
    pub missing_days: Vec<NaiveDate>,
}

pub fn summarize(
    series: &[SeriesPoint],
    from: NaiveDate,
    to: NaiveDate,
    cal: &BusinessCalendar,
) -> Summary {
    let totals = period_totals(series);
    let margin = margin_pct(totals.profit, totals.income);
    let avg_daily_income = if series.is_empty() {
        0.0
    } else {
        totals.income / series.len() as f64
    };
    Summary {
        from,
        to,
        totals,
        margin_pct: margin,
        margin_bucket: MarginBucket::classify(margin),
        days_with_data: series.len(),
        avg_daily_income,
        missing_days: missing_days(series, from, to, cal),
    }
}
