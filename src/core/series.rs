use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::types::YearRow;

/// A numeric column of [`YearRow`] that can be plotted against `year`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    IncomeMonthly,
    ExpensesMonthly,
    DeltaMonthly,
    Contribution,
    CapitalStart,
    InterestOnStart,
    InterestOnContribution,
    CapitalEnd,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown metric `{0}`")]
pub struct UnknownMetric(pub String);

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::IncomeMonthly,
        Metric::ExpensesMonthly,
        Metric::DeltaMonthly,
        Metric::Contribution,
        Metric::CapitalStart,
        Metric::InterestOnStart,
        Metric::InterestOnContribution,
        Metric::CapitalEnd,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::IncomeMonthly => "incomeMonthly",
            Metric::ExpensesMonthly => "expensesMonthly",
            Metric::DeltaMonthly => "deltaMonthly",
            Metric::Contribution => "contribution",
            Metric::CapitalStart => "capitalStart",
            Metric::InterestOnStart => "interestOnStart",
            Metric::InterestOnContribution => "interestOnContribution",
            Metric::CapitalEnd => "capitalEnd",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::IncomeMonthly => "Monthly income",
            Metric::ExpensesMonthly => "Monthly expenses",
            Metric::DeltaMonthly => "Monthly surplus",
            Metric::Contribution => "Annual contribution",
            Metric::CapitalStart => "Capital at start of year",
            Metric::InterestOnStart => "Interest on capital",
            Metric::InterestOnContribution => "Interest on contribution",
            Metric::CapitalEnd => "Capital at end of year",
        }
    }

    pub fn value(self, row: &YearRow) -> f64 {
        match self {
            Metric::IncomeMonthly => row.income_monthly,
            Metric::ExpensesMonthly => row.expenses_monthly,
            Metric::DeltaMonthly => row.delta_monthly,
            Metric::Contribution => row.contribution,
            Metric::CapitalStart => row.capital_start,
            Metric::InterestOnStart => row.interest_on_start,
            Metric::InterestOnContribution => row.interest_on_contribution,
            Metric::CapitalEnd => row.capital_end,
        }
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    /// Accepts `capitalEnd`, `capital-end` and `capital_end` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Metric::ALL
            .into_iter()
            .find(|metric| metric.key().to_ascii_lowercase() == normalized)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Parses a comma separated metric list. An empty list selects `capitalEnd`.
pub fn parse_metric_list(list: &str) -> Result<Vec<Metric>, UnknownMetric> {
    let mut metrics = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let metric = part.parse::<Metric>()?;
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    if metrics.is_empty() {
        metrics.push(Metric::CapitalEnd);
    }
    Ok(metrics)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub metric: Metric,
    pub label: &'static str,
    pub points: Vec<SeriesPoint>,
}

pub fn select_series(rows: &[YearRow], metrics: &[Metric]) -> Vec<Series> {
    metrics
        .iter()
        .map(|&metric| Series {
            metric,
            label: metric.label(),
            points: rows
                .iter()
                .map(|row| SeriesPoint {
                    year: row.year,
                    value: metric.value(row),
                })
                .collect(),
        })
        .collect()
}
