//! Presentation of projection rows: CSV export, money formatting, summary figures.

mod currency;
mod export;

use serde::Serialize;
use thiserror::Error;

use crate::core::{YearRow, round_cents};

pub use currency::{Currency, UnknownCurrency, format_money};
pub use export::{CSV_HEADER, csv_filename, rows_to_csv};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Headline figures shown above the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub years: usize,
    pub final_capital: f64,
    pub final_capital_display: String,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub peak_capital: f64,
}

pub fn summarize(rows: &[YearRow], currency: Currency) -> ProjectionSummary {
    let final_capital = rows.last().map_or(0.0, |row| row.capital_end);
    let total_contributions = rows.iter().map(|row| row.contribution).sum::<f64>();
    let total_interest = rows
        .iter()
        .map(|row| row.interest_on_start + row.interest_on_contribution)
        .sum::<f64>();
    let peak_capital = rows.iter().map(|row| row.capital_end).fold(0.0, f64::max);

    ProjectionSummary {
        years: rows.len(),
        final_capital,
        final_capital_display: format_money(final_capital, currency),
        total_contributions: round_cents(total_contributions),
        total_interest: round_cents(total_interest),
        peak_capital,
    }
}
