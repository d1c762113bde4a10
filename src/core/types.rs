use serde::{Deserialize, Serialize};

use super::coerce::{
    RawValue, coerce_years, contribution_interest_factor, to_finite, to_percent,
};

/// Calculator inputs exactly as the user supplied them.
///
/// Any field may be missing or hold garbage; [`ProjectionParams::resolve`]
/// turns the record into finite values without failing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionParams {
    pub starting_capital: Option<RawValue>,
    pub income_monthly: Option<RawValue>,
    pub expenses_monthly: Option<RawValue>,
    pub income_growth_pct: Option<RawValue>,
    pub return_pct: Option<RawValue>,
    pub inflation_pct: Option<RawValue>,
    pub years: Option<RawValue>,
    pub contribution_interest_factor: Option<RawValue>,
}

/// Sanitized inputs. Rates are fractions, not percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub starting_capital: f64,
    pub income_monthly: f64,
    pub expenses_monthly: f64,
    pub income_growth_rate: f64,
    pub return_rate: f64,
    pub inflation_rate: f64,
    pub years: u32,
    pub contribution_interest_factor: f64,
}

impl ProjectionParams {
    pub fn resolve(&self) -> ResolvedParams {
        ResolvedParams {
            starting_capital: to_finite(self.starting_capital.as_ref(), 0.0),
            income_monthly: to_finite(self.income_monthly.as_ref(), 0.0),
            expenses_monthly: to_finite(self.expenses_monthly.as_ref(), 0.0),
            income_growth_rate: to_percent(self.income_growth_pct.as_ref()),
            return_rate: to_percent(self.return_pct.as_ref()),
            inflation_rate: to_percent(self.inflation_pct.as_ref()),
            years: coerce_years(self.years.as_ref()),
            contribution_interest_factor: contribution_interest_factor(
                self.contribution_interest_factor.as_ref(),
            ),
        }
    }
}

/// One simulated year. Every amount is rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub year: u32,
    pub income_monthly: f64,
    pub expenses_monthly: f64,
    pub delta_monthly: f64,
    pub contribution: f64,
    pub capital_start: f64,
    pub interest_on_start: f64,
    pub interest_on_contribution: f64,
    pub capital_end: f64,
}
