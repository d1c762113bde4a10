use super::coerce::{MAX_YEARS, MIN_YEARS};
use super::types::{ProjectionParams, ResolvedParams, YearRow};

const MONTHS_PER_YEAR: f64 = 12.0;

// Beyond this magnitude an f64 has no cent resolution left to round.
const UNROUNDED_MAGNITUDE: f64 = 1e15;

#[derive(Debug, Clone, Copy)]
struct RunningState {
    capital_start: f64,
    income_monthly: f64,
    expenses_monthly: f64,
}

impl RunningState {
    fn initial(params: &ResolvedParams) -> Self {
        Self {
            capital_start: params.starting_capital,
            income_monthly: params.income_monthly,
            expenses_monthly: params.expenses_monthly,
        }
    }

    /// Simulates `year` and returns the row plus the state carried into the next year.
    fn step(self, year: u32, params: &ResolvedParams) -> (Self, YearRow) {
        let delta_monthly = self.income_monthly - self.expenses_monthly;
        let contribution = delta_monthly * MONTHS_PER_YEAR;
        let interest_on_start = self.capital_start * params.return_rate;
        let interest_on_contribution =
            contribution * params.return_rate * params.contribution_interest_factor;
        let capital_end_raw =
            self.capital_start + contribution + interest_on_start + interest_on_contribution;
        // A deficit is written off, not carried as debt. `max` also maps NaN to 0.
        let capital_end = capital_end_raw.max(0.0);

        let row = YearRow {
            year,
            income_monthly: round_cents(self.income_monthly),
            expenses_monthly: round_cents(self.expenses_monthly),
            delta_monthly: round_cents(delta_monthly),
            contribution: round_cents(contribution),
            capital_start: round_cents(self.capital_start),
            interest_on_start: round_cents(interest_on_start),
            interest_on_contribution: round_cents(interest_on_contribution),
            capital_end: round_cents(capital_end),
        };

        let next = Self {
            capital_start: row.capital_end,
            income_monthly: self.income_monthly * (1.0 + params.income_growth_rate),
            expenses_monthly: self.expenses_monthly * (1.0 + params.inflation_rate),
        };

        (next, row)
    }
}

/// Runs the yearly capital projection for raw user input.
///
/// Total over its input: any record, including an empty one, yields between
/// 1 and 60 rows with finite values.
pub fn run_projection(params: &ProjectionParams) -> Vec<YearRow> {
    project_resolved(&params.resolve())
}

/// Runs the projection for already sanitized parameters.
pub fn project_resolved(params: &ResolvedParams) -> Vec<YearRow> {
    let years = params.years.clamp(MIN_YEARS, MAX_YEARS);
    (1..=years)
        .scan(RunningState::initial(params), |state, year| {
            let (next, row) = state.step(year, params);
            *state = next;
            Some(row)
        })
        .collect()
}

/// Rounds half-up to two decimals.
///
/// `f64::EPSILON` is added first so values such as `1.005`, stored slightly
/// below the midpoint, still round up. Infinite values saturate and NaN
/// becomes 0 so rows stay finite.
pub(crate) fn round_cents(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if value.is_infinite() {
        return f64::MAX.copysign(value);
    }
    if value.abs() >= UNROUNDED_MAGNITUDE {
        return value;
    }
    ((value + f64::EPSILON) * 100.0 + 0.5).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawValue;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, prop_oneof, proptest, Just, Strategy};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn num(value: f64) -> Option<RawValue> {
        Some(RawValue::Number(value))
    }

    fn text(value: &str) -> Option<RawValue> {
        Some(RawValue::from(value))
    }

    fn sample_params() -> ProjectionParams {
        ProjectionParams {
            starting_capital: num(0.0),
            income_monthly: num(5589.0),
            expenses_monthly: num(4000.0),
            income_growth_pct: num(10.0),
            return_pct: num(15.0),
            inflation_pct: num(5.0),
            years: num(1.0),
            contribution_interest_factor: num(0.5),
        }
    }

    fn assert_row_invariants(rows: &[YearRow]) {
        assert!(!rows.is_empty());
        for (idx, row) in rows.iter().enumerate() {
            assert_eq!(row.year as usize, idx + 1);
            assert!(row.capital_end >= 0.0, "negative capital in {row:?}");
            for value in [
                row.income_monthly,
                row.expenses_monthly,
                row.delta_monthly,
                row.contribution,
                row.capital_start,
                row.interest_on_start,
                row.interest_on_contribution,
                row.capital_end,
            ] {
                assert!(value.is_finite(), "non-finite field in {row:?}");
            }
        }
        for pair in rows.windows(2) {
            assert_eq!(pair[1].capital_start, pair[0].capital_end);
        }
    }

    #[test]
    fn one_year_with_half_contribution_interest_matches_hand_calculation() {
        let rows = run_projection(&sample_params());
        assert_eq!(rows.len(), 1);

        let row = rows[0];
        assert_eq!(row.year, 1);
        assert_approx(row.delta_monthly, 1589.0);
        assert_approx(row.contribution, 19_068.0);
        assert_approx(row.interest_on_start, 0.0);
        // 19068 * 0.15 * 0.5
        assert_approx(row.interest_on_contribution, 1430.10);
        assert_approx(row.capital_end, 20_498.10);
    }

    #[test]
    fn withdrawals_larger_than_capital_floor_at_zero() {
        let params = ProjectionParams {
            starting_capital: num(5000.0),
            income_monthly: num(1000.0),
            expenses_monthly: num(2000.0),
            return_pct: num(10.0),
            years: num(1.0),
            contribution_interest_factor: num(0.5),
            ..ProjectionParams::default()
        };
        let rows = run_projection(&params);

        assert_eq!(rows.len(), 1);
        assert_approx(rows[0].contribution, -12_000.0);
        assert_approx(rows[0].interest_on_start, 500.0);
        assert_approx(rows[0].interest_on_contribution, -600.0);
        assert_eq!(rows[0].capital_end, 0.0);
    }

    #[test]
    fn deficit_is_not_carried_into_following_years() {
        let params = ProjectionParams {
            starting_capital: num(1000.0),
            income_monthly: num(0.0),
            expenses_monthly: num(500.0),
            income_growth_pct: num(0.0),
            inflation_pct: num(10.0),
            years: num(3.0),
            ..ProjectionParams::default()
        };
        let rows = run_projection(&params);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].capital_end, 0.0);
        assert_eq!(rows[1].capital_start, 0.0);
        assert_eq!(rows[1].capital_end, 0.0);
        // Expenses keep inflating while capital sits at the floor.
        assert_approx(rows[1].expenses_monthly, 550.0);
        assert_approx(rows[2].expenses_monthly, 605.0);
    }

    #[test]
    fn growth_and_inflation_apply_from_the_second_year() {
        let mut params = sample_params();
        params.years = num(2.0);
        params.return_pct = num(0.0);
        let rows = run_projection(&params);

        assert_eq!(rows.len(), 2);
        assert_approx(rows[0].income_monthly, 5589.0);
        assert_approx(rows[0].expenses_monthly, 4000.0);
        assert_approx(rows[1].income_monthly, 6147.9);
        assert_approx(rows[1].expenses_monthly, 4200.0);
        assert_approx(rows[1].delta_monthly, 1947.9);
        assert_approx(rows[1].contribution, 23_374.8);
        assert_approx(rows[1].capital_start, 19_068.0);
        assert_approx(rows[1].capital_end, 42_442.8);
    }

    #[test]
    fn fully_malformed_input_yields_one_finite_row() {
        let params = ProjectionParams {
            starting_capital: Some(RawValue::Null),
            income_monthly: text(""),
            expenses_monthly: num(f64::NAN),
            income_growth_pct: text("lots"),
            return_pct: None,
            inflation_pct: Some(RawValue::Other(serde_json::json!([1, 2]))),
            years: text(""),
            contribution_interest_factor: num(f64::NAN),
        };
        let rows = run_projection(&params);

        assert_eq!(rows.len(), 1);
        assert_row_invariants(&rows);
        assert_eq!(rows[0].capital_end, 0.0);
    }

    #[test]
    fn empty_params_yield_one_zero_row() {
        let rows = run_projection(&ProjectionParams::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 1);
        assert_eq!(rows[0].capital_end, 0.0);
    }

    #[test]
    fn zero_factor_credits_no_interest_on_contribution() {
        let params = ProjectionParams {
            income_monthly: num(2000.0),
            expenses_monthly: num(1000.0),
            return_pct: num(10.0),
            years: num(1.0),
            contribution_interest_factor: num(0.0),
            ..ProjectionParams::default()
        };
        let rows = run_projection(&params);

        assert_eq!(rows[0].interest_on_contribution, 0.0);
        assert_approx(rows[0].capital_end, 12_000.0);
    }

    #[test]
    fn omitted_factor_behaves_like_full_credit() {
        let mut omitted = sample_params();
        omitted.contribution_interest_factor = None;
        let mut explicit = sample_params();
        explicit.contribution_interest_factor = num(1.0);

        assert_eq!(run_projection(&omitted), run_projection(&explicit));
        assert_approx(run_projection(&omitted)[0].interest_on_contribution, 2860.2);
    }

    #[test]
    fn nan_factor_behaves_like_zero_not_like_omitted() {
        let mut nan = sample_params();
        nan.contribution_interest_factor = num(f64::NAN);
        let mut zero = sample_params();
        zero.contribution_interest_factor = num(0.0);
        let mut omitted = sample_params();
        omitted.contribution_interest_factor = None;

        assert_eq!(run_projection(&nan), run_projection(&zero));
        assert_ne!(run_projection(&nan), run_projection(&omitted));
    }

    #[test]
    fn years_outside_range_are_clamped() {
        let mut params = sample_params();
        params.years = num(0.0);
        assert_eq!(run_projection(&params).len(), 1);
        params.years = num(-10.0);
        assert_eq!(run_projection(&params).len(), 1);
        params.years = num(250.0);
        assert_eq!(run_projection(&params).len(), 60);
        params.years = text("12.9");
        assert_eq!(run_projection(&params).len(), 12);
    }

    #[test]
    fn project_resolved_clamps_years_constructed_out_of_range() {
        let mut resolved = sample_params().resolve();
        resolved.years = 0;
        assert_eq!(project_resolved(&resolved).len(), 1);
        resolved.years = 500;
        assert_eq!(project_resolved(&resolved).len(), 60);
    }

    #[test]
    fn extreme_magnitudes_stay_finite() {
        let params = ProjectionParams {
            starting_capital: num(f64::MAX),
            income_monthly: num(f64::MAX),
            expenses_monthly: num(-f64::MAX),
            income_growth_pct: num(1e6),
            return_pct: num(1e6),
            inflation_pct: num(1e6),
            years: num(60.0),
            contribution_interest_factor: num(1e300),
        };
        let rows = run_projection(&params);
        assert_eq!(rows.len(), 60);
        assert_row_invariants(&rows);
    }

    #[test]
    fn round_cents_rounds_half_up() {
        assert_eq!(round_cents(1.005), 1.01);
        assert_eq!(round_cents(2.675), 2.68);
        assert_eq!(round_cents(1430.1), 1430.1);
        assert_eq!(round_cents(0.004), 0.0);
        assert_eq!(round_cents(-1.234), -1.23);
        assert_eq!(round_cents(-0.0), 0.0);
    }

    #[test]
    fn round_cents_keeps_results_finite() {
        assert_eq!(round_cents(f64::NAN), 0.0);
        assert_eq!(round_cents(f64::INFINITY), f64::MAX);
        assert_eq!(round_cents(f64::NEG_INFINITY), -f64::MAX);
        assert_eq!(round_cents(1e20), 1e20);
    }

    #[test]
    fn reruns_are_identical() {
        let mut params = sample_params();
        params.years = num(40.0);
        params.starting_capital = text("25000");
        let first = run_projection(&params);
        let second = run_projection(&params.clone());
        assert_eq!(first, second);
    }

    fn raw_value_strategy() -> impl Strategy<Value = Option<RawValue>> {
        prop_oneof![
            Just(None),
            Just(Some(RawValue::Null)),
            Just(Some(RawValue::Text(String::new()))),
            any::<bool>().prop_map(|b| Some(RawValue::Bool(b))),
            any::<f64>().prop_map(|v| Some(RawValue::Number(v))),
            (-1.0e7f64..1.0e7).prop_map(|v| Some(RawValue::Number(v))),
            (-1.0e7f64..1.0e7).prop_map(|v| Some(RawValue::Text(v.to_string()))),
            "[a-z0-9.,-]{0,8}".prop_map(|s| Some(RawValue::Text(s))),
        ]
    }

    fn params_strategy() -> impl Strategy<Value = ProjectionParams> {
        (
            raw_value_strategy(),
            raw_value_strategy(),
            raw_value_strategy(),
            raw_value_strategy(),
            raw_value_strategy(),
            raw_value_strategy(),
            raw_value_strategy(),
            raw_value_strategy(),
        )
            .prop_map(
                |(
                    starting_capital,
                    income_monthly,
                    expenses_monthly,
                    income_growth_pct,
                    return_pct,
                    inflation_pct,
                    years,
                    contribution_interest_factor,
                )| ProjectionParams {
                    starting_capital,
                    income_monthly,
                    expenses_monthly,
                    income_growth_pct,
                    return_pct,
                    inflation_pct,
                    years,
                    contribution_interest_factor,
                },
            )
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_any_input_yields_well_formed_rows(params in params_strategy()) {
            let rows = run_projection(&params);
            let expected_len = params.resolve().years as usize;

            prop_assert_eq!(rows.len(), expected_len);
            prop_assert!((1..=60).contains(&rows.len()));
            for (idx, row) in rows.iter().enumerate() {
                prop_assert_eq!(row.year as usize, idx + 1);
                prop_assert!(row.capital_end >= 0.0);
                prop_assert!(row.income_monthly.is_finite());
                prop_assert!(row.expenses_monthly.is_finite());
                prop_assert!(row.delta_monthly.is_finite());
                prop_assert!(row.contribution.is_finite());
                prop_assert!(row.capital_start.is_finite());
                prop_assert!(row.interest_on_start.is_finite());
                prop_assert!(row.interest_on_contribution.is_finite());
                prop_assert!(row.capital_end.is_finite());
            }
            for pair in rows.windows(2) {
                prop_assert_eq!(pair[1].capital_start, pair[0].capital_end);
            }
        }

        #[test]
        fn prop_length_matches_floored_and_clamped_years(years in -100.0f64..200.0) {
            let params = ProjectionParams {
                years: Some(RawValue::Number(years)),
                ..ProjectionParams::default()
            };
            let expected = years.floor().clamp(1.0, 60.0) as usize;
            prop_assert_eq!(run_projection(&params).len(), expected);
        }

        #[test]
        fn prop_projection_is_deterministic(params in params_strategy()) {
            prop_assert_eq!(run_projection(&params), run_projection(&params.clone()));
        }
    }
}
