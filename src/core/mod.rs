mod coerce;
mod engine;
mod series;
mod types;

pub use coerce::{
    MAX_YEARS, MIN_YEARS, RawValue, coerce_years, contribution_interest_factor, to_finite,
    to_percent,
};
pub(crate) use engine::round_cents;
pub use engine::{project_resolved, run_projection};
pub use series::{Metric, Series, SeriesPoint, UnknownMetric, parse_metric_list, select_series};
pub use types::{ProjectionParams, ResolvedParams, YearRow};
