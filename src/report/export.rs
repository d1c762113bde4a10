use crate::core::YearRow;

use super::ReportError;

/// Column order of the exported file; matches the field order of [`YearRow`].
pub const CSV_HEADER: [&str; 9] = [
    "year",
    "incomeMonthly",
    "expensesMonthly",
    "deltaMonthly",
    "contribution",
    "capitalStart",
    "interestOnStart",
    "interestOnContribution",
    "capitalEnd",
];

/// Renders rows as a header line plus one line per year, joined by `\n`.
///
/// Numbers use their shortest exact decimal text, so `0` and `20498.1`
/// appear as written rather than as `0.0`.
pub fn rows_to_csv(rows: &[YearRow]) -> Result<String, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record(csv_fields(row))?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8(bytes)?)
}

fn csv_fields(row: &YearRow) -> [String; 9] {
    [
        row.year.to_string(),
        row.income_monthly.to_string(),
        row.expenses_monthly.to_string(),
        row.delta_monthly.to_string(),
        row.contribution.to_string(),
        row.capital_start.to_string(),
        row.interest_on_start.to_string(),
        row.interest_on_contribution.to_string(),
        row.capital_end.to_string(),
    ]
}

/// Download name for an export covering `rows`.
pub fn csv_filename(rows: &[YearRow]) -> String {
    format!("capital-projection-{}y.csv", rows.len())
}
