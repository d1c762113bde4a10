use std::net::IpAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ServerConfig;
use crate::core::{ProjectionParams, RawValue, YearRow, run_projection};
use crate::report::{Currency, ReportError, format_money, rows_to_csv, summarize};

#[derive(Parser, Debug)]
#[command(
    name = "capital-projection",
    about = "Year-by-year capital projection from income, expenses, growth and returns"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Log filter directive, e.g. info or capital_projection=debug"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculator page and JSON API
    Serve(ServeArgs),
    /// Print a projection to stdout
    Project(ProjectArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address, defaults to 0.0.0.0")]
    pub host: Option<IpAddr>,
    #[arg(long, help = "Port, defaults to 8080")]
    pub port: Option<u16>,
    #[arg(long, help = "Default display currency code, e.g. USD")]
    pub currency: Option<Currency>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

// Parameter flags are kept as text so they go through the same coercion as
// web input: `--years abc` projects one year instead of failing to parse.
#[derive(Args, Debug, Default)]
pub struct ProjectArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub starting_capital: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub income_monthly: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub expenses_monthly: Option<String>,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Annual income growth in percent, e.g. 3"
    )]
    pub income_growth_pct: Option<String>,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Annual return in percent, e.g. 7"
    )]
    pub return_pct: Option<String>,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Annual expense inflation in percent, e.g. 2.5"
    )]
    pub inflation_pct: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Horizon in years, 1 to 60")]
    pub years: Option<String>,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Share of the return credited on the year's contribution; 1 when omitted"
    )]
    pub contribution_interest_factor: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    #[arg(long, help = "Display currency code for the table, e.g. EUR")]
    pub currency: Option<Currency>,
}

impl ServeArgs {
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(currency) = self.currency {
            config.default_currency = currency;
        }
    }
}

impl ProjectArgs {
    pub fn params(&self) -> ProjectionParams {
        let raw = |flag: &Option<String>| flag.clone().map(RawValue::Text);
        ProjectionParams {
            starting_capital: raw(&self.starting_capital),
            income_monthly: raw(&self.income_monthly),
            expenses_monthly: raw(&self.expenses_monthly),
            income_growth_pct: raw(&self.income_growth_pct),
            return_pct: raw(&self.return_pct),
            inflation_pct: raw(&self.inflation_pct),
            years: raw(&self.years),
            contribution_interest_factor: raw(&self.contribution_interest_factor),
        }
    }
}

/// Runs the projection described by `args` and renders it in the requested format.
pub fn render_projection(
    args: &ProjectArgs,
    default_currency: Currency,
) -> Result<String, ReportError> {
    let rows = run_projection(&args.params());
    let currency = args.currency.unwrap_or(default_currency);

    match args.format {
        OutputFormat::Table => Ok(render_table(&rows, currency)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => rows_to_csv(&rows),
    }
}

fn render_table(rows: &[YearRow], currency: Currency) -> String {
    const HEADERS: [&str; 9] = [
        "Year",
        "Income/mo",
        "Expenses/mo",
        "Delta/mo",
        "Contribution",
        "Capital start",
        "Interest start",
        "Interest contrib",
        "Capital end",
    ];

    let body: Vec<[String; 9]> = rows
        .iter()
        .map(|row| {
            [
                row.year.to_string(),
                format_money(row.income_monthly, currency),
                format_money(row.expenses_monthly, currency),
                format_money(row.delta_monthly, currency),
                format_money(row.contribution, currency),
                format_money(row.capital_start, currency),
                format_money(row.interest_on_start, currency),
                format_money(row.interest_on_contribution, currency),
                format_money(row.capital_end, currency),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells = HEADERS.map(str::to_string);
    push_table_line(&mut out, &header_cells, &widths);
    for cells in &body {
        push_table_line(&mut out, cells, &widths);
    }

    let summary = summarize(rows, currency);
    out.push_str(&format!(
        "\nFinal capital after {} year(s): {}",
        summary.years, summary.final_capital_display
    ));
    out
}

fn push_table_line(out: &mut String, cells: &[String; 9], widths: &[usize; 9]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{cell}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
