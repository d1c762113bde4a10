//! Whole-unit money formatting for display.
//!
//! Each currency is printed the way its home locale writes it. No conversion
//! happens here; the code only picks a symbol and separators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const NBSP: char = '\u{a0}';

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Chf,
    Cad,
    Aud,
    Inr,
    Rub,
    Cny,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown currency `{0}`")]
pub struct UnknownCurrency(pub String);

#[derive(Copy, Clone, Debug)]
enum Grouping {
    Thousands(char),
    /// Lakh/crore: the last three digits, then pairs.
    Indian(char),
}

#[derive(Copy, Clone, Debug)]
enum SymbolPlacement {
    Prefix,
    PrefixSpaced,
    SuffixSpaced,
}

impl Currency {
    pub const ALL: [Currency; 10] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Chf,
        Currency::Cad,
        Currency::Aud,
        Currency::Inr,
        Currency::Rub,
        Currency::Cny,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Chf => "CHF",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Inr => "INR",
            Currency::Rub => "RUB",
            Currency::Cny => "CNY",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
            Currency::Chf => "CHF",
            Currency::Cad => "CA$",
            Currency::Aud => "A$",
            Currency::Inr => "₹",
            Currency::Rub => "₽",
            Currency::Cny => "CN¥",
        }
    }

    fn grouping(self) -> Grouping {
        match self {
            Currency::Eur => Grouping::Thousands('.'),
            Currency::Chf => Grouping::Thousands('\u{2019}'),
            Currency::Rub => Grouping::Thousands(NBSP),
            Currency::Inr => Grouping::Indian(','),
            _ => Grouping::Thousands(','),
        }
    }

    fn placement(self) -> SymbolPlacement {
        match self {
            Currency::Eur | Currency::Rub => SymbolPlacement::SuffixSpaced,
            Currency::Chf => SymbolPlacement::PrefixSpaced,
            _ => SymbolPlacement::Prefix,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

/// Formats `value` in whole units of `currency`, rounding half away from zero.
///
/// Non-finite input prints as zero.
pub fn format_money(value: f64, currency: Currency) -> String {
    let rounded = if value.is_finite() { value.round() } else { 0.0 };
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_digits(&digits, currency.grouping());

    let body = match currency.placement() {
        SymbolPlacement::Prefix => format!("{}{grouped}", currency.symbol()),
        SymbolPlacement::PrefixSpaced => format!("{}{NBSP}{grouped}", currency.symbol()),
        SymbolPlacement::SuffixSpaced => format!("{grouped}{NBSP}{}", currency.symbol()),
    };
    if negative { format!("-{body}") } else { body }
}

fn group_digits(digits: &str, grouping: Grouping) -> String {
    let (separator, first, rest) = match grouping {
        Grouping::Thousands(sep) => (sep, 3, 3),
        Grouping::Indian(sep) => (sep, 3, 2),
    };

    let chars: Vec<char> = digits.chars().collect();
    if chars.len() <= first {
        return digits.to_string();
    }

    let head_len = chars.len() - first;
    let mut groups: Vec<String> = Vec::new();
    let mut end = head_len;
    while end > 0 {
        let start = end.saturating_sub(rest);
        groups.push(chars[start..end].iter().collect());
        end = start;
    }
    groups.reverse();
    groups.push(chars[head_len..].iter().collect());
    groups.join(&separator.to_string())
}
