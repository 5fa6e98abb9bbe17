//! Locale amount parsing and formatting ("45.000,00" <-> 45000.00).

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::CellRule;
use crate::models::config::LocaleConfig;
use crate::models::record::Amount;

/// One way of normalizing locale text into a decimal literal.
///
/// Every strategy is total: it returns `None` instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Drop every thousands separator, then turn the decimal separator into `.`.
    StripGrouping,
    /// Only turn the decimal separator into `.`.
    DecimalOnly,
}

impl ParseStrategy {
    /// Strategies in the order they are tried; the first success wins.
    pub const ORDER: [ParseStrategy; 2] = [ParseStrategy::StripGrouping, ParseStrategy::DecimalOnly];

    /// Apply the strategy to already-trimmed text.
    pub fn apply(self, text: &str, locale: &LocaleConfig) -> Option<Decimal> {
        let to_point = |c: char| if c == locale.decimal_separator { '.' } else { c };

        let normalized: String = match self {
            ParseStrategy::StripGrouping => text
                .chars()
                .filter(|c| *c != locale.thousands_separator)
                .map(to_point)
                .collect(),
            ParseStrategy::DecimalOnly => text.chars().map(to_point).collect(),
        };

        Decimal::from_str(&normalized).ok()
    }
}

/// Amount rule for one locale.
#[derive(Debug, Clone, Default)]
pub struct AmountParser {
    locale: LocaleConfig,
}

impl AmountParser {
    pub fn new(locale: LocaleConfig) -> Self {
        Self { locale }
    }
}

impl CellRule for AmountParser {
    type Output = Amount;

    fn read(&self, text: &str) -> Amount {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Amount::Unparseable(text.to_string());
        }

        ParseStrategy::ORDER
            .iter()
            .find_map(|strategy| strategy.apply(trimmed, &self.locale))
            .map(|value| Amount::Value(round_cents(value)))
            .unwrap_or_else(|| Amount::Unparseable(text.to_string()))
    }
}

/// Parse a locale-formatted amount (e.g. "1.200,00").
pub fn parse_amount(text: &str, locale: &LocaleConfig) -> Amount {
    AmountParser::new(locale.clone()).read(text)
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with grouping and two decimals (1234567.5 -> "1.234.567,50").
pub fn format_amount(amount: Decimal, locale: &LocaleConfig) -> String {
    let rounded = round_cents(amount);
    let s = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(locale.thousands_separator);
        }
        formatted.push(*c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}{}{}", sign, formatted, locale.decimal_separator, decimal_part)
}

/// Format an amount with the locale currency symbol ("R$ 1.234,56").
pub fn format_currency(amount: Decimal, locale: &LocaleConfig) -> String {
    format!("{} {}", locale.currency_symbol, format_amount(amount, locale))
}
