//! CFOP (fiscal operation code) extraction.

use super::patterns::CFOP_EXACT;
use super::CellRule;
use crate::sheet::Grid;

/// Maximum number of digits kept from the CFOP cell.
pub const CFOP_DIGITS: usize = 4;

/// Keeps the digits of a CFOP cell, truncated to four ("5.1102" -> "5110").
#[derive(Debug, Clone, Copy, Default)]
pub struct CfopExtractor;

impl CfopExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl CellRule for CfopExtractor {
    type Output = Option<String>;

    fn read(&self, text: &str) -> Option<String> {
        let digits: String = text
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(CFOP_DIGITS)
            .collect();

        if digits.is_empty() { None } else { Some(digits) }
    }
}

/// First cell in `columns` of `row` whose trimmed text is exactly four digits.
pub fn find_cfop_in_columns(
    grid: &Grid,
    row: usize,
    columns: std::ops::Range<usize>,
) -> Option<String> {
    columns
        .filter_map(|col| grid.cell(row, col))
        .map(str::trim)
        .find(|text| CFOP_EXACT.is_match(text))
        .map(str::to_string)
}
