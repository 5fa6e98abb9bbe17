//! Row classification predicates.
//!
//! Each function looks at a single row of the grid and nothing else, so the
//! positional assumptions of the report layout can be tested one by one.

use crate::extract::layout;
use crate::sheet::Grid;

/// Labels of the product table's own header row, compared case-insensitively.
pub const SUB_HEADER_LABELS: [&str; 3] = ["desc prod", "descrição", "produto"];

/// How the anchor cell confirms a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRule {
    /// Any value in the anchor cell.
    Present,
    /// The anchor cell must contain this decimal separator.
    Decimal(char),
}

impl AnchorRule {
    pub fn accepts(self, anchor: Option<&str>) -> bool {
        match (self, anchor) {
            (_, None) => false,
            (AnchorRule::Present, Some(_)) => true,
            (AnchorRule::Decimal(sep), Some(text)) => text.contains(sep),
        }
    }
}

/// Non-empty text made only of ASCII digits, ignoring surrounding whitespace.
pub fn is_digit_text(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

/// Column 0 holds an invoice number and the anchor cell confirms it.
pub fn is_header_row(grid: &Grid, row: usize, anchor: AnchorRule) -> bool {
    is_block_terminator(grid, row) && anchor.accepts(grid.cell(row, layout::ANCHOR))
}

/// Column 0 holds only digits, so an item block cannot continue here.
pub fn is_block_terminator(grid: &Grid, row: usize) -> bool {
    grid.cell(row, layout::INVOICE_NUMBER).is_some_and(is_digit_text)
}

/// Absent, blank, or one of [`SUB_HEADER_LABELS`].
pub fn is_sub_header_label(text: Option<&str>) -> bool {
    match text {
        None => true,
        Some(text) => {
            let label = text.trim().to_lowercase();
            label.is_empty() || SUB_HEADER_LABELS.contains(&label.as_str())
        }
    }
}

pub fn is_sub_header_row(grid: &Grid, row: usize) -> bool {
    is_sub_header_label(grid.cell(row, layout::DESCRIPTION))
}

/// The description cell looks like a product.
pub fn is_item_row(grid: &Grid, row: usize) -> bool {
    let Some(text) = grid.cell(row, layout::DESCRIPTION) else {
        return false;
    };
    let description = text.trim();

    !is_sub_header_label(Some(description))
        && !description.starts_with(['-', '–', '—'])
        && description.chars().count() > 1
}

/// Label part of an operation type cell ("1 - Saída" -> "Saída"). Only the
/// second " - " segment is kept when there are more.
pub fn operation_label(text: &str) -> String {
    match text.split(" - ").nth(1) {
        Some(label) => label.trim().to_string(),
        None => text.trim().to_string(),
    }
}
