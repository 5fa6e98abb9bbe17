//! Cell-level rules for NF-e report fields.

pub mod amounts;
pub mod cfop;
pub mod dates;
pub mod patterns;
pub mod rows;

pub use amounts::{format_amount, format_currency, parse_amount, AmountParser, ParseStrategy};
pub use cfop::{find_cfop_in_columns, CfopExtractor};
pub use dates::{parse_issue_date, DateExtractor};
pub use rows::{
    AnchorRule, is_block_terminator, is_digit_text, is_header_row, is_item_row, is_sub_header_label,
    is_sub_header_row, operation_label,
};

/// Trait for rules that read one typed field out of a cell's text.
pub trait CellRule {
    /// The type of value this rule produces.
    type Output;

    /// Read the field from the cell text.
    fn read(&self, text: &str) -> Self::Output;
}
