//! Common regex patterns for NF-e report cells.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Dates as exported by the report or by a spreadsheet date cell
    pub static ref DATE_YMD: Regex = Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})$"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{1,2})[./\-](\d{1,2})[./\-](\d{4})$"
    ).unwrap();

    // A bare 4-digit CFOP cell (fallback column search)
    pub static ref CFOP_EXACT: Regex = Regex::new(
        r"^\d{4}$"
    ).unwrap();
}
