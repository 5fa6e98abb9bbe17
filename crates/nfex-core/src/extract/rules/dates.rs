//! Issue date parsing.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_YMD};
use super::CellRule;

/// Issue date rule. Any time of day after the first space is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl CellRule for DateExtractor {
    type Output = Option<NaiveDate>;

    fn read(&self, text: &str) -> Option<NaiveDate> {
        parse_issue_date(text)
    }
}

/// Parse "2025-12-17", "17/12/2025", "17-12-2025" or "17.12.2025",
/// each optionally followed by a space and a time.
pub fn parse_issue_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.trim().split(' ').next()?;

    if let Some(caps) = DATE_YMD.captures(date_part) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_DMY.captures(date_part) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}
