//! Workbook input using calamine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{debug, info};

use super::{Grid, GridSource};
use crate::error::GridError;
use crate::models::config::LocaleConfig;

/// Extensions calamine can open.
const SUPPORTED_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Reads the first worksheet of a workbook as raw text cells.
///
/// No header interpretation is done: every cell is read as text, and empty
/// or error cells become absent. Fractional numbers are written with the
/// locale's decimal separator so they read back like typed amounts.
#[derive(Debug, Clone, Copy)]
pub struct WorkbookReader {
    decimal_separator: char,
}

impl Default for WorkbookReader {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookReader {
    /// Reader for pt-BR reports.
    pub fn new() -> Self {
        Self::from_locale(&LocaleConfig::default())
    }

    pub fn from_locale(locale: &LocaleConfig) -> Self {
        Self {
            decimal_separator: locale.decimal_separator,
        }
    }

    /// Whether `path` has an extension this reader accepts.
    pub fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl GridSource for WorkbookReader {
    fn read_grid(&self, path: &Path) -> Result<Grid, GridError> {
        if !path.exists() {
            return Err(GridError::NotFound(path.display().to_string()));
        }

        if !Self::supports(path) {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            return Err(GridError::UnsupportedFormat(ext.to_string()));
        }

        let mut workbook =
            open_workbook_auto(path).map_err(|e| GridError::Open(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(GridError::NoWorksheet)?
            .map_err(|e| GridError::Worksheet(e.to_string()))?;

        let grid = range_to_grid(&range, self.decimal_separator);
        info!(
            "Read {} rows x {} columns from {}",
            grid.row_count(),
            grid.column_count(),
            path.display()
        );

        Ok(grid)
    }
}

/// Convert a calamine range into a grid in absolute sheet coordinates.
///
/// calamine trims leading empty rows and columns from the used range, so
/// they are padded back in.
pub(crate) fn range_to_grid(range: &Range<Data>, decimal_separator: char) -> Grid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    if row_offset > 0 || col_offset > 0 {
        debug!("Used range starts at ({}, {})", row_offset, col_offset);
    }

    let mut rows: Vec<Vec<Option<String>>> = Vec::with_capacity(row_offset + range.height());
    rows.extend(std::iter::repeat_with(Vec::new).take(row_offset));

    for row in range.rows() {
        let mut cells = vec![None; col_offset];
        cells.extend(row.iter().map(|cell| cell_text(cell, decimal_separator)));
        rows.push(cells);
    }

    Grid::from_rows(rows)
}

/// Text form of a single cell.
fn cell_text(cell: &Data, decimal_separator: char) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Float(n) => {
            // Integral floats print without decimals ("22", not "22.0")
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(n.to_string().replace('.', &decimal_separator.to_string()))
            }
        }
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
    }
}
