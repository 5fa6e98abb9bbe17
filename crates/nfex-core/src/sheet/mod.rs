//! Worksheet grid and the spreadsheet adapters around the extractor.

mod reader;
mod writer;

pub use reader::WorkbookReader;
pub use writer::{default_output_path, XlsxExporter};

use std::path::Path;

use crate::error::{ExportError, GridError};
use crate::extract::Extraction;

/// Immutable 2-D array of optional text cells, addressed by (row, column).
///
/// An absent cell (`None`) is distinct from a cell holding empty text.
/// Addresses outside the grid read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Option<String>>>,
    columns: usize,
}

impl Grid {
    /// Build a grid from rows of optional cells. Ragged rows are allowed.
    pub fn from_rows<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.map(Into::into)).collect())
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, columns }
    }

    /// Text of the cell at `(row, col)`, or `None` when absent.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Source of a grid, typically the first worksheet of a workbook file.
pub trait GridSource {
    /// Read the file at `path` into a grid of raw text cells.
    fn read_grid(&self, path: &Path) -> Result<Grid, GridError>;
}

/// Destination for an assembled extraction.
pub trait ExportSink {
    /// Write the records and their aggregate to `path`.
    fn export(&self, extraction: &Extraction, path: &Path) -> Result<(), ExportError>;
}
