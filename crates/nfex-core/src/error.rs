//! Error types for the nfex-core library.

use thiserror::Error;

/// Main error type for the nfex library.
#[derive(Error, Debug)]
pub enum NfexError {
    /// Input workbook could not be turned into a grid.
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// Output workbook could not be written.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while reading a source workbook into a grid.
///
/// These are document-level failures; the row scanner itself never fails.
#[derive(Error, Debug)]
pub enum GridError {
    /// The input file does not exist.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The file extension is not a spreadsheet format we can read.
    #[error("unsupported format: {0} (expected .xlsx, .xlsm, .xls, .xlsb or .ods)")]
    UnsupportedFormat(String),

    /// Failed to open/parse the workbook.
    #[error("failed to open workbook: {0}")]
    Open(String),

    /// The workbook has no worksheets.
    #[error("workbook has no worksheets")]
    NoWorksheet,

    /// The first worksheet could not be read.
    #[error("failed to read worksheet: {0}")]
    Worksheet(String),
}

/// Errors raised while writing the formatted output workbook.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The xlsx writer rejected a cell, format or table.
    #[error("xlsx writer: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Nothing to write: the extraction produced no records.
    #[error("no records to export")]
    Empty,
}

/// Result type for the nfex library.
pub type Result<T> = std::result::Result<T, NfexError>;
