//! Core library for NF-e report conversion.
//!
//! This crate provides:
//! - Spreadsheet input through calamine (xlsx, xls, xlsb, ods)
//! - Row classification and line-item extraction from NF-e report exports
//! - pt-BR amount, date and CFOP parsing
//! - Formatted xlsx output through rust_xlsxwriter

pub mod error;
pub mod extract;
pub mod models;
pub mod sheet;

pub use error::{ExportError, GridError, NfexError, Result};
pub use extract::{Assembly, Extraction, NfeExtractor, RecordAssembler, RowScanner, ScanState, ScanStats};
pub use models::config::{ExportConfig, ExtractionConfig, LocaleConfig, NfexConfig};
pub use models::record::{Amount, InvoiceHeader, LineItemRecord, RECORD_COLUMNS};
pub use sheet::{default_output_path, ExportSink, Grid, GridSource, WorkbookReader, XlsxExporter};
