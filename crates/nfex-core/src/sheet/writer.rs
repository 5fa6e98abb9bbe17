//! Formatted report output using rust_xlsxwriter.

use std::path::{Path, PathBuf};

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{
    ColNum, ExcelDateTime, Format, RowNum, Table, TableColumn, TableStyle, Workbook, Worksheet,
};
use tracing::{debug, info, warn};

use super::ExportSink;
use crate::error::ExportError;
use crate::extract::rules::format_currency;
use crate::extract::Extraction;
use crate::models::config::{ExportConfig, LocaleConfig};
use crate::models::record::{Amount, LineItemRecord, RECORD_COLUMNS, VALUE_COLUMN};

/// Largest integer an Excel number cell holds exactly (2^53).
const MAX_EXACT_NUMBER: u64 = 1 << 53;

/// Writes one worksheet: optional title band, column header row, one row
/// per record.
#[derive(Debug, Clone, Default)]
pub struct XlsxExporter {
    config: ExportConfig,
    locale: LocaleConfig,
}

impl XlsxExporter {
    pub fn new(config: ExportConfig, locale: LocaleConfig) -> Self {
        Self { config, locale }
    }

    /// Sheet row of the column header row (0-based).
    pub fn header_row(&self) -> RowNum {
        [&self.config.title, &self.config.subtitle]
            .iter()
            .filter(|line| line.is_some())
            .count() as RowNum
    }

    /// Build the workbook in memory.
    pub fn build_workbook(&self, extraction: &Extraction) -> Result<Workbook, ExportError> {
        if extraction.is_empty() {
            return Err(ExportError::Empty);
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.config.sheet_name)?;
        self.write_sheet(worksheet, extraction)?;

        Ok(workbook)
    }

    /// Serialize the workbook to xlsx bytes.
    pub fn to_buffer(&self, extraction: &Extraction) -> Result<Vec<u8>, ExportError> {
        let mut workbook = self.build_workbook(extraction)?;
        Ok(workbook.save_to_buffer()?)
    }

    fn write_sheet(&self, worksheet: &mut Worksheet, extraction: &Extraction) -> Result<(), ExportError> {
        let bold = Format::new().set_bold();
        let currency = Format::new().set_num_format(&self.config.currency_format);
        let date = Format::new().set_num_format(&self.config.date_format);

        let header_row = self.header_row();
        if let Some(title) = &self.config.title {
            worksheet.write_string_with_format(0, 0, title, &bold)?;
        }
        if let Some(subtitle) = &self.config.subtitle {
            worksheet.write_string(header_row - 1, 0, subtitle)?;
        }

        if !self.config.styled_table {
            for (col, name) in RECORD_COLUMNS.iter().enumerate() {
                worksheet.write_string_with_format(header_row, col as ColNum, *name, &bold)?;
            }
        }

        let mut widths: Vec<usize> = RECORD_COLUMNS.iter().map(|name| name.chars().count()).collect();

        for (i, record) in extraction.records.iter().enumerate() {
            let r = header_row + 1 + i as RowNum;
            self.write_record(worksheet, r, record, &currency, &date)?;

            for (col, text) in self.display_texts(record).iter().enumerate() {
                widths[col] = widths[col].max(text.chars().count());
            }
        }

        let last_row = header_row + extraction.len() as RowNum;
        let last_col = (RECORD_COLUMNS.len() - 1) as ColNum;

        if self.config.styled_table {
            let columns: Vec<TableColumn> = RECORD_COLUMNS
                .iter()
                .map(|name| TableColumn::new().set_header(*name))
                .collect();
            let table = Table::new()
                .set_columns(&columns)
                .set_style(TableStyle::Medium9);
            worksheet.add_table(header_row, 0, last_row, last_col, &table)?;
        }

        if self.config.autofit {
            for (col, width) in widths.iter().enumerate() {
                let width = ((*width + 2) as f64).min(self.config.max_column_width);
                worksheet.set_column_width(col as ColNum, width)?;
            }
        }

        worksheet.set_freeze_panes(header_row + 1, 0)?;

        debug!(
            "Wrote {} records in sheet rows {}..={}",
            extraction.len(),
            header_row + 2,
            last_row + 1
        );

        Ok(())
    }

    fn write_record(
        &self,
        worksheet: &mut Worksheet,
        row: RowNum,
        record: &LineItemRecord,
        currency: &Format,
        date: &Format,
    ) -> Result<(), ExportError> {
        if record.invoice_number <= MAX_EXACT_NUMBER {
            worksheet.write_number(row, 0, record.invoice_number as f64)?;
        } else {
            worksheet.write_string(row, 0, record.invoice_number.to_string())?;
        }

        let text_cells = [
            (1, &record.description),
            (2, &record.operation_nature),
            (3, &record.recipient_tax_id),
            (4, &record.recipient_name),
            (6, &record.issuer_tax_id),
            (7, &record.issuer_name),
        ];
        for (col, text) in text_cells {
            if !text.is_empty() {
                worksheet.write_string(row, col, text)?;
            }
        }

        let value_col = VALUE_COLUMN as ColNum;
        match &record.value {
            Amount::Value(value) => {
                let number = value.to_f64().unwrap_or_default();
                worksheet.write_number_with_format(row, value_col, number, currency)?;
            }
            Amount::Unparseable(text) if !text.is_empty() => {
                worksheet.write_string(row, value_col, text)?;
            }
            Amount::Unparseable(_) => {}
        }

        if let Some(issue_date) = record.issue_date {
            let datetime = u16::try_from(issue_date.year()).ok().and_then(|year| {
                ExcelDateTime::from_ymd(year, issue_date.month() as u8, issue_date.day() as u8).ok()
            });
            match datetime {
                Some(datetime) => worksheet.write_datetime_with_format(row, 8, &datetime, date)?,
                None => {
                    // Excel dates stop at 1900..=9999
                    warn!(
                        "Invoice {}: issue date {} has no Excel serial, written as text",
                        record.invoice_number, issue_date
                    );
                    worksheet.write_string(row, 8, issue_date.to_string())?
                }
            };
        }

        if let Some(cfop) = record.cfop_number() {
            worksheet.write_number(row, 9, cfop as f64)?;
        }

        Ok(())
    }

    /// Approximate rendered text of each output column, for column widths.
    fn display_texts(&self, record: &LineItemRecord) -> [String; 10] {
        let value = match &record.value {
            Amount::Value(v) => format_currency(*v, &self.locale),
            Amount::Unparseable(text) => text.clone(),
        };

        [
            record.invoice_number.to_string(),
            record.description.clone(),
            record.operation_nature.clone(),
            record.recipient_tax_id.clone(),
            record.recipient_name.clone(),
            value,
            record.issuer_tax_id.clone(),
            record.issuer_name.clone(),
            record.issue_date.map(|d| d.to_string()).unwrap_or_default(),
            record.cfop.clone().unwrap_or_default(),
        ]
    }
}

/// `<dir>/<stem><suffix>.<extension>` beside `input`.
pub fn default_output_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}{}.{}", stem, suffix, extension))
}

impl ExportSink for XlsxExporter {
    fn export(&self, extraction: &Extraction, path: &Path) -> Result<(), ExportError> {
        let mut workbook = self.build_workbook(extraction)?;
        workbook.save(path)?;

        info!("Saved {} records to {}", extraction.len(), path.display());
        Ok(())
    }
}
