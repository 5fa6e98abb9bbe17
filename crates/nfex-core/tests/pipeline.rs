//! End-to-end: a report workbook on disk through reader, extractor and exporter.

use std::path::Path;
use std::str::FromStr;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use nfex_core::{
    default_output_path, Amount, ExportConfig, ExportSink, GridError, GridSource, LocaleConfig,
    NfeExtractor, WorkbookReader, XlsxExporter,
};

/// Writes a report the way the NF-e portal exports it: a two-row title band,
/// then header / sub-header / item rows, mostly as text cells.
fn write_report(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    sheet.write_string(0, 0, "Relatório XML - 17/12/2025").unwrap();
    sheet.write_string(1, 0, "NF-E").unwrap();

    let headers: [(u32, f64, &str, &str); 2] = [
        (2, 22.0, "46.200,00", "17/12/2025 10:31:00"),
        (6, 23.0, "980,50", "2025-12-18 08:00:00"),
    ];
    for (row, number, total, date) in headers {
        sheet.write_number(row, 0, number).unwrap();
        sheet.write_string(row, 1, "1 - Saída").unwrap();
        sheet.write_string(row, 2, "Venda de mercadoria").unwrap();
        sheet.write_string(row, 3, "12.345.678/0001-90").unwrap();
        sheet.write_string(row, 4, "Mercado Central").unwrap();
        sheet.write_string(row, 6, "98.765.432/0001-10").unwrap();
        sheet.write_string(row, 7, "Vog Alimentos").unwrap();
        sheet.write_string(row, 9, total).unwrap();
        sheet.write_string(row, 10, date).unwrap();
        sheet.write_string(row + 1, 1, "Desc Prod").unwrap();
    }

    let items: [(u32, &str, &str, &str); 3] = [
        (4, "FILE DE PEITO", "45.000,00", "5.1102"),
        (5, "COXA", "1.200,00", "5102"),
        (8, "ASA", "abc", "6102"),
    ];
    for (row, description, value, cfop) in items {
        sheet.write_string(row, 1, description).unwrap();
        sheet.write_string(row, 5, value).unwrap();
        sheet.write_string(row, 13, cfop).unwrap();
    }

    workbook.save(path).unwrap();
}

#[test]
fn test_report_to_records() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("relatorio.xlsx");
    write_report(&input);

    let grid = WorkbookReader::new().read_grid(&input).unwrap();
    assert_eq!(grid.cell(2, 0), Some("22"));

    let assembly = NfeExtractor::new().extract(&grid);
    let extraction = assembly.extraction().unwrap();

    assert_eq!(extraction.len(), 3);
    assert_eq!(extraction.invoices, 2);
    assert_eq!(extraction.unparseable, 1);
    assert_eq!(extraction.total, Decimal::from_str("46200.00").unwrap());

    let first = &extraction.records[0];
    assert_eq!(first.invoice_number, 22);
    assert_eq!(first.description, "FILE DE PEITO");
    assert_eq!(first.value, Amount::Value(Decimal::from_str("45000.00").unwrap()));
    assert_eq!(first.cfop.as_deref(), Some("5110"));
    assert_eq!(first.issue_date.map(|d| d.to_string()).as_deref(), Some("2025-12-17"));

    let last = &extraction.records[2];
    assert_eq!(last.invoice_number, 23);
    assert_eq!(last.value, Amount::Unparseable("abc".to_string()));
    assert_eq!(last.issue_date.map(|d| d.to_string()).as_deref(), Some("2025-12-18"));

    assert_eq!(
        assembly.summary(&LocaleConfig::default()),
        "3 records from 2 invoices, total R$ 46.200,00 (1 unparseable value excluded)"
    );
}

#[test]
fn test_formatted_output_reads_back() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("relatorio.xlsx");
    write_report(&input);

    let reader = WorkbookReader::new();
    let grid = reader.read_grid(&input).unwrap();
    let extraction = NfeExtractor::new().extract(&grid).into_extraction().unwrap();

    let export = ExportConfig::default();
    let output = default_output_path(&input, &export.output_suffix, "xlsx");
    assert_eq!(output.file_name().unwrap(), "relatorio_FORMATADO_FINAL.xlsx");

    XlsxExporter::new(export, LocaleConfig::default())
        .export(&extraction, &output)
        .unwrap();

    let written = reader.read_grid(&output).unwrap();
    assert_eq!(written.cell(0, 0), Some("Relatório NF-e"));
    assert_eq!(written.cell(1, 0), Some("NF-E"));
    assert_eq!(written.cell(2, 0), Some("Nº da Nota"));
    assert_eq!(written.cell(2, 9), Some("CFOP"));

    assert_eq!(written.cell(3, 0), Some("22"));
    assert_eq!(written.cell(3, 1), Some("FILE DE PEITO"));
    assert_eq!(written.cell(3, 2), Some("Venda de mercadoria"));
    assert_eq!(written.cell(3, 5), Some("45000"));
    assert_eq!(written.cell(3, 9), Some("5110"));
    assert!(written.cell(3, 8).is_some_and(|d| d.starts_with("2025-12-17")));

    assert_eq!(written.cell(5, 0), Some("23"));
    assert_eq!(written.cell(5, 5), Some("abc"));
    assert_eq!(written.row_count(), 6);
}

#[test]
fn test_plain_output_without_title_band() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("relatorio.xlsx");
    write_report(&input);

    let reader = WorkbookReader::new();
    let extraction = NfeExtractor::new()
        .extract(&reader.read_grid(&input).unwrap())
        .into_extraction()
        .unwrap();

    let export = ExportConfig {
        title: None,
        subtitle: None,
        styled_table: false,
        ..ExportConfig::default()
    };
    let output = dir.path().join("plain.xlsx");
    XlsxExporter::new(export, LocaleConfig::default())
        .export(&extraction, &output)
        .unwrap();

    let written = reader.read_grid(&output).unwrap();
    assert_eq!(written.cell(0, 0), Some("Nº da Nota"));
    assert_eq!(written.cell(1, 1), Some("FILE DE PEITO"));
    assert_eq!(written.cell(2, 5), Some("1200"));
}

#[test]
fn test_title_without_subtitle_moves_header_up() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("relatorio.xlsx");
    write_report(&input);

    let reader = WorkbookReader::new();
    let extraction = NfeExtractor::new()
        .extract(&reader.read_grid(&input).unwrap())
        .into_extraction()
        .unwrap();

    let export = ExportConfig {
        subtitle: None,
        ..ExportConfig::default()
    };
    let exporter = XlsxExporter::new(export, LocaleConfig::default());
    assert_eq!(exporter.header_row(), 1);

    let output = dir.path().join("titulo.xlsx");
    exporter.export(&extraction, &output).unwrap();

    let written = reader.read_grid(&output).unwrap();
    assert_eq!(written.cell(0, 0), Some("Relatório NF-e"));
    assert_eq!(written.cell(1, 0), Some("Nº da Nota"));
    assert_eq!(written.cell(2, 1), Some("FILE DE PEITO"));
}

#[test]
fn test_numeric_value_cells_keep_their_cents() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("numerico.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(2, 0, "22").unwrap();
    sheet.write_number(2, 9, 1634.56).unwrap();
    sheet.write_string(3, 1, "Desc Prod").unwrap();
    sheet.write_string(4, 1, "FILE DE PEITO").unwrap();
    sheet.write_number(4, 5, 1234.56).unwrap();
    sheet.write_string(5, 1, "COXA").unwrap();
    sheet.write_number(5, 5, 400.0).unwrap();
    workbook.save(&input).unwrap();

    let grid = WorkbookReader::new().read_grid(&input).unwrap();
    assert_eq!(grid.cell(4, 5), Some("1234,56"));

    let extraction = NfeExtractor::new()
        .with_strict_anchor(true)
        .extract(&grid)
        .into_extraction()
        .unwrap();
    assert_eq!(extraction.records[0].value, Amount::Value(Decimal::from_str("1234.56").unwrap()));
    assert_eq!(extraction.records[1].value, Amount::Value(Decimal::from_str("400").unwrap()));
    assert_eq!(extraction.total, Decimal::from_str("1634.56").unwrap());
}

#[test]
fn test_title_only_workbook_extracts_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("vazio.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Relatório XML").unwrap();
    sheet.write_string(1, 0, "NF-E").unwrap();
    workbook.save(&input).unwrap();

    let grid = WorkbookReader::new().read_grid(&input).unwrap();
    let assembly = NfeExtractor::new().extract(&grid);
    assert!(assembly.is_empty());
    assert_eq!(assembly.stats().headers, 0);
}

#[test]
fn test_reader_rejects_missing_and_unsupported_files() {
    let dir = TempDir::new().unwrap();
    let reader = WorkbookReader::new();

    let missing = reader.read_grid(&dir.path().join("missing.xlsx")).unwrap_err();
    assert!(matches!(missing, GridError::NotFound(_)));

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "not a workbook").unwrap();
    let unsupported = reader.read_grid(&text).unwrap_err();
    assert!(matches!(unsupported, GridError::UnsupportedFormat(ext) if ext == "txt"));

    let broken = dir.path().join("broken.xlsx");
    std::fs::write(&broken, "not a zip").unwrap();
    assert!(matches!(reader.read_grid(&broken).unwrap_err(), GridError::Open(_)));
}
