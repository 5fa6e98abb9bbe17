//! Convert command - extract line items from a single report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use nfex_core::extract::rules::{format_amount, format_currency};
use nfex_core::{
    default_output_path, Amount, Assembly, ExportSink, Extraction, GridSource, LocaleConfig,
    NfeExtractor, NfexConfig, WorkbookReader, XlsxExporter, RECORD_COLUMNS,
};

use super::config::load_config;

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input report (.xlsx, .xlsm, .xls, .xlsb or .ods)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: <input>_FORMATADO_FINAL beside the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,

    /// Exit with an error when no records are extracted
    #[arg(long)]
    fail_on_empty: bool,

    /// Require the header anchor cell to hold a decimal amount
    #[arg(long)]
    strict_anchor: bool,

    /// Search columns 10..18 for a CFOP when column 13 is empty
    #[arg(long)]
    cfop_fallback: bool,

    /// Print the first N records
    #[arg(long, value_name = "N")]
    preview: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Formatted Excel workbook
    Xlsx,
    /// JSON records with aggregate
    Json,
    /// CSV records
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

pub fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    config.extraction.strict_anchor |= args.strict_anchor;
    config.extraction.cfop_fallback |= args.cfop_fallback;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let output = args.output.clone().unwrap_or_else(|| {
        default_output_path(
            &args.input,
            &config.export.output_suffix,
            args.format.extension(),
        )
    });

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Converting {}...", args.input.display()));

    let result = convert_file(&args.input, &output, args.format, &config);
    pb.finish_and_clear();
    let assembly = result?;

    match assembly.extraction() {
        Some(extraction) => {
            println!("{} {}", style("✓").green(), assembly.summary(&config.locale));
            println!(
                "{} Output written to {}",
                style("✓").green(),
                output.display()
            );

            if let Some(limit) = args.preview {
                println!();
                print!("{}", format_preview(extraction, limit, &config.locale));
            }
        }
        None if args.fail_on_empty => {
            anyhow::bail!("{}", assembly.summary(&config.locale));
        }
        None => {
            println!("{} {}", style("⚠").yellow(), assembly.summary(&config.locale));
            println!("   No output file was written.");
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read, extract and write one report. Nothing is written when the
/// extraction is empty.
pub fn convert_file(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: &NfexConfig,
) -> anyhow::Result<Assembly> {
    let grid = WorkbookReader::from_locale(&config.locale).read_grid(input)?;
    let assembly = NfeExtractor::from_config(config).extract(&grid);

    if let Some(extraction) = assembly.extraction() {
        write_output(extraction, output, format, config)?;
        debug!("Wrote output to {}", output.display());
    }

    Ok(assembly)
}

fn write_output(
    extraction: &Extraction,
    output: &Path,
    format: OutputFormat,
    config: &NfexConfig,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Xlsx => {
            XlsxExporter::new(config.export.clone(), config.locale.clone())
                .export(extraction, output)?;
        }
        OutputFormat::Json => {
            fs::write(output, serde_json::to_string_pretty(extraction)?)?;
        }
        OutputFormat::Csv => {
            fs::write(output, format_csv(extraction, &config.locale)?)?;
        }
    }

    Ok(())
}

fn format_csv(extraction: &Extraction, locale: &LocaleConfig) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(RECORD_COLUMNS)?;

    for record in &extraction.records {
        let value = match &record.value {
            Amount::Value(v) => format_amount(*v, locale),
            Amount::Unparseable(text) => text.clone(),
        };

        wtr.write_record([
            &record.invoice_number.to_string(),
            &record.description,
            &record.operation_nature,
            &record.recipient_tax_id,
            &record.recipient_name,
            &value,
            &record.issuer_tax_id,
            &record.issuer_name,
            &record.issue_date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default(),
            &record.cfop.clone().unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_preview(extraction: &Extraction, limit: usize, locale: &LocaleConfig) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:>8}  {:<40}  {:>16}  {:<10}  {}\n",
        "Nota", "Produto", "Valor", "Emissão", "CFOP"
    ));

    for record in extraction.records.iter().take(limit) {
        let description: String = record.description.chars().take(40).collect();
        let value = match &record.value {
            Amount::Value(v) => format_currency(*v, locale),
            Amount::Unparseable(text) => format!("? {}", text),
        };
        let date = record
            .issue_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default();

        output.push_str(&format!(
            "{:>8}  {:<40}  {:>16}  {:<10}  {}\n",
            record.invoice_number,
            description,
            value,
            date,
            record.cfop.as_deref().unwrap_or("-")
        ));
    }

    if extraction.len() > limit {
        output.push_str(&format!("... {} more\n", extraction.len() - limit));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfex_core::{InvoiceHeader, LineItemRecord, ScanStats};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn extraction() -> Extraction {
        let header = InvoiceHeader {
            number: 22,
            operation_type: "Saída".to_string(),
            operation_nature: "Venda".to_string(),
            recipient_tax_id: "12.345.678/0001-90".to_string(),
            recipient_name: "Mercado Central".to_string(),
            issuer_tax_id: "98.765.432/0001-10".to_string(),
            issuer_name: "Vog Alimentos".to_string(),
            issue_date: chrono::NaiveDate::from_ymd_opt(2025, 12, 17),
            declared_total: "46.200,00".to_string(),
        };
        let records = vec![
            LineItemRecord::new(
                &header,
                "FILE DE PEITO".to_string(),
                Amount::Value(Decimal::from_str("45000.00").unwrap()),
                Some("5110".to_string()),
                4,
            ),
            LineItemRecord::new(&header, "COXA".to_string(), Amount::Unparseable("abc".into()), None, 5),
        ];
        Extraction::from_records(records, ScanStats::default())
    }

    #[test]
    fn test_csv_uses_locale_amounts() {
        let csv = format_csv(&extraction(), &LocaleConfig::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Nº da Nota,Descrição do Produto"));
        assert!(lines[1].contains("\"45.000,00\""));
        assert!(lines[1].ends_with("17/12/2025,5110"));
        assert!(lines[2].contains(",abc,"));
    }

    #[test]
    fn test_preview_is_truncated() {
        let preview = format_preview(&extraction(), 1, &LocaleConfig::default());

        assert!(preview.contains("FILE DE PEITO"));
        assert!(preview.contains("R$ 45.000,00"));
        assert!(!preview.contains("COXA"));
        assert!(preview.ends_with("... 1 more\n"));
    }

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Xlsx.extension(), "xlsx");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Csv.extension(), "csv");
    }
}
