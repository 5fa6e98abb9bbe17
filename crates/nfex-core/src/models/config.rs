//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NfexError, Result};

/// Main configuration for the nfex pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfexConfig {
    /// Number and currency conventions of the source report.
    pub locale: LocaleConfig,

    /// Row scanner configuration.
    pub extraction: ExtractionConfig,

    /// Output workbook configuration.
    pub export: ExportConfig,
}

/// Grouping/decimal symbols and currency symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Thousands separator.
    pub thousands_separator: char,

    /// Decimal separator.
    pub decimal_separator: char,

    /// Currency symbol used in summaries.
    pub currency_symbol: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            thousands_separator: '.',
            decimal_separator: ',',
            currency_symbol: "R$".to_string(),
        }
    }
}

/// Row scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// First row to scan; rows above are the report's title band.
    pub start_row: usize,

    /// Require the anchor cell to contain the decimal separator, not just a value.
    pub strict_anchor: bool,

    /// Search neighbouring columns for a 4-digit CFOP when the CFOP column is empty.
    pub cfop_fallback: bool,

    /// Column range searched by the CFOP fallback.
    pub cfop_fallback_columns: ColumnRange,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            start_row: 2,
            strict_anchor: false,
            cfop_fallback: false,
            cfop_fallback_columns: ColumnRange { start: 10, end: 18 },
        }
    }
}

/// Half-open column range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Output workbook configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Worksheet name.
    pub sheet_name: String,

    /// Report title written in the first row (none to skip).
    pub title: Option<String>,

    /// Subtitle written in the second row (none to skip).
    pub subtitle: Option<String>,

    /// Wrap the records in a styled Excel table.
    pub styled_table: bool,

    /// Size columns to their longest text.
    pub autofit: bool,

    /// Upper bound for auto-sized column widths.
    pub max_column_width: f64,

    /// Suffix appended to the input file stem for the default output path.
    pub output_suffix: String,

    /// Number format of the value column.
    pub currency_format: String,

    /// Number format of the issue date column.
    pub date_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            title: Some("Relatório NF-e".to_string()),
            subtitle: Some("NF-E".to_string()),
            styled_table: true,
            autofit: true,
            max_column_width: 50.0,
            output_suffix: "_FORMATADO_FINAL".to_string(),
            currency_format: r#""R$" #,##0.00"#.to_string(),
            date_format: "yyyy-mm-dd".to_string(),
        }
    }
}

impl NfexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| NfexError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| NfexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_report_layout() {
        let config = NfexConfig::default();
        assert_eq!(config.extraction.start_row, 2);
        assert!(!config.extraction.strict_anchor);
        assert!(!config.extraction.cfop_fallback);
        assert_eq!(config.extraction.cfop_fallback_columns.iter(), 10..18);
        assert_eq!(config.locale.thousands_separator, '.');
        assert_eq!(config.locale.decimal_separator, ',');
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: NfexConfig =
            serde_json::from_str(r#"{"extraction": {"strict_anchor": true}}"#).unwrap();
        assert!(config.extraction.strict_anchor);
        assert_eq!(config.extraction.start_row, 2);
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = NfexConfig::default();
        config.locale.currency_symbol = "US$".to_string();
        config.export.title = None;
        config.save(&path).unwrap();

        let loaded = NfexConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(NfexConfig::from_file(&path), Err(NfexError::Config(_))));
    }
}
