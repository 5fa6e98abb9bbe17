//! NF-e line-item extraction from a report grid.

mod assembler;
pub mod layout;
pub mod rules;
mod scanner;

pub use assembler::{Assembly, Extraction, RecordAssembler};
pub use scanner::{RowScanner, ScanState, ScanStats};

use crate::models::config::{ExtractionConfig, LocaleConfig, NfexConfig};
use crate::sheet::Grid;
use rules::{AmountParser, AnchorRule};

/// Row scanner configuration holder; builds scanners over grids.
#[derive(Debug, Clone, Default)]
pub struct NfeExtractor {
    extraction: ExtractionConfig,
    locale: LocaleConfig,
}

impl NfeExtractor {
    /// Create an extractor with the default report layout and pt-BR locale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor from a loaded configuration.
    pub fn from_config(config: &NfexConfig) -> Self {
        Self {
            extraction: config.extraction.clone(),
            locale: config.locale.clone(),
        }
    }

    /// Set the first row to scan.
    pub fn with_start_row(mut self, row: usize) -> Self {
        self.extraction.start_row = row;
        self
    }

    /// Require the anchor cell to hold a decimal amount.
    pub fn with_strict_anchor(mut self, strict: bool) -> Self {
        self.extraction.strict_anchor = strict;
        self
    }

    /// Search neighbouring columns when the CFOP column is empty.
    pub fn with_cfop_fallback(mut self, enabled: bool) -> Self {
        self.extraction.cfop_fallback = enabled;
        self
    }

    /// Set the number conventions used to parse item values.
    pub fn with_locale(mut self, locale: LocaleConfig) -> Self {
        self.locale = locale;
        self
    }

    pub fn locale(&self) -> &LocaleConfig {
        &self.locale
    }

    fn anchor_rule(&self) -> AnchorRule {
        if self.extraction.strict_anchor {
            AnchorRule::Decimal(self.locale.decimal_separator)
        } else {
            AnchorRule::Present
        }
    }

    /// Start a scan of `grid`.
    pub fn scan<'a>(&self, grid: &'a Grid) -> RowScanner<'a> {
        let fallback = self
            .extraction
            .cfop_fallback
            .then(|| self.extraction.cfop_fallback_columns.iter());

        RowScanner::new(
            grid,
            self.extraction.start_row,
            self.anchor_rule(),
            AmountParser::new(self.locale.clone()),
            fallback,
        )
    }

    /// Scan `grid` to the end and assemble the records.
    pub fn extract(&self, grid: &Grid) -> Assembly {
        RecordAssembler::new().assemble(self.scan(grid))
    }
}
