//! Record assembly: ordered record list plus aggregate.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::rules::format_currency;
use super::scanner::{RowScanner, ScanStats};
use crate::models::config::LocaleConfig;
use crate::models::record::LineItemRecord;

/// Records of one scan, in source row order, with their aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// Line items in scan order.
    pub records: Vec<LineItemRecord>,
    /// Sum of all parseable values.
    pub total: Decimal,
    /// Records whose value did not parse.
    pub unparseable: usize,
    /// Distinct invoice numbers among the records.
    pub invoices: usize,
    /// Row counts of the scan.
    pub stats: ScanStats,
}

impl Extraction {
    /// Aggregate `records` as they are; nothing is sorted, filtered or merged.
    pub fn from_records(records: Vec<LineItemRecord>, stats: ScanStats) -> Self {
        let total = records.iter().filter_map(|r| r.value.value()).sum();
        let unparseable = records.iter().filter(|r| r.value.is_unparseable()).count();
        let invoices = records
            .iter()
            .map(|r| r.invoice_number)
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            records,
            total,
            unparseable,
            invoices,
            stats,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of a full scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    /// At least one record was extracted.
    Extracted(Extraction),
    /// No invoice block produced a record. Not an error by itself.
    Empty(ScanStats),
}

impl Assembly {
    pub fn stats(&self) -> ScanStats {
        match self {
            Assembly::Extracted(extraction) => extraction.stats,
            Assembly::Empty(stats) => *stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Assembly::Empty(_))
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        match self {
            Assembly::Extracted(extraction) => Some(extraction),
            Assembly::Empty(_) => None,
        }
    }

    pub fn into_extraction(self) -> Option<Extraction> {
        match self {
            Assembly::Extracted(extraction) => Some(extraction),
            Assembly::Empty(_) => None,
        }
    }

    /// One-line human-readable summary.
    pub fn summary(&self, locale: &LocaleConfig) -> String {
        match self {
            Assembly::Extracted(extraction) => {
                let mut line = format!(
                    "{} record{} from {} invoice{}, total {}",
                    extraction.len(),
                    plural(extraction.len()),
                    extraction.invoices,
                    plural(extraction.invoices),
                    format_currency(extraction.total, locale)
                );
                if extraction.unparseable > 0 {
                    line.push_str(&format!(
                        " ({} unparseable value{} excluded)",
                        extraction.unparseable,
                        plural(extraction.unparseable)
                    ));
                }
                line
            }
            Assembly::Empty(stats) => format!(
                "No records extracted ({} row{} scanned, {} invoice header{} found)",
                stats.rows(),
                plural(stats.rows()),
                stats.headers,
                plural(stats.headers)
            ),
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Drains a scanner into an [`Assembly`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordAssembler;

impl RecordAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, mut scanner: RowScanner<'_>) -> Assembly {
        let records: Vec<LineItemRecord> = scanner.by_ref().collect();
        let stats = scanner.stats();

        debug!(
            "Scan finished: {} headers, {} items, {} sub-headers, {} noise rows",
            stats.headers, stats.items, stats.sub_headers_skipped, stats.noise_rows
        );

        if records.is_empty() {
            info!("No records extracted from {} rows", stats.rows());
            return Assembly::Empty(stats);
        }

        let extraction = Extraction::from_records(records, stats);
        info!(
            "Extracted {} records from {} invoices",
            extraction.len(),
            extraction.invoices
        );
        Assembly::Extracted(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::NfeExtractor;
    use crate::models::record::Amount;
    use crate::sheet::Grid;
    use std::str::FromStr;

    fn grid(rows: &[&[(usize, &str)]]) -> Grid {
        Grid::from_rows(rows.iter().map(|cells| {
            let width = cells.iter().map(|(c, _)| c + 1).max().unwrap_or(0);
            let mut row = vec![None; width];
            for (col, text) in cells.iter() {
                row[*col] = Some(text.to_string());
            }
            row
        }))
    }

    fn sample() -> Grid {
        grid(&[
            &[(0, "Relatório XML - 17/12/2025")],
            &[(0, "NF-E")],
            &[(0, "22"), (2, "Venda"), (9, "46.200,00"), (10, "17/12/2025")],
            &[(1, "Desc Prod")],
            &[(1, "FILE DE PEITO"), (5, "45.000,00"), (13, "5.1102")],
            &[(1, "COXA"), (5, "abc"), (13, "5102")],
            &[(0, "23"), (2, "Venda"), (9, "1.200,00"), (10, "17/12/2025")],
            &[(1, "Desc Prod")],
            &[(1, "ASA"), (5, "1.200,00"), (13, "6102")],
        ])
    }

    #[test]
    fn test_sum_skips_unparseable() {
        let assembly = NfeExtractor::new().extract(&sample());
        let extraction = assembly.extraction().unwrap();

        assert_eq!(extraction.len(), 3);
        assert_eq!(extraction.total, Decimal::from_str("46200.00").unwrap());
        assert_eq!(extraction.unparseable, 1);
        assert_eq!(extraction.invoices, 2);
        assert_eq!(
            extraction.records[1].value,
            Amount::Unparseable("abc".to_string())
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let extraction = NfeExtractor::new().extract(&sample()).into_extraction().unwrap();
        let descriptions: Vec<_> = extraction.records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["FILE DE PEITO", "COXA", "ASA"]);
    }

    #[test]
    fn test_empty_is_not_an_error() {
        let grid = grid(&[&[(0, "Relatório")], &[(0, "NF-E")], &[(1, "Desc Prod")]]);
        let assembly = NfeExtractor::new().extract(&grid);

        assert!(assembly.is_empty());
        assert_eq!(assembly.stats().rows(), 1);
        assert_eq!(
            assembly.summary(&LocaleConfig::default()),
            "No records extracted (1 row scanned, 0 invoice headers found)"
        );
    }

    #[test]
    fn test_summary() {
        let assembly = NfeExtractor::new().extract(&sample());
        assert_eq!(
            assembly.summary(&LocaleConfig::default()),
            "3 records from 2 invoices, total R$ 46.200,00 (1 unparseable value excluded)"
        );
    }

    #[test]
    fn test_duplicate_invoice_numbers_count_once() {
        let records = NfeExtractor::new().extract(&sample()).into_extraction().unwrap().records;
        let doubled: Vec<_> = records.iter().chain(records.iter()).cloned().collect();

        let extraction = Extraction::from_records(doubled, ScanStats::default());
        assert_eq!(extraction.len(), 6);
        assert_eq!(extraction.invoices, 2);
        assert_eq!(extraction.total, Decimal::from_str("92400.00").unwrap());
    }
}
