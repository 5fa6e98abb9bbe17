//! Positional state machine that walks the grid and yields line items.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::layout;
use super::rules::{
    find_cfop_in_columns, is_block_terminator, is_header_row, is_item_row, is_sub_header_row,
    operation_label, AmountParser, AnchorRule, CellRule, CfopExtractor, DateExtractor,
};
use crate::models::record::{Amount, InvoiceHeader, LineItemRecord};
use crate::sheet::Grid;

/// Where the scanner is in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Testing `row` for an invoice header.
    ScanningForHeader { row: usize },
    /// A header was detected at `header_row`; its fields are read next.
    InHeaderBlock { header_row: usize },
    /// First row of an item block, which may be the product table's header.
    SkippingSubHeader { row: usize },
    /// Reading item rows of the current block.
    InItemBlock { row: usize },
    /// Grid exhausted.
    Done,
}

/// Row counts of one scan. Every scanned row lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Invoice header rows read.
    pub headers: usize,
    /// Line items emitted.
    pub items: usize,
    /// Product table header rows skipped at the start of a block.
    pub sub_headers_skipped: usize,
    /// Rows that matched nothing.
    pub noise_rows: usize,
    /// Headers whose block closed without any item.
    pub empty_blocks: usize,
}

impl ScanStats {
    /// Total rows classified so far.
    pub fn rows(&self) -> usize {
        self.headers + self.items + self.sub_headers_skipped + self.noise_rows
    }
}

/// Lazy, non-restartable sequence of line items over one grid.
///
/// Built by [`NfeExtractor::scan`](super::NfeExtractor::scan). The scan never
/// fails: rows that do not fit the report pattern are skipped.
pub struct RowScanner<'a> {
    grid: &'a Grid,
    anchor: AnchorRule,
    amounts: AmountParser,
    cfop: CfopExtractor,
    dates: DateExtractor,
    cfop_fallback: Option<Range<usize>>,
    state: ScanState,
    header: Option<InvoiceHeader>,
    block_items: usize,
    stats: ScanStats,
}

impl<'a> RowScanner<'a> {
    pub(crate) fn new(
        grid: &'a Grid,
        start_row: usize,
        anchor: AnchorRule,
        amounts: AmountParser,
        cfop_fallback: Option<Range<usize>>,
    ) -> Self {
        Self {
            grid,
            anchor,
            amounts,
            cfop: CfopExtractor::new(),
            dates: DateExtractor::new(),
            cfop_fallback,
            state: ScanState::ScanningForHeader { row: start_row },
            header: None,
            block_items: 0,
            stats: ScanStats::default(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Header of the block being read, if any.
    pub fn current_header(&self) -> Option<&InvoiceHeader> {
        self.header.as_ref()
    }

    /// Perform one transition, returning the record it produced, if any.
    fn step(&mut self) -> Option<LineItemRecord> {
        let (next, record) = match self.state {
            ScanState::Done => (ScanState::Done, None),
            ScanState::ScanningForHeader { row } => (self.scan_for_header(row), None),
            ScanState::InHeaderBlock { header_row } => (self.open_block(header_row), None),
            ScanState::SkippingSubHeader { row } => (self.skip_sub_header(row), None),
            ScanState::InItemBlock { row } => self.read_item_row(row),
        };
        self.state = next;
        record
    }

    fn scan_for_header(&mut self, row: usize) -> ScanState {
        if row >= self.grid.row_count() {
            return ScanState::Done;
        }

        if is_header_row(self.grid, row, self.anchor) {
            ScanState::InHeaderBlock { header_row: row }
        } else {
            trace!("Sheet row {}: not an invoice header", row + 1);
            self.stats.noise_rows += 1;
            ScanState::ScanningForHeader { row: row + 1 }
        }
    }

    fn open_block(&mut self, header_row: usize) -> ScanState {
        let Some(header) = self.read_header(header_row) else {
            self.stats.noise_rows += 1;
            return ScanState::ScanningForHeader { row: header_row + 1 };
        };

        debug!(
            "Sheet row {}: invoice {} ({})",
            header_row + 1,
            header.number,
            header.issuer_name
        );
        self.stats.headers += 1;
        self.header = Some(header);
        self.block_items = 0;

        // Rows between the header and its items carry column labels, but a
        // new invoice number there still ends the block.
        let first_item_row = header_row + layout::ITEM_OFFSET;
        for row in header_row + 1..first_item_row.min(self.grid.row_count()) {
            if is_block_terminator(self.grid, row) {
                self.close_block(row);
                return ScanState::ScanningForHeader { row };
            }
            self.stats.noise_rows += 1;
        }

        ScanState::SkippingSubHeader { row: first_item_row }
    }

    fn skip_sub_header(&mut self, row: usize) -> ScanState {
        if row >= self.grid.row_count() {
            self.close_block(row);
            return ScanState::Done;
        }

        if is_block_terminator(self.grid, row) {
            self.close_block(row);
            return ScanState::ScanningForHeader { row };
        }

        if is_sub_header_row(self.grid, row) {
            trace!("Sheet row {}: product table header skipped", row + 1);
            self.stats.sub_headers_skipped += 1;
            ScanState::InItemBlock { row: row + 1 }
        } else {
            ScanState::InItemBlock { row }
        }
    }

    fn read_item_row(&mut self, row: usize) -> (ScanState, Option<LineItemRecord>) {
        if row >= self.grid.row_count() {
            self.close_block(row);
            return (ScanState::Done, None);
        }

        if is_block_terminator(self.grid, row) {
            self.close_block(row);
            return (ScanState::ScanningForHeader { row }, None);
        }

        let next = ScanState::InItemBlock { row: row + 1 };
        if !is_item_row(self.grid, row) {
            trace!("Sheet row {}: skipped inside item block", row + 1);
            self.stats.noise_rows += 1;
            return (next, None);
        }

        let Some(header) = self.header.as_ref() else {
            self.stats.noise_rows += 1;
            return (next, None);
        };

        let description = self
            .grid
            .cell(row, layout::DESCRIPTION)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let value = match self.grid.cell(row, layout::ITEM_VALUE) {
            Some(text) => self.amounts.read(text),
            None => Amount::Unparseable(String::new()),
        };
        if let Amount::Unparseable(text) = &value {
            warn!(
                "Invoice {}, sheet row {}: unparseable value {:?}",
                header.number,
                row + 1,
                text
            );
        }

        let cfop = self
            .grid
            .cell(row, layout::CFOP)
            .and_then(|text| self.cfop.read(text))
            .or_else(|| {
                self.cfop_fallback
                    .clone()
                    .and_then(|columns| find_cfop_in_columns(self.grid, row, columns))
            });
        if cfop.is_none() {
            debug!("Invoice {}, sheet row {}: no CFOP", header.number, row + 1);
        }

        let record = LineItemRecord::new(header, description, value, cfop, row);
        self.stats.items += 1;
        self.block_items += 1;

        (next, Some(record))
    }

    fn read_header(&self, row: usize) -> Option<InvoiceHeader> {
        let text = |col: usize| {
            self.grid
                .cell(row, col)
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };

        let number_text = text(layout::INVOICE_NUMBER);
        let Ok(number) = number_text.parse::<u64>() else {
            warn!("Sheet row {}: invoice number {} out of range", row + 1, number_text);
            return None;
        };

        let date_text = text(layout::ISSUE_DATE);
        let issue_date = self.dates.read(&date_text);
        if issue_date.is_none() {
            warn!(
                "Invoice {}: unrecognised issue date {:?}",
                number, date_text
            );
        }

        Some(InvoiceHeader {
            number,
            operation_type: operation_label(&text(layout::OPERATION_TYPE)),
            operation_nature: text(layout::OPERATION_NATURE),
            recipient_tax_id: text(layout::RECIPIENT_TAX_ID),
            recipient_name: text(layout::RECIPIENT_NAME),
            issuer_tax_id: text(layout::ISSUER_TAX_ID),
            issuer_name: text(layout::ISSUER_NAME),
            issue_date,
            declared_total: text(layout::ANCHOR),
        })
    }

    fn close_block(&mut self, at_row: usize) {
        if let Some(header) = self.header.take() {
            debug!(
                "Invoice {} closed at sheet row {} with {} item(s)",
                header.number,
                at_row + 1,
                self.block_items
            );
            if self.block_items == 0 {
                self.stats.empty_blocks += 1;
            }
        }
        self.block_items = 0;
    }
}

impl Iterator for RowScanner<'_> {
    type Item = LineItemRecord;

    fn next(&mut self) -> Option<LineItemRecord> {
        while self.state != ScanState::Done {
            if let Some(record) = self.step() {
                return Some(record);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for RowScanner<'_> {}
