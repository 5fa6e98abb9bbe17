//! Invoice header and line-item records extracted from an NF-e report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Header attributes of one invoice block.
///
/// Lives only while the scanner walks the rows of its block; every
/// [`LineItemRecord`] carries its own copy of the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Invoice number (Nº da Nota).
    pub number: u64,

    /// Operation type label, code prefix removed ("1 - Saída" becomes "Saída").
    pub operation_type: String,

    /// Operation nature (Natureza da Operação).
    pub operation_nature: String,

    /// Recipient CNPJ/CPF.
    pub recipient_tax_id: String,

    /// Recipient legal name.
    pub recipient_name: String,

    /// Issuer CNPJ.
    pub issuer_tax_id: String,

    /// Issuer legal name.
    pub issuer_name: String,

    /// Issue date, time of day discarded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    /// Raw text of the declared total (the anchor cell).
    pub declared_total: String,
}

/// A monetary cell after locale parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amount {
    /// Parsed amount, rounded to two fractional digits.
    Value(Decimal),
    /// Text that no parse strategy accepted, kept verbatim.
    Unparseable(String),
}

impl Amount {
    /// The numeric value, if the cell parsed.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Amount::Value(v) => Some(*v),
            Amount::Unparseable(_) => None,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, Amount::Unparseable(_))
    }
}

/// One product line of an invoice, denormalized with its header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRecord {
    /// Number of the enclosing invoice.
    pub invoice_number: u64,

    /// Product description (Descrição do Produto).
    pub description: String,

    /// Operation nature copied from the header.
    pub operation_nature: String,

    /// Recipient tax id copied from the header.
    pub recipient_tax_id: String,

    /// Recipient name copied from the header.
    pub recipient_name: String,

    /// Item value.
    pub value: Amount,

    /// Issuer tax id copied from the header.
    pub issuer_tax_id: String,

    /// Issuer name copied from the header.
    pub issuer_name: String,

    /// Issue date copied from the header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    /// Fiscal operation code, at most four digits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfop: Option<String>,

    /// 0-based grid row the item was read from.
    #[serde(skip)]
    pub source_row: usize,
}

impl LineItemRecord {
    /// Build a record from an item row's fields and the header it belongs to.
    pub fn new(
        header: &InvoiceHeader,
        description: String,
        value: Amount,
        cfop: Option<String>,
        source_row: usize,
    ) -> Self {
        Self {
            invoice_number: header.number,
            description,
            operation_nature: header.operation_nature.clone(),
            recipient_tax_id: header.recipient_tax_id.clone(),
            recipient_name: header.recipient_name.clone(),
            value,
            issuer_tax_id: header.issuer_tax_id.clone(),
            issuer_name: header.issuer_name.clone(),
            issue_date: header.issue_date,
            cfop,
            source_row,
        }
    }

    /// CFOP as a number, for numeric output cells.
    pub fn cfop_number(&self) -> Option<u32> {
        self.cfop.as_deref().and_then(|c| c.parse().ok())
    }
}

/// Column titles of the formatted report, in output order.
pub const RECORD_COLUMNS: [&str; 10] = [
    "Nº da Nota",
    "Descrição do Produto",
    "Natureza Operação",
    "CNPJ Destinatário",
    "Razão Social Destinatário",
    "Valor Total",
    "CNPJ Emitente",
    "Razão Social Emitente",
    "Emissão",
    "CFOP",
];

/// Index of the value column within [`RECORD_COLUMNS`].
pub const VALUE_COLUMN: usize = 5;
