//! Fixed column positions of the NF-e report export.

// Header row.
pub const INVOICE_NUMBER: usize = 0;
pub const OPERATION_TYPE: usize = 1;
pub const OPERATION_NATURE: usize = 2;
pub const RECIPIENT_TAX_ID: usize = 3;
pub const RECIPIENT_NAME: usize = 4;
pub const ISSUER_TAX_ID: usize = 6;
pub const ISSUER_NAME: usize = 7;
/// Declared invoice total; only its presence is checked.
pub const ANCHOR: usize = 9;
pub const ISSUE_DATE: usize = 10;

// Item row.
pub const DESCRIPTION: usize = 1;
pub const ITEM_VALUE: usize = 5;
pub const CFOP: usize = 13;

/// Rows between a header and the first row of its item block.
pub const ITEM_OFFSET: usize = 2;
