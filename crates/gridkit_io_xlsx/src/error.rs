//! Top-level conversion errors.

use thiserror::Error;

/// Fatal conversion failure. Recoverable input problems are logged instead.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input payload is not a valid document.
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the input or writing the output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook backend rejected an operation.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The document holds no sheet.
    #[error("document contains no sheets")]
    EmptyDocument,

    /// A font family id outside the family table.
    #[error("unknown font family id: {id}")]
    UnknownFontFamilyId {
        /// Offending id as written in the input.
        id: String,
    },

    /// A merged region overlaps a different, already declared region.
    #[error("merge range {range} overlaps existing merge {existing}")]
    MergeConflict {
        /// Rejected range (A1 notation).
        range: String,
        /// Range already declared (A1 notation).
        existing: String,
    },

    /// A zero-based coordinate beyond the Excel sheet limits.
    #[error("cell coordinate out of range: row={row} col={col}")]
    CoordinateOutOfRange {
        /// Zero-based row index.
        row: u64,
        /// Zero-based column index.
        col: u64,
    },

    /// Conversion options out of their valid domain.
    #[error("invalid convert options: {0}")]
    InvalidOptions(String),

    /// The writer was used after `close()`.
    #[error("cannot write after close()")]
    WriterClosed,
}

/// Kernel result alias.
pub type Result<T> = std::result::Result<T, ConvertError>;
