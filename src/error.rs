// 🚨 Error Taxonomy - Structural failures of the wire format
//
// Business-rule violations are NOT errors: they travel as Diagnostics
// (see validation.rs). This enum covers everything that aborts an
// operation outright - corrupt bytes, unsupported records, bad lengths,
// charset failures, index misuse and I/O.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DtausError {
    /// Bytes at `position` do not parse as the record/field expected there.
    /// `position` is the absolute byte offset into the physical file.
    #[error("corrupt data at byte {position}: {reason}")]
    Corrupt { position: u64, reason: String },

    /// Record-type discriminator reserved by the wire contract but not
    /// implemented by this codec version.
    #[error("unsupported record type '{discriminator}' at byte {position}")]
    Unsupported { position: u64, discriminator: char },

    /// Physical file length is not a whole multiple of the block size.
    /// Reported before any record decoding is attempted.
    #[error("file length {length} is not a multiple of block size {block_size}")]
    LengthMismatch { length: u64, block_size: usize },

    /// A value does not fit the fixed width of its wire field.
    #[error("value '{value}' does not fit field '{field}' ({width} bytes)")]
    FieldOverflow {
        field: &'static str,
        value: String,
        width: usize,
    },

    /// A character outside the DTA legacy repertoire was passed to encode.
    #[error("character '{character}' cannot be encoded in the DTA charset")]
    Unmappable { character: char },

    /// Transaction or logical-file index out of bounds.
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DtausError>;
