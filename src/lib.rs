// DTAUS Batch - Core Library
// Exposes all modules for use in the CLI and tests

pub mod charset;
pub mod directories;
pub mod entities;
pub mod error;
pub mod fields;
pub mod logical;
pub mod physical;
pub mod records;
pub mod validation;

// Re-export commonly used types
pub use charset::{DtaCharset, InvalidByte, Transcoder, UnmappableCharacter};
pub use directories::{
    CurrencyDirectory, CurrencyRegistry, PaymentTypeDirectory, PaymentTypeRegistry,
};
pub use entities::{
    Checksum, Header, LogicalFileType, PaymentType, Transaction, MAX_DESCRIPTIONS,
};
pub use error::{DtausError, Result};
pub use logical::LogicalFile;
pub use physical::{
    AnalysisReport, FileStorage, MemoryStorage, PhysicalFile, StorageResource,
};
pub use records::StorageFormat;
pub use validation::{
    Diagnostic, Diagnostics, HeaderValidator, TransactionValidator, ValidationPipeline,
    ValidationResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
