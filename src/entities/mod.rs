// Value Objects - the data model of a logical file
//
// Header, Transaction and Checksum are plain values: structural equality,
// structural hash, cloned at the container boundary. The container owns
// the canonical copy; callers only ever see copies, so nobody can mutate
// past the checksum/validation discipline.

pub mod header;
pub mod transaction;
pub mod checksum;

pub use header::{Header, LogicalFileType};
pub use transaction::{PaymentType, Transaction, MAX_DESCRIPTIONS};
pub use checksum::Checksum;
