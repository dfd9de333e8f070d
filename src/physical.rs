// 🗄️ Physical File Container - the byte stream and its logical files
//
// Owns the storage resource and the ordered list of logical files.
// Opening decodes everything or nothing: structural errors abort the
// open and no partially-constructed container escapes. Checksum
// mismatches are different - they surface as diagnostics so the rest
// of the file stays inspectable.
//
// There is no autosave. commit() must be called explicitly, or all
// in-memory mutation is lost with the container.

use crate::charset::Transcoder;
use crate::entities::{Checksum, Header, Transaction};
use crate::error::{DtausError, Result};
use crate::logical::LogicalFile;
use crate::records::{
    decode_checksum, decode_header, decode_transaction, discriminator, encode_logical_file,
    encoded_logical_file_len, StorageFormat, CHECKSUM_BLOCKS, HEADER_BLOCKS,
};
use crate::validation::{Diagnostic, Diagnostics, ValidationPipeline};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// STORAGE RESOURCE
// ============================================================================

/// Seekable byte range the physical file lives in. One container per
/// resource at a time - the format has no concurrency control of its
/// own, so callers serialize access themselves.
pub trait StorageResource {
    fn read_all(&mut self) -> std::io::Result<Vec<u8>>;
    /// Replace the full content, truncating anything beyond the new end.
    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()>;
    fn len(&mut self) -> std::io::Result<u64>;

    fn is_empty(&mut self) -> std::io::Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory storage, used by tests and by callers assembling files
/// without touching a filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    bytes: Vec<u8>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        MemoryStorage { bytes }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl StorageResource for MemoryStorage {
    fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.bytes = bytes.to_vec();
        Ok(())
    }

    fn len(&mut self) -> std::io::Result<u64> {
        Ok(self.bytes.len() as u64)
    }
}

/// File-backed storage. Released when the container is dropped.
#[derive(Debug)]
pub struct FileStorage {
    file: File,
}

impl FileStorage {
    /// Open (or create) for read/write.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Ok(FileStorage { file })
    }

    /// Open for inspection only; commit() will fail on this storage.
    pub fn open_read_only(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(FileStorage { file })
    }
}

impl StorageResource for FileStorage {
    fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        self.file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.file.set_len(bytes.len() as u64)?;
        self.file.flush()
    }

    fn len(&mut self) -> std::io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}

// ============================================================================
// ANALYSIS REPORT
// ============================================================================

/// Result of a read-only full scan. Diagnostics list every checksum
/// mismatch found; structural corruption aborts the scan instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub logical_files: usize,
    pub transactions: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} logical file(s), {} transaction(s), {} diagnostic(s)",
            self.logical_files,
            self.transactions,
            self.diagnostics.len()
        )
    }
}

// ============================================================================
// DECODE SCAN
// ============================================================================

/// One decoded logical file plus the byte offsets the scan found it at.
struct ScannedLogicalFile {
    header: Header,
    transactions: Vec<Transaction>,
    stored_checksum: Checksum,
    checksum_offset: u64,
}

/// Walk the full byte stream record by record, enforcing the positional
/// rules: every logical file opens with 'A' and closes with 'E'.
fn scan(
    bytes: &[u8],
    format: StorageFormat,
    transcoder: &dyn Transcoder,
) -> Result<Vec<ScannedLogicalFile>> {
    let block = format.block_size();
    let mut scanned = Vec::new();
    let mut pos: usize = 0;

    while pos < bytes.len() {
        // First record of a logical file must be a header.
        let disc = discriminator(&bytes[pos..], pos as u64)?;
        if disc != 'A' {
            return Err(DtausError::Corrupt {
                position: pos as u64,
                reason: format!("expected header record at start of logical file, found '{}'", disc),
            });
        }
        let header = decode_header(&bytes[pos..], pos as u64, format, transcoder)?;
        pos += HEADER_BLOCKS * block;

        let mut transactions = Vec::new();
        loop {
            if pos >= bytes.len() {
                return Err(DtausError::Corrupt {
                    position: pos as u64,
                    reason: "logical file not terminated by a checksum record".to_string(),
                });
            }
            match discriminator(&bytes[pos..], pos as u64)? {
                'C' => {
                    let (tx, consumed) =
                        decode_transaction(&bytes[pos..], pos as u64, format, transcoder)?;
                    transactions.push(tx);
                    pos += consumed;
                }
                'E' => {
                    let stored_checksum = decode_checksum(&bytes[pos..], pos as u64, format)?;
                    scanned.push(ScannedLogicalFile {
                        header,
                        transactions,
                        stored_checksum,
                        checksum_offset: pos as u64,
                    });
                    pos += CHECKSUM_BLOCKS * block;
                    break;
                }
                'A' => {
                    return Err(DtausError::Corrupt {
                        position: pos as u64,
                        reason: "header record before the previous checksum record".to_string(),
                    });
                }
                'D' => {
                    return Err(DtausError::Corrupt {
                        position: pos as u64,
                        reason: "continuation record without a parent transaction".to_string(),
                    });
                }
                other => {
                    return Err(DtausError::Corrupt {
                        position: pos as u64,
                        reason: format!("unexpected record discriminator '{}'", other),
                    });
                }
            }
        }
    }

    Ok(scanned)
}

fn check_block_alignment(length: u64, format: StorageFormat) -> Result<()> {
    let block = format.block_size();
    if length % block as u64 != 0 {
        return Err(DtausError::LengthMismatch {
            length,
            block_size: block,
        });
    }
    Ok(())
}

// ============================================================================
// PHYSICAL FILE
// ============================================================================

/// The full byte stream: zero or more logical files, back to back.
pub struct PhysicalFile<S: StorageResource> {
    storage: S,
    format: StorageFormat,
    transcoder: Arc<dyn Transcoder>,
    pipeline: Arc<ValidationPipeline>,
    logical_files: Vec<LogicalFile>,
    open_diagnostics: Diagnostics,
    structure_dirty: bool,
}

impl<S: StorageResource> PhysicalFile<S> {
    /// Open a physical file: decode everything, or fail without
    /// constructing anything. A zero-length resource opens as a valid
    /// empty physical file. Checksum mismatches do not fail the open;
    /// they land in `open_diagnostics()`.
    pub fn open(
        mut storage: S,
        format: StorageFormat,
        transcoder: Arc<dyn Transcoder>,
        pipeline: Arc<ValidationPipeline>,
    ) -> Result<Self> {
        let length = storage.len()?;
        check_block_alignment(length, format)?;

        let bytes = storage.read_all()?;
        let scanned = scan(&bytes, format, transcoder.as_ref())?;

        let mut open_diagnostics = Diagnostics::new();
        let mut logical_files = Vec::with_capacity(scanned.len());
        for (index, unit) in scanned.into_iter().enumerate() {
            let recomputed = Checksum::from_transactions(&unit.transactions);
            if recomputed != unit.stored_checksum {
                open_diagnostics.push(
                    "checksum",
                    format!(
                        "logical file {}: stored checksum record at byte {} disagrees with its transactions",
                        index, unit.checksum_offset
                    ),
                );
            }
            logical_files.push(LogicalFile::from_decoded(
                unit.header,
                unit.transactions,
                Arc::clone(&pipeline),
            ));
        }

        Ok(PhysicalFile {
            storage,
            format,
            transcoder,
            pipeline,
            logical_files,
            open_diagnostics,
            structure_dirty: false,
        })
    }

    /// New empty physical file on a blank resource.
    pub fn create(
        storage: S,
        format: StorageFormat,
        transcoder: Arc<dyn Transcoder>,
        pipeline: Arc<ValidationPipeline>,
    ) -> Self {
        PhysicalFile {
            storage,
            format,
            transcoder,
            pipeline,
            logical_files: Vec::new(),
            open_diagnostics: Diagnostics::new(),
            structure_dirty: false,
        }
    }

    pub fn format(&self) -> StorageFormat {
        self.format
    }

    /// Diagnostics gathered while opening (checksum mismatches only).
    pub fn open_diagnostics(&self) -> &Diagnostics {
        &self.open_diagnostics
    }

    // ========================================================================
    // LOGICAL FILES
    // ========================================================================

    pub fn logical_file_count(&self) -> usize {
        self.logical_files.len()
    }

    pub fn get_logical_file(&self, index: usize) -> Result<&LogicalFile> {
        self.logical_files
            .get(index)
            .ok_or(DtausError::IndexOutOfBounds {
                index,
                len: self.logical_files.len(),
            })
    }

    pub fn get_logical_file_mut(&mut self, index: usize) -> Result<&mut LogicalFile> {
        let len = self.logical_files.len();
        self.logical_files
            .get_mut(index)
            .ok_or(DtausError::IndexOutOfBounds { index, len })
    }

    /// Validate the header standalone, then append an empty logical
    /// file. Returns the new index.
    pub fn add_logical_file(&mut self, header: &Header) -> std::result::Result<usize, Diagnostics> {
        let diags = self.pipeline.validate_header(header, &[], true);
        diags.into_result()?;

        self.logical_files
            .push(LogicalFile::new(header.clone(), Arc::clone(&self.pipeline)));
        self.structure_dirty = true;
        Ok(self.logical_files.len() - 1)
    }

    /// Discard the logical file at `index` with all its records.
    /// Later logical files shift down by one.
    pub fn remove_logical_file(&mut self, index: usize) -> Result<()> {
        if index >= self.logical_files.len() {
            return Err(DtausError::IndexOutOfBounds {
                index,
                len: self.logical_files.len(),
            });
        }
        self.logical_files.remove(index);
        self.structure_dirty = true;
        Ok(())
    }

    /// True when any in-memory mutation has not been committed yet.
    pub fn is_dirty(&self) -> bool {
        self.structure_dirty || self.logical_files.iter().any(LogicalFile::is_dirty)
    }

    // ========================================================================
    // ANALYSE & COMMIT
    // ========================================================================

    /// Read-only full scan of the STORED bytes: re-decodes every record,
    /// recomputes every checksum, reports mismatches. Nothing - neither
    /// stored bytes nor in-memory state - is altered.
    pub fn analyse(&mut self) -> Result<AnalysisReport> {
        let length = self.storage.len()?;
        check_block_alignment(length, self.format)?;

        let bytes = self.storage.read_all()?;
        let scanned = scan(&bytes, self.format, self.transcoder.as_ref())?;

        let mut diagnostics = Vec::new();
        let mut transactions = 0;
        for (index, unit) in scanned.iter().enumerate() {
            transactions += unit.transactions.len();
            let recomputed = Checksum::from_transactions(&unit.transactions);
            if recomputed != unit.stored_checksum {
                diagnostics.push(Diagnostic::new(
                    "checksum",
                    format!(
                        "logical file {}: stored checksum record at byte {} disagrees with its transactions",
                        index, unit.checksum_offset
                    ),
                ));
            }
        }

        Ok(AnalysisReport {
            logical_files: scanned.len(),
            transactions,
            diagnostics,
        })
    }

    /// Serialize every logical file in order, recomputing all byte
    /// offsets from scratch, and write the full stream through to
    /// storage, truncating anything beyond the last checksum record.
    /// The checksum written is always the live, incrementally maintained
    /// one - committing a file that opened with a checksum mismatch
    /// repairs it.
    pub fn commit(&mut self) -> Result<()> {
        let mut out = Vec::new();
        for file in &self.logical_files {
            out.extend(encode_logical_file(
                file.header_ref(),
                file.transactions(),
                &file.checksum(),
                self.format,
                self.transcoder.as_ref(),
            )?);
        }

        self.storage.write_all(&out)?;

        for file in &mut self.logical_files {
            file.mark_clean();
        }
        self.structure_dirty = false;
        Ok(())
    }

    /// Byte offset each logical file will occupy after the next commit.
    /// Derived state - recomputed from the ordered list, never stored.
    pub fn logical_file_offsets(&self) -> Vec<u64> {
        let mut offsets = Vec::with_capacity(self.logical_files.len());
        let mut pos: u64 = 0;
        for file in &self.logical_files {
            offsets.push(pos);
            pos += encoded_logical_file_len(file.transactions(), self.format) as u64;
        }
        offsets
    }

    /// Release the container and hand the storage resource back.
    pub fn into_storage(self) -> S {
        self.storage
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::DtaCharset;
    use crate::directories::{CurrencyRegistry, PaymentTypeRegistry};
    use crate::entities::{LogicalFileType, PaymentType};
    use chrono::NaiveDate;

    fn transcoder() -> Arc<dyn Transcoder> {
        Arc::new(DtaCharset::new())
    }

    fn pipeline() -> Arc<ValidationPipeline> {
        Arc::new(ValidationPipeline::standard(
            Arc::new(CurrencyRegistry::new()),
            Arc::new(PaymentTypeRegistry::new()),
        ))
    }

    fn create_test_header(reference: u64) -> Header {
        Header::new(
            LogicalFileType::CreditCustomer,
            37050198,
            1234567890,
            "MÜLLER GMBH".to_string(),
            "EUR".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        )
        .with_reference_number(reference)
    }

    fn create_test_transaction(amount: u64) -> Transaction {
        Transaction::new(
            PaymentType::new(51, 0),
            amount,
            "EUR".to_string(),
            37050198,
            1234567890,
            "MÜLLER GMBH".to_string(),
            50010517,
            9876543210,
            "SCHMIDT AG".to_string(),
        )
    }

    fn empty_physical() -> PhysicalFile<MemoryStorage> {
        PhysicalFile::open(
            MemoryStorage::new(),
            StorageFormat::Disk,
            transcoder(),
            pipeline(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_zero_length_is_valid_and_clean() {
        let mut physical = empty_physical();

        assert_eq!(physical.logical_file_count(), 0);
        assert!(physical.open_diagnostics().is_empty());

        let report = physical.analyse().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.logical_files, 0);
    }

    #[test]
    fn test_open_unaligned_length_fails_before_decoding() {
        let storage = MemoryStorage::from_bytes(vec![b' '; 127]);
        let Err(err) = PhysicalFile::open(storage, StorageFormat::Disk, transcoder(), pipeline())
        else {
            panic!("open accepted an unaligned file");
        };

        assert!(matches!(
            err,
            DtausError::LengthMismatch {
                length: 127,
                block_size: 128
            }
        ));
    }

    #[test]
    fn test_commit_then_reopen_roundtrips() {
        let mut physical = empty_physical();

        let index = physical.add_logical_file(&create_test_header(1)).unwrap();
        let file = physical.get_logical_file_mut(index).unwrap();
        file.add_transaction(&create_test_transaction(100)).unwrap();
        file.add_transaction(
            &create_test_transaction(250).with_description("A").with_description("B").with_description("C"),
        )
        .unwrap();

        physical.add_logical_file(&create_test_header(2)).unwrap();

        physical.commit().unwrap();
        assert!(!physical.is_dirty());
        let storage = physical.into_storage();

        let reopened =
            PhysicalFile::open(storage, StorageFormat::Disk, transcoder(), pipeline()).unwrap();
        assert_eq!(reopened.logical_file_count(), 2);
        assert!(reopened.open_diagnostics().is_empty());

        let file = reopened.get_logical_file(0).unwrap();
        assert_eq!(file.transaction_count(), 2);
        assert_eq!(file.header(), create_test_header(1));
        assert_eq!(file.get_transaction(1).unwrap().descriptions.len(), 3);
        assert_eq!(file.checksum().amount_sum, 350);
    }

    #[test]
    fn test_blank_description_cannot_reach_committed_bytes() {
        let mut physical = empty_physical();
        let index = physical.add_logical_file(&create_test_header(1)).unwrap();
        let file = physical.get_logical_file_mut(index).unwrap();

        // A blank line would encode as an all-space slot that decode
        // reads back as padding; validation keeps it out of the file.
        let diags = file
            .add_transaction(&create_test_transaction(100).with_description(""))
            .unwrap_err();
        assert!(!diags.for_field("descriptions").is_empty());
        assert_eq!(file.transaction_count(), 0);

        file.add_transaction(&create_test_transaction(100).with_description("RECHNUNG"))
            .unwrap();
        physical.commit().unwrap();

        // Committed bytes reopen cleanly
        let reopened = PhysicalFile::open(
            physical.into_storage(),
            StorageFormat::Disk,
            transcoder(),
            pipeline(),
        )
        .unwrap();
        assert!(reopened.open_diagnostics().is_empty());
        assert_eq!(
            reopened
                .get_logical_file(0)
                .unwrap()
                .get_transaction(0)
                .unwrap()
                .descriptions,
            vec!["RECHNUNG".to_string()]
        );
    }

    #[test]
    fn test_remove_logical_file_shifts_indices() {
        let mut physical = empty_physical();
        for i in 0..4 {
            let index = physical.add_logical_file(&create_test_header(i + 1)).unwrap();
            physical
                .get_logical_file_mut(index)
                .unwrap()
                .add_transaction(&create_test_transaction(100 * (i + 1)))
                .unwrap();
        }

        physical.remove_logical_file(1).unwrap();

        assert_eq!(physical.logical_file_count(), 3);
        // Former index 2 now addressable at 1, content unchanged
        assert_eq!(
            physical.get_logical_file(1).unwrap().header().reference_number,
            Some(3)
        );
        assert_eq!(
            physical.get_logical_file(2).unwrap().header().reference_number,
            Some(4)
        );
    }

    #[test]
    fn test_invalid_header_rejected_without_structural_change() {
        let mut physical = empty_physical();
        physical.add_logical_file(&create_test_header(1)).unwrap();

        let mut bad = create_test_header(2);
        bad.currency = "XXX".to_string(); // unknown currency
        let diags = physical.add_logical_file(&bad).unwrap_err();
        assert!(!diags.is_empty());

        assert_eq!(physical.logical_file_count(), 1);
    }

    #[test]
    fn test_analyse_reports_checksum_mismatch_without_mutating() {
        let mut physical = empty_physical();
        let index = physical.add_logical_file(&create_test_header(1)).unwrap();
        physical
            .get_logical_file_mut(index)
            .unwrap()
            .add_transaction(&create_test_transaction(100))
            .unwrap();
        physical.commit().unwrap();

        // Corrupt the stored amount sum inside the 'E' record
        let mut bytes = physical.into_storage().into_bytes();
        let checksum_offset = bytes.len() - 128;
        bytes[checksum_offset + 12..checksum_offset + 29]
            .copy_from_slice(b"00000000000000999");
        let before = bytes.clone();

        let mut reopened = PhysicalFile::open(
            MemoryStorage::from_bytes(bytes),
            StorageFormat::Disk,
            transcoder(),
            pipeline(),
        )
        .unwrap();

        // Non-fatal: the file opened, the mismatch is a diagnostic
        assert_eq!(reopened.logical_file_count(), 1);
        assert!(!reopened.open_diagnostics().is_empty());

        let report = reopened.analyse().unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].message.contains("logical file 0"));

        // analyse() altered nothing
        assert_eq!(reopened.into_storage().as_bytes(), &before[..]);
    }

    #[test]
    fn test_commit_repairs_mismatched_checksum() {
        let mut physical = empty_physical();
        let index = physical.add_logical_file(&create_test_header(1)).unwrap();
        physical
            .get_logical_file_mut(index)
            .unwrap()
            .add_transaction(&create_test_transaction(100))
            .unwrap();
        physical.commit().unwrap();

        let mut bytes = physical.into_storage().into_bytes();
        let checksum_offset = bytes.len() - 128;
        bytes[checksum_offset + 12..checksum_offset + 29]
            .copy_from_slice(b"00000000000000999");

        let mut reopened = PhysicalFile::open(
            MemoryStorage::from_bytes(bytes),
            StorageFormat::Disk,
            transcoder(),
            pipeline(),
        )
        .unwrap();
        assert!(!reopened.open_diagnostics().is_empty());

        // The live checksum was recomputed from the transactions, so an
        // explicit commit writes a self-consistent file again.
        reopened.commit().unwrap();
        let report = reopened.analyse().unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn test_drain_to_zero_length() {
        let mut physical = empty_physical();

        for i in 0..10 {
            let index = physical.add_logical_file(&create_test_header(i + 1)).unwrap();
            let file = physical.get_logical_file_mut(index).unwrap();
            for j in 0..10 {
                file.add_transaction(&create_test_transaction(100 + j)).unwrap();
            }
        }
        physical.commit().unwrap();

        while physical.logical_file_count() > 0 {
            physical.remove_logical_file(0).unwrap();
        }
        physical.commit().unwrap();

        let mut storage = physical.into_storage();
        assert_eq!(storage.len().unwrap(), 0);
    }

    #[test]
    fn test_offsets_are_derived_from_order() {
        let mut physical = empty_physical();

        let i0 = physical.add_logical_file(&create_test_header(1)).unwrap();
        physical
            .get_logical_file_mut(i0)
            .unwrap()
            .add_transaction(&create_test_transaction(100))
            .unwrap();
        physical.add_logical_file(&create_test_header(2)).unwrap();

        // file 0: A(1) + C(2) + E(1) = 4 blocks; file 1 starts at 512
        assert_eq!(physical.logical_file_offsets(), vec![0, 512]);

        physical.remove_logical_file(0).unwrap();
        assert_eq!(physical.logical_file_offsets(), vec![0]);
    }

    #[test]
    fn test_tape_variant_roundtrips() {
        let mut physical = PhysicalFile::open(
            MemoryStorage::new(),
            StorageFormat::Tape,
            transcoder(),
            pipeline(),
        )
        .unwrap();

        let index = physical.add_logical_file(&create_test_header(1)).unwrap();
        physical
            .get_logical_file_mut(index)
            .unwrap()
            .add_transaction(&create_test_transaction(42))
            .unwrap();
        physical.commit().unwrap();

        let mut storage = physical.into_storage();
        assert_eq!(storage.len().unwrap() % 150, 0);

        let reopened = PhysicalFile::open(storage, StorageFormat::Tape, transcoder(), pipeline())
            .unwrap();
        assert_eq!(reopened.logical_file_count(), 1);
        assert_eq!(
            reopened.get_logical_file(0).unwrap().get_transaction(0).unwrap().amount,
            42
        );
    }
}
