// 📦 Logical File Container - one batch: header + transactions + checksum
//
// All structural mutation is check-then-apply: the validation pipeline
// runs to completion first, and only an empty diagnostics set lets the
// mutation touch the model. The checksum is maintained incrementally
// through add/subtract - never recomputed during normal operation.

use crate::entities::{Checksum, Header, Transaction};
use crate::error::{DtausError, Result};
use crate::validation::{Diagnostics, ValidationPipeline, ValidationResult};
use std::sync::Arc;

/// One self-contained batch within a physical file. Two logical modes:
/// a freshly decoded file is a read-only view; the first applied
/// mutation marks it dirty until the next commit.
pub struct LogicalFile {
    header: Header,
    transactions: Vec<Transaction>,
    checksum: Checksum,
    pipeline: Arc<ValidationPipeline>,
    dirty: bool,
}

impl LogicalFile {
    /// New empty logical file. The caller (the physical container)
    /// validates the header before constructing.
    pub(crate) fn new(header: Header, pipeline: Arc<ValidationPipeline>) -> Self {
        LogicalFile {
            header,
            transactions: Vec::new(),
            checksum: Checksum::new(),
            pipeline,
            dirty: true,
        }
    }

    /// Rebuild from decoded records. The live checksum is always the one
    /// recomputed from the transactions; when the stored record disagreed,
    /// the mismatch is the caller's to report (analyse) and the next
    /// commit writes the recomputed value.
    pub(crate) fn from_decoded(
        header: Header,
        transactions: Vec<Transaction>,
        pipeline: Arc<ValidationPipeline>,
    ) -> Self {
        let checksum = Checksum::from_transactions(&transactions);
        LogicalFile {
            header,
            transactions,
            checksum,
            pipeline,
            dirty: false,
        }
    }

    // ========================================================================
    // HEADER
    // ========================================================================

    /// Copy of the header; holding it cannot bypass validation.
    pub fn header(&self) -> Header {
        self.header.clone()
    }

    /// Replace the header. Re-validates currency compatibility against
    /// every currently held transaction before anything changes.
    pub fn set_header(&mut self, header: &Header) -> ValidationResult {
        let diags = self
            .pipeline
            .validate_header(header, &self.transactions, false);
        diags.into_result()?;

        self.header = header.clone();
        self.dirty = true;
        Ok(())
    }

    // ========================================================================
    // TRANSACTIONS
    // ========================================================================

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Copy of the transaction at `index`.
    pub fn get_transaction(&self, index: usize) -> Result<Transaction> {
        self.transactions
            .get(index)
            .cloned()
            .ok_or(DtausError::IndexOutOfBounds {
                index,
                len: self.transactions.len(),
            })
    }

    /// Validate, then append and fold into the checksum.
    pub fn add_transaction(&mut self, tx: &Transaction) -> ValidationResult {
        let diags = self.pipeline.validate_transaction(&self.header, tx, true);
        diags.into_result()?;

        self.checksum.add(tx);
        self.transactions.push(tx.clone());
        self.dirty = true;
        Ok(())
    }

    /// Validate, then replace at `index`, swapping the old contribution
    /// for the new one in the checksum as a single step.
    pub fn set_transaction(
        &mut self,
        index: usize,
        tx: &Transaction,
    ) -> Result<ValidationResult> {
        if index >= self.transactions.len() {
            return Err(DtausError::IndexOutOfBounds {
                index,
                len: self.transactions.len(),
            });
        }

        let diags = self.pipeline.validate_transaction(&self.header, tx, false);
        if !diags.is_empty() {
            return Ok(Err(diags));
        }

        self.checksum.subtract(&self.transactions[index]);
        self.checksum.add(tx);
        self.transactions[index] = tx.clone();
        self.dirty = true;
        Ok(Ok(()))
    }

    /// Subtract from the checksum, remove, and hand back the removed
    /// transaction. Indices of later transactions shift down by one.
    pub fn remove_transaction(&mut self, index: usize) -> Result<Transaction> {
        if index >= self.transactions.len() {
            return Err(DtausError::IndexOutOfBounds {
                index,
                len: self.transactions.len(),
            });
        }

        let removed = self.transactions.remove(index);
        self.checksum.subtract(&removed);
        self.dirty = true;
        Ok(removed)
    }

    // ========================================================================
    // CHECKSUM & STATE
    // ========================================================================

    /// Copy of the incrementally maintained checksum.
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// True when in-memory mutations have not been flushed yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn header_ref(&self) -> &Header {
        &self.header
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directories::{CurrencyRegistry, PaymentTypeRegistry};
    use crate::entities::{LogicalFileType, PaymentType, MAX_DESCRIPTIONS};
    use chrono::NaiveDate;

    fn standard_pipeline() -> Arc<ValidationPipeline> {
        Arc::new(ValidationPipeline::standard(
            Arc::new(CurrencyRegistry::new()),
            Arc::new(PaymentTypeRegistry::new()),
        ))
    }

    fn create_test_header() -> Header {
        Header::new(
            LogicalFileType::CreditCustomer,
            37050198,
            1234567890,
            "MÜLLER GMBH".to_string(),
            "EUR".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        )
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

    fn create_test_file() -> LogicalFile {
        LogicalFile::new(create_test_header(), standard_pipeline())
    }

    #[test]
    fn test_add_transaction_updates_checksum() {
        let mut file = create_test_file();
        file.add_transaction(&create_test_transaction(100)).unwrap();
        file.add_transaction(&create_test_transaction(250)).unwrap();

        let checksum = file.checksum();
        assert_eq!(checksum.transaction_count, 2);
        assert_eq!(checksum.amount_sum, 350);
        assert_eq!(
            checksum,
            Checksum::from_transactions(&[
                create_test_transaction(100),
                create_test_transaction(250),
            ])
        );
    }

    #[test]
    fn test_checksum_invariant_over_mutation_sequence() {
        let mut file = create_test_file();
        for amount in [100, 200, 300, 400] {
            file.add_transaction(&create_test_transaction(amount)).unwrap();
        }
        file.remove_transaction(1).unwrap();
        file.set_transaction(0, &create_test_transaction(9999))
            .unwrap()
            .unwrap();
        file.remove_transaction(2).unwrap();

        let expected = Checksum::from_transactions(file.transactions());
        assert_eq!(file.checksum(), expected);
    }

    #[test]
    fn test_failed_add_leaves_container_untouched() {
        let mut file = create_test_file();
        file.add_transaction(&create_test_transaction(100)).unwrap();

        let header_before = file.header();
        let checksum_before = file.checksum();

        // Too many descriptions -> rejected
        let mut bad = create_test_transaction(200);
        for i in 0..=MAX_DESCRIPTIONS {
            bad = bad.with_description(&format!("ZEILE {}", i));
        }
        let diags = file.add_transaction(&bad).unwrap_err();
        assert!(!diags.is_empty());

        assert_eq!(file.transaction_count(), 1);
        assert_eq!(file.header(), header_before);
        assert_eq!(file.checksum(), checksum_before);
    }

    #[test]
    fn test_failed_set_header_leaves_container_untouched() {
        let mut file = create_test_file();
        file.add_transaction(&create_test_transaction(100)).unwrap();
        let before = file.header();

        let mut bad = create_test_header();
        bad.customer_name = String::new();
        assert!(file.set_header(&bad).is_err());

        assert_eq!(file.header(), before);
        assert_eq!(file.transaction_count(), 1);
    }

    #[test]
    fn test_set_transaction_swaps_checksum_contribution() {
        let mut file = create_test_file();
        file.add_transaction(&create_test_transaction(100)).unwrap();
        file.add_transaction(&create_test_transaction(200)).unwrap();

        file.set_transaction(0, &create_test_transaction(150))
            .unwrap()
            .unwrap();

        assert_eq!(file.checksum().amount_sum, 350);
        assert_eq!(file.get_transaction(0).unwrap().amount, 150);
    }

    #[test]
    fn test_remove_returns_removed_and_shifts_indices() {
        let mut file = create_test_file();
        file.add_transaction(&create_test_transaction(100)).unwrap();
        file.add_transaction(&create_test_transaction(200)).unwrap();
        file.add_transaction(&create_test_transaction(300)).unwrap();

        let removed = file.remove_transaction(1).unwrap();
        assert_eq!(removed.amount, 200);

        assert_eq!(file.transaction_count(), 2);
        assert_eq!(file.get_transaction(1).unwrap().amount, 300);
    }

    #[test]
    fn test_index_out_of_bounds() {
        let mut file = create_test_file();
        file.add_transaction(&create_test_transaction(100)).unwrap();

        assert!(matches!(
            file.get_transaction(1),
            Err(DtausError::IndexOutOfBounds { index: 1, len: 1 })
        ));
        assert!(matches!(
            file.set_transaction(5, &create_test_transaction(1)),
            Err(DtausError::IndexOutOfBounds { index: 5, .. })
        ));
        assert!(matches!(
            file.remove_transaction(1),
            Err(DtausError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_decoded_file_starts_clean() {
        let txs = vec![create_test_transaction(100)];
        let mut file =
            LogicalFile::from_decoded(create_test_header(), txs, standard_pipeline());
        assert!(!file.is_dirty());

        file.add_transaction(&create_test_transaction(200)).unwrap();
        assert!(file.is_dirty());
    }

    #[test]
    fn test_header_copy_cannot_bypass_validation() {
        let mut file = create_test_file();
        let mut copy = file.header();
        copy.customer_name = String::new();

        // Mutating the copy changed nothing in the container
        assert_eq!(file.header().customer_name, "MÜLLER GMBH");

        // The only way in is set_header, and it validates
        assert!(file.set_header(&copy).is_err());
    }
}
