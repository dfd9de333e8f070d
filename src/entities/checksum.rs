// ➕ Checksum - incrementally maintained batch aggregates
//
// Four counters over the transactions of one logical file:
// count, sum of amounts, sum of target accounts, sum of target bank codes.
// The container keeps this current through add/subtract on every mutation;
// recomputation from scratch happens only for corruption detection at load.

use crate::entities::Transaction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    pub transaction_count: i64,
    pub amount_sum: i64,
    pub target_account_sum: i64,
    pub target_bank_code_sum: i64,
}

impl Checksum {
    pub fn new() -> Self {
        Checksum::default()
    }

    /// Accumulate one transaction.
    pub fn add(&mut self, tx: &Transaction) {
        self.transaction_count += 1;
        self.amount_sum += tx.amount as i64;
        self.target_account_sum += tx.target_account_number as i64;
        self.target_bank_code_sum += i64::from(tx.target_bank_code);
    }

    /// Remove one transaction's contribution. Callers must only subtract
    /// transactions previously added - the container guarantees this by
    /// only ever subtracting what it currently holds.
    pub fn subtract(&mut self, tx: &Transaction) {
        self.transaction_count -= 1;
        self.amount_sum -= tx.amount as i64;
        self.target_account_sum -= tx.target_account_number as i64;
        self.target_bank_code_sum -= i64::from(tx.target_bank_code);
    }

    /// Recompute from a transaction list. Load-time verification only.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut checksum = Checksum::new();
        for tx in transactions {
            checksum.add(tx);
        }
        checksum
    }

    pub fn is_empty(&self) -> bool {
        *self == Checksum::default()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PaymentType;

    fn create_test_transaction(amount: u64, account: u64, bank: u32) -> Transaction {
        Transaction::new(
            PaymentType::new(51, 0),
            amount,
            "EUR".to_string(),
            37050198,
            1111111111,
            "ABSENDER".to_string(),
            bank,
            account,
            "EMPFÄNGER".to_string(),
        )
    }

    #[test]
    fn test_add_accumulates_all_components() {
        let mut checksum = Checksum::new();
        checksum.add(&create_test_transaction(100, 222, 33));
        checksum.add(&create_test_transaction(50, 444, 66));

        assert_eq!(checksum.transaction_count, 2);
        assert_eq!(checksum.amount_sum, 150);
        assert_eq!(checksum.target_account_sum, 666);
        assert_eq!(checksum.target_bank_code_sum, 99);
    }

    #[test]
    fn test_add_then_subtract_is_identity() {
        let mut checksum = Checksum::new();
        checksum.add(&create_test_transaction(777, 123, 45));
        let before = checksum;

        let tx = create_test_transaction(999999999, 9876543210, 50010517);
        checksum.add(&tx);
        checksum.subtract(&tx);

        assert_eq!(checksum, before);
    }

    #[test]
    fn test_from_transactions_matches_incremental() {
        let txs = vec![
            create_test_transaction(100, 1, 2),
            create_test_transaction(200, 3, 4),
            create_test_transaction(300, 5, 6),
        ];

        let mut incremental = Checksum::new();
        for tx in &txs {
            incremental.add(tx);
        }

        assert_eq!(Checksum::from_transactions(&txs), incremental);
    }

    #[test]
    fn test_empty() {
        let mut checksum = Checksum::new();
        assert!(checksum.is_empty());

        let tx = create_test_transaction(1, 1, 1);
        checksum.add(&tx);
        assert!(!checksum.is_empty());

        checksum.subtract(&tx);
        assert!(checksum.is_empty());
    }
}
