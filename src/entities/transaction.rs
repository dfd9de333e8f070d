// 💸 Transaction - one payment instruction within a logical file
//
// Amount is an unsigned integer in the minor currency unit (cents).
// Amount, target account and target bank code feed the checksum; the
// description list overflows into continuation records past two lines.

use serde::{Deserialize, Serialize};

/// Hard cap on description lines per transaction.
pub const MAX_DESCRIPTIONS: usize = 14;

// ============================================================================
// PAYMENT TYPE
// ============================================================================

/// Payment-type descriptor: a 2-digit key plus a 3-digit extension.
/// Which combinations are legal for which file type is the payment-type
/// directory's call, not this struct's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentType {
    pub key: u8,
    pub extension: u16,
}

impl PaymentType {
    pub fn new(key: u8, extension: u16) -> Self {
        PaymentType { key, extension }
    }

    /// Wire form, e.g. key 51 extension 0 -> "51000".
    pub fn code(&self) -> String {
        format!("{:02}{:03}", self.key, self.extension)
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub payment_type: PaymentType,
    /// Amount in the minor currency unit, max 11 digits on the wire.
    pub amount: u64,
    /// ISO alpha-3 currency.
    pub currency: String,
    /// Optional reference number (10 digits).
    pub reference_number: Option<u64>,
    /// Ordered description lines, at most `MAX_DESCRIPTIONS`.
    pub descriptions: Vec<String>,
    /// First involved bank; optional.
    pub primary_bank_code: Option<u32>,
    /// Ordering party's bank code.
    pub executive_bank_code: u32,
    /// Ordering party's account number.
    pub executive_account_number: u64,
    /// Payee/payer bank code - feeds the checksum.
    pub target_bank_code: u32,
    /// Payee/payer account number - feeds the checksum.
    pub target_account_number: u64,
    pub executive_name: String,
    pub executive_name_ext: Option<String>,
    pub target_name: String,
    pub target_name_ext: Option<String>,
}

impl Transaction {
    /// New transaction with required fields; optionals via `with_*`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        payment_type: PaymentType,
        amount: u64,
        currency: String,
        executive_bank_code: u32,
        executive_account_number: u64,
        executive_name: String,
        target_bank_code: u32,
        target_account_number: u64,
        target_name: String,
    ) -> Self {
        Transaction {
            payment_type,
            amount,
            currency,
            reference_number: None,
            descriptions: Vec::new(),
            primary_bank_code: None,
            executive_bank_code,
            executive_account_number,
            target_bank_code,
            target_account_number,
            executive_name,
            executive_name_ext: None,
            target_name,
            target_name_ext: None,
        }
    }

    /// Builder pattern: add a description line
    pub fn with_description(mut self, line: &str) -> Self {
        self.descriptions.push(line.to_string());
        self
    }

    /// Builder pattern: add reference number
    pub fn with_reference_number(mut self, reference: u64) -> Self {
        self.reference_number = Some(reference);
        self
    }

    /// Builder pattern: add primary bank code
    pub fn with_primary_bank_code(mut self, code: u32) -> Self {
        self.primary_bank_code = Some(code);
        self
    }

    /// Builder pattern: add target name extension
    pub fn with_target_name_ext(mut self, ext: &str) -> Self {
        self.target_name_ext = Some(ext.to_string());
        self
    }

    /// Builder pattern: add executive name extension
    pub fn with_executive_name_ext(mut self, ext: &str) -> Self {
        self.executive_name_ext = Some(ext.to_string());
        self
    }

    /// Description lines past the two inline slots; these go to
    /// continuation records on the wire.
    pub fn overflow_descriptions(&self) -> &[String] {
        if self.descriptions.len() <= 2 {
            &[]
        } else {
            &self.descriptions[2..]
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
