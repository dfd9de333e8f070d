// 📋 Header - first record of a logical file
//
// Carries the batch-level data: who submits the file, when it was created,
// when it should execute, which currency, and the file-type code that
// constrains every payment type inside the batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// LOGICAL FILE TYPE
// ============================================================================

/// Closed set of four file-type codes: debit/credit crossed with
/// customer/bank submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalFileType {
    /// `GK` - credit batch submitted by a customer
    CreditCustomer,
    /// `LK` - debit batch submitted by a customer
    DebitCustomer,
    /// `GB` - credit batch submitted by a bank
    CreditBank,
    /// `LB` - debit batch submitted by a bank
    DebitBank,
}

impl LogicalFileType {
    /// Two-letter wire code.
    pub fn code(&self) -> &'static str {
        match self {
            LogicalFileType::CreditCustomer => "GK",
            LogicalFileType::DebitCustomer => "LK",
            LogicalFileType::CreditBank => "GB",
            LogicalFileType::DebitBank => "LB",
        }
    }

    /// Parse a wire code; unknown codes are format corruption at the caller.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "GK" => Some(LogicalFileType::CreditCustomer),
            "LK" => Some(LogicalFileType::DebitCustomer),
            "GB" => Some(LogicalFileType::CreditBank),
            "LB" => Some(LogicalFileType::DebitBank),
            _ => None,
        }
    }

    pub fn is_debit(&self) -> bool {
        matches!(self, LogicalFileType::DebitCustomer | LogicalFileType::DebitBank)
    }

    pub fn is_credit(&self) -> bool {
        !self.is_debit()
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogicalFileType::CreditCustomer => "Credit (customer)",
            LogicalFileType::DebitCustomer => "Debit (customer)",
            LogicalFileType::CreditBank => "Credit (bank)",
            LogicalFileType::DebitBank => "Debit (bank)",
        }
    }
}

// ============================================================================
// HEADER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    /// Submitting account number (10 digits).
    pub account_number: u64,
    /// Submitting bank code (8 digits).
    pub bank_code: u32,
    /// Bank-internal secondary code; optional.
    pub bank_data_code: Option<u32>,
    /// ISO alpha-3 currency of the whole batch.
    pub currency: String,
    /// Customer (submitter) name, legacy repertoire.
    pub customer_name: String,
    /// Optional submitter reference number (10 digits).
    pub reference_number: Option<u64>,
    /// Creation date of the batch.
    pub create_date: NaiveDate,
    /// Optional requested execution date.
    pub execution_date: Option<NaiveDate>,
    pub file_type: LogicalFileType,
}

impl Header {
    /// New header with required fields; optionals via `with_*`.
    pub fn new(
        file_type: LogicalFileType,
        bank_code: u32,
        account_number: u64,
        customer_name: String,
        currency: String,
        create_date: NaiveDate,
    ) -> Self {
        Header {
            account_number,
            bank_code,
            bank_data_code: None,
            currency,
            customer_name,
            reference_number: None,
            create_date,
            execution_date: None,
            file_type,
        }
    }

    /// Builder pattern: add execution date
    pub fn with_execution_date(mut self, date: NaiveDate) -> Self {
        self.execution_date = Some(date);
        self
    }

    /// Builder pattern: add reference number
    pub fn with_reference_number(mut self, reference: u64) -> Self {
        self.reference_number = Some(reference);
        self
    }

    /// Builder pattern: add secondary bank-data code
    pub fn with_bank_data_code(mut self, code: u32) -> Self {
        self.bank_data_code = Some(code);
        self
    }

    /// The date currency validity is checked against: the execution date
    /// when one is scheduled, otherwise the creation date.
    pub fn effective_date(&self) -> NaiveDate {
        self.execution_date.unwrap_or(self.create_date)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_file_type_codes_roundtrip() {
        for ft in [
            LogicalFileType::CreditCustomer,
            LogicalFileType::DebitCustomer,
            LogicalFileType::CreditBank,
            LogicalFileType::DebitBank,
        ] {
            assert_eq!(LogicalFileType::from_code(ft.code()), Some(ft));
        }
        assert_eq!(LogicalFileType::from_code("XX"), None);
    }

    #[test]
    fn test_file_type_direction() {
        assert!(LogicalFileType::CreditCustomer.is_credit());
        assert!(LogicalFileType::CreditBank.is_credit());
        assert!(LogicalFileType::DebitCustomer.is_debit());
        assert!(LogicalFileType::DebitBank.is_debit());
    }

    #[test]
    fn test_effective_date_prefers_execution_date() {
        let header = create_test_header();
        assert_eq!(header.effective_date(), header.create_date);

        let exec = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let header = header.with_execution_date(exec);
        assert_eq!(header.effective_date(), exec);
    }

    #[test]
    fn test_structural_equality() {
        let a = create_test_header();
        let b = create_test_header();
        assert_eq!(a, b);

        let c = b.clone().with_reference_number(99);
        assert_ne!(a, c);
    }
}
