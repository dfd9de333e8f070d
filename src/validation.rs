// ✅ Validation Pipeline - business rules gate every mutation
//
// Every check collects ALL violations for the candidate object into a
// Diagnostics set keyed by field name; emptiness - not exception absence -
// signals success. The containers run the pipeline to completion BEFORE
// touching any state, so a failed mutation leaves everything untouched.

use crate::directories::{CurrencyDirectory, PaymentTypeDirectory};
use crate::entities::{Header, Transaction, MAX_DESCRIPTIONS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Execution date may not precede the create date nor exceed it by more
/// than this many calendar days.
pub const SCHEDULE_WINDOW_DAYS: i64 = 15;

/// Largest amount the 11-digit wire field can carry.
pub const MAX_AMOUNT: u64 = 99_999_999_999;

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// One field-scoped violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub field: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Accumulating collection of violations. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.items.push(Diagnostic::new(field, message));
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// All violations recorded against one field.
    pub fn for_field(&self, field: &str) -> Vec<&Diagnostic> {
        self.items.iter().filter(|d| d.field == field).collect()
    }

    /// Ok(()) when empty, Err(self) otherwise.
    pub fn into_result(self) -> ValidationResult {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

pub type ValidationResult = Result<(), Diagnostics>;

// ============================================================================
// VALIDATOR PROTOCOLS
// ============================================================================

/// Context handed to every header validator.
pub struct HeaderContext<'a> {
    pub header: &'a Header,
    /// Transactions currently held by the logical file (empty on create).
    pub transactions: &'a [Transaction],
    /// True when creating a new logical file, false on header replacement.
    pub is_new: bool,
    pub currencies: &'a dyn CurrencyDirectory,
}

/// Context handed to every transaction validator.
pub struct TransactionContext<'a> {
    /// Header of the logical file the transaction is entering.
    pub header: &'a Header,
    pub transaction: &'a Transaction,
    pub is_new: bool,
    pub currencies: &'a dyn CurrencyDirectory,
    pub payment_types: &'a dyn PaymentTypeDirectory,
}

/// A pure header check: reads the context, appends violations.
pub trait HeaderValidator: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, ctx: &HeaderContext<'_>, out: &mut Diagnostics);
}

/// A pure transaction check: reads the context, appends violations.
pub trait TransactionValidator: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, ctx: &TransactionContext<'_>, out: &mut Diagnostics);
}

// ============================================================================
// HEADER VALIDATORS
// ============================================================================

/// All non-optional header fields must be present.
pub struct HeaderCompleteness;

impl HeaderValidator for HeaderCompleteness {
    fn name(&self) -> &'static str {
        "header_completeness"
    }

    fn validate(&self, ctx: &HeaderContext<'_>, out: &mut Diagnostics) {
        let h = ctx.header;
        if h.bank_code == 0 {
            out.push("bank_code", "required field is empty");
        }
        if h.account_number == 0 {
            out.push("account_number", "required field is empty");
        }
        if h.customer_name.is_empty() {
            out.push("customer_name", "required field is empty");
        }
        if h.currency.is_empty() {
            out.push("currency", "required field is empty");
        }
    }
}

/// Header currency must be valid on the creation date.
pub struct HeaderCurrencyWindow;

impl HeaderValidator for HeaderCurrencyWindow {
    fn name(&self) -> &'static str {
        "header_currency_window"
    }

    fn validate(&self, ctx: &HeaderContext<'_>, out: &mut Diagnostics) {
        let h = ctx.header;
        if h.currency.is_empty() {
            return; // completeness already flagged it
        }
        if !ctx.currencies.is_valid(&h.currency, h.create_date) {
            out.push(
                "currency",
                format!("currency '{}' is not valid on {}", h.currency, h.create_date),
            );
        }
    }
}

/// Execution date must lie within [create_date, create_date + 15 days].
pub struct ScheduleWindow;

impl HeaderValidator for ScheduleWindow {
    fn name(&self) -> &'static str {
        "schedule_window"
    }

    fn validate(&self, ctx: &HeaderContext<'_>, out: &mut Diagnostics) {
        let h = ctx.header;
        let execution = match h.execution_date {
            Some(d) => d,
            None => return,
        };

        if execution < h.create_date {
            out.push(
                "execution_date",
                format!(
                    "execution date {} precedes create date {}",
                    execution, h.create_date
                ),
            );
        } else if (execution - h.create_date).num_days() > SCHEDULE_WINDOW_DAYS {
            out.push(
                "execution_date",
                format!(
                    "execution date {} is more than {} days after create date {}",
                    execution, SCHEDULE_WINDOW_DAYS, h.create_date
                ),
            );
        }
    }
}

/// Replacing a header must not invalidate any held transaction's currency:
/// every transaction's currency has to stay valid on the new effective date.
pub struct HeldCurrencyWindow;

impl HeaderValidator for HeldCurrencyWindow {
    fn name(&self) -> &'static str {
        "held_currency_window"
    }

    fn validate(&self, ctx: &HeaderContext<'_>, out: &mut Diagnostics) {
        if ctx.is_new {
            return;
        }
        let effective = ctx.header.effective_date();
        for (i, tx) in ctx.transactions.iter().enumerate() {
            if !ctx.currencies.is_valid(&tx.currency, effective) {
                out.push(
                    "currency",
                    format!(
                        "held transaction {} uses currency '{}' which is not valid on {}",
                        i, tx.currency, effective
                    ),
                );
            }
        }
    }
}

// ============================================================================
// TRANSACTION VALIDATORS
// ============================================================================

/// All non-optional transaction fields must be present.
pub struct TransactionCompleteness;

impl TransactionValidator for TransactionCompleteness {
    fn name(&self) -> &'static str {
        "transaction_completeness"
    }

    fn validate(&self, ctx: &TransactionContext<'_>, out: &mut Diagnostics) {
        let tx = ctx.transaction;
        if tx.executive_bank_code == 0 {
            out.push("executive_bank_code", "required field is empty");
        }
        if tx.executive_account_number == 0 {
            out.push("executive_account_number", "required field is empty");
        }
        if tx.target_bank_code == 0 {
            out.push("target_bank_code", "required field is empty");
        }
        if tx.target_account_number == 0 {
            out.push("target_account_number", "required field is empty");
        }
        if tx.executive_name.is_empty() {
            out.push("executive_name", "required field is empty");
        }
        if tx.target_name.is_empty() {
            out.push("target_name", "required field is empty");
        }
        if tx.currency.is_empty() {
            out.push("currency", "required field is empty");
        }
    }
}

/// At most 14 description lines per transaction, and every line must
/// carry text. A blank line would encode as an all-space slot that the
/// wire format cannot tell apart from padding, so it is rejected here
/// before it can enter a file.
pub struct DescriptionCount;

impl TransactionValidator for DescriptionCount {
    fn name(&self) -> &'static str {
        "description_count"
    }

    fn validate(&self, ctx: &TransactionContext<'_>, out: &mut Diagnostics) {
        let count = ctx.transaction.descriptions.len();
        if count > MAX_DESCRIPTIONS {
            out.push(
                "descriptions",
                format!("{} description lines exceed the maximum of {}", count, MAX_DESCRIPTIONS),
            );
        }
        for (i, line) in ctx.transaction.descriptions.iter().enumerate() {
            if line.trim().is_empty() {
                out.push(
                    "descriptions",
                    format!("description line {} is blank", i + 1),
                );
            }
        }
    }
}

/// Amount must fit the 11-digit wire field and carry at least one cent.
pub struct AmountRange;

impl TransactionValidator for AmountRange {
    fn name(&self) -> &'static str {
        "amount_range"
    }

    fn validate(&self, ctx: &TransactionContext<'_>, out: &mut Diagnostics) {
        let amount = ctx.transaction.amount;
        if amount == 0 {
            out.push("amount", "amount must be greater than zero");
        }
        if amount > MAX_AMOUNT {
            out.push(
                "amount",
                format!("amount {} exceeds the wire maximum {}", amount, MAX_AMOUNT),
            );
        }
    }
}

/// Transaction currency must be valid on the logical file's effective date.
pub struct TransactionCurrencyWindow;

impl TransactionValidator for TransactionCurrencyWindow {
    fn name(&self) -> &'static str {
        "transaction_currency_window"
    }

    fn validate(&self, ctx: &TransactionContext<'_>, out: &mut Diagnostics) {
        let tx = ctx.transaction;
        if tx.currency.is_empty() {
            return; // completeness already flagged it
        }
        let effective = ctx.header.effective_date();
        if !ctx.currencies.is_valid(&tx.currency, effective) {
            out.push(
                "currency",
                format!("currency '{}' is not valid on {}", tx.currency, effective),
            );
        }
    }
}

/// Payment type must be compatible with the logical file's type code.
pub struct PaymentTypeCompatibility;

impl TransactionValidator for PaymentTypeCompatibility {
    fn name(&self) -> &'static str {
        "payment_type_compatibility"
    }

    fn validate(&self, ctx: &TransactionContext<'_>, out: &mut Diagnostics) {
        let pt = &ctx.transaction.payment_type;
        let file_type = ctx.header.file_type;
        if !ctx.payment_types.is_compatible(pt, file_type) {
            out.push(
                "payment_type",
                format!(
                    "payment type {} is not allowed in a {} file",
                    pt.code(),
                    file_type.code()
                ),
            );
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Statically composed, ordered list of validators. New rules are added
/// by extending the lists, not by subclassing anything.
pub struct ValidationPipeline {
    currencies: Arc<dyn CurrencyDirectory>,
    payment_types: Arc<dyn PaymentTypeDirectory>,
    header_validators: Vec<Box<dyn HeaderValidator>>,
    transaction_validators: Vec<Box<dyn TransactionValidator>>,
}

impl ValidationPipeline {
    /// The standard rule set in its canonical order.
    pub fn standard(
        currencies: Arc<dyn CurrencyDirectory>,
        payment_types: Arc<dyn PaymentTypeDirectory>,
    ) -> Self {
        ValidationPipeline {
            currencies,
            payment_types,
            header_validators: vec![
                Box::new(HeaderCompleteness),
                Box::new(HeaderCurrencyWindow),
                Box::new(ScheduleWindow),
                Box::new(HeldCurrencyWindow),
            ],
            transaction_validators: vec![
                Box::new(TransactionCompleteness),
                Box::new(DescriptionCount),
                Box::new(AmountRange),
                Box::new(TransactionCurrencyWindow),
                Box::new(PaymentTypeCompatibility),
            ],
        }
    }

    /// Builder pattern: append a custom header rule
    pub fn with_header_validator(mut self, validator: Box<dyn HeaderValidator>) -> Self {
        self.header_validators.push(validator);
        self
    }

    /// Builder pattern: append a custom transaction rule
    pub fn with_transaction_validator(mut self, validator: Box<dyn TransactionValidator>) -> Self {
        self.transaction_validators.push(validator);
        self
    }

    /// Run every header rule; all violations are collected, none aborts.
    pub fn validate_header(
        &self,
        header: &Header,
        transactions: &[Transaction],
        is_new: bool,
    ) -> Diagnostics {
        let ctx = HeaderContext {
            header,
            transactions,
            is_new,
            currencies: self.currencies.as_ref(),
        };
        let mut out = Diagnostics::new();
        for validator in &self.header_validators {
            validator.validate(&ctx, &mut out);
        }
        out
    }

    /// Run every transaction rule; all violations are collected.
    pub fn validate_transaction(
        &self,
        header: &Header,
        transaction: &Transaction,
        is_new: bool,
    ) -> Diagnostics {
        let ctx = TransactionContext {
            header,
            transaction,
            is_new,
            currencies: self.currencies.as_ref(),
            payment_types: self.payment_types.as_ref(),
        };
        let mut out = Diagnostics::new();
        for validator in &self.transaction_validators {
            validator.validate(&ctx, &mut out);
        }
        out
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directories::{CurrencyRegistry, PaymentTypeRegistry};
    use crate::entities::{LogicalFileType, PaymentType};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard_pipeline() -> ValidationPipeline {
        ValidationPipeline::standard(
            Arc::new(CurrencyRegistry::new()),
            Arc::new(PaymentTypeRegistry::new()),
        )
    }

    fn create_test_header() -> Header {
        Header::new(
            LogicalFileType::CreditCustomer,
            37050198,
            1234567890,
            "MÜLLER GMBH".to_string(),
            "EUR".to_string(),
            date(2024, 3, 7),
        )
    }

    fn create_test_transaction() -> Transaction {
        Transaction::new(
            PaymentType::new(51, 0),
            125000,
            "EUR".to_string(),
            37050198,
            1234567890,
            "MÜLLER GMBH".to_string(),
            50010517,
            9876543210,
            "SCHMIDT AG".to_string(),
        )
    }

    #[test]
    fn test_valid_header_passes() {
        let pipeline = standard_pipeline();
        let diags = pipeline.validate_header(&create_test_header(), &[], true);
        assert!(diags.is_empty(), "unexpected: {}", diags);
    }

    #[test]
    fn test_incomplete_header_collects_all_violations() {
        let pipeline = standard_pipeline();
        let mut header = create_test_header();
        header.customer_name = String::new();
        header.bank_code = 0;

        let diags = pipeline.validate_header(&header, &[], true);
        assert_eq!(diags.len(), 2);
        assert!(!diags.for_field("customer_name").is_empty());
        assert!(!diags.for_field("bank_code").is_empty());
    }

    #[test]
    fn test_currency_invalid_on_create_date() {
        let pipeline = standard_pipeline();
        let mut header = create_test_header();
        header.currency = "DEM".to_string(); // expired 2001

        let diags = pipeline.validate_header(&header, &[], true);
        assert!(!diags.for_field("currency").is_empty());
    }

    #[test]
    fn test_schedule_window_boundaries() {
        let pipeline = standard_pipeline();
        let base = create_test_header();

        // create + 15 days: valid
        let header = base.clone().with_execution_date(date(2024, 3, 22));
        assert!(pipeline.validate_header(&header, &[], true).is_empty());

        // create + 16 days: rejected
        let header = base.clone().with_execution_date(date(2024, 3, 23));
        let diags = pipeline.validate_header(&header, &[], true);
        assert!(!diags.for_field("execution_date").is_empty());

        // before create: rejected
        let header = base.with_execution_date(date(2024, 3, 6));
        let diags = pipeline.validate_header(&header, &[], true);
        assert!(!diags.for_field("execution_date").is_empty());
    }

    #[test]
    fn test_header_replacement_checks_held_transactions() {
        let mut currencies = CurrencyRegistry::new();
        currencies.register("XTS", None, Some(date(2024, 3, 10)));
        let pipeline = ValidationPipeline::standard(
            Arc::new(currencies),
            Arc::new(PaymentTypeRegistry::new()),
        );

        let mut tx = create_test_transaction();
        tx.currency = "XTS".to_string();

        // Replacement header pushes the effective date past XTS validity
        let header = create_test_header().with_execution_date(date(2024, 3, 14));
        let diags = pipeline.validate_header(&header, &[tx.clone()], false);
        assert!(!diags.for_field("currency").is_empty());

        // Same header on a NEW logical file has no held transactions to break
        let header = create_test_header().with_execution_date(date(2024, 3, 14));
        let diags = pipeline.validate_header(&header, &[tx], true);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_valid_transaction_passes() {
        let pipeline = standard_pipeline();
        let header = create_test_header();
        let diags = pipeline.validate_transaction(&header, &create_test_transaction(), true);
        assert!(diags.is_empty(), "unexpected: {}", diags);
    }

    #[test]
    fn test_description_count_boundary() {
        let pipeline = standard_pipeline();
        let header = create_test_header();

        let mut tx = create_test_transaction();
        for i in 0..MAX_DESCRIPTIONS {
            tx = tx.with_description(&format!("ZEILE {}", i));
        }
        assert!(pipeline.validate_transaction(&header, &tx, true).is_empty());

        // Line 15 crosses the cap
        tx = tx.with_description("ZEILE 15");
        let diags = pipeline.validate_transaction(&header, &tx, true);
        assert!(!diags.for_field("descriptions").is_empty());
    }

    #[test]
    fn test_blank_description_line_rejected() {
        let pipeline = standard_pipeline();
        let header = create_test_header();

        let tx = create_test_transaction().with_description("");
        let diags = pipeline.validate_transaction(&header, &tx, true);
        assert!(!diags.for_field("descriptions").is_empty());

        // Whitespace-only encodes as all spaces too
        let tx = create_test_transaction()
            .with_description("RECHNUNG 2024-001")
            .with_description("   ");
        let diags = pipeline.validate_transaction(&header, &tx, true);
        assert!(!diags.for_field("descriptions").is_empty());
    }

    #[test]
    fn test_amount_range() {
        let pipeline = standard_pipeline();
        let header = create_test_header();

        let mut tx = create_test_transaction();
        tx.amount = 0;
        let diags = pipeline.validate_transaction(&header, &tx, true);
        assert!(!diags.for_field("amount").is_empty());

        tx.amount = MAX_AMOUNT;
        assert!(pipeline.validate_transaction(&header, &tx, true).is_empty());

        tx.amount = MAX_AMOUNT + 1;
        let diags = pipeline.validate_transaction(&header, &tx, true);
        assert!(!diags.for_field("amount").is_empty());
    }

    #[test]
    fn test_payment_type_file_type_compatibility() {
        let pipeline = standard_pipeline();
        let header = create_test_header(); // GK - credit customer

        // Direct debit key inside a credit file
        let mut tx = create_test_transaction();
        tx.payment_type = PaymentType::new(5, 0);
        let diags = pipeline.validate_transaction(&header, &tx, true);
        assert!(!diags.for_field("payment_type").is_empty());
    }

    #[test]
    fn test_custom_validator_extends_pipeline() {
        struct NoWeekendExecution;
        impl HeaderValidator for NoWeekendExecution {
            fn name(&self) -> &'static str {
                "no_weekend_execution"
            }
            fn validate(&self, ctx: &HeaderContext<'_>, out: &mut Diagnostics) {
                use chrono::Datelike;
                if let Some(d) = ctx.header.execution_date {
                    if matches!(d.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
                        out.push("execution_date", "execution on a weekend");
                    }
                }
            }
        }

        let pipeline = standard_pipeline().with_header_validator(Box::new(NoWeekendExecution));
        // 2024-03-09 is a Saturday
        let header = create_test_header().with_execution_date(date(2024, 3, 9));
        let diags = pipeline.validate_header(&header, &[], true);
        assert!(!diags.for_field("execution_date").is_empty());
    }
}
