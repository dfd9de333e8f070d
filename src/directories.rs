// 📖 Reference Directories - currency and payment-type lookups
//
// The container core never hardcodes business reference data; it asks
// these two read-only directory traits. The in-memory registries below
// are the reference implementations, seeded with the standard German
// payment-batch data so the crate is usable out of the box.

use crate::entities::{LogicalFileType, PaymentType};
use chrono::NaiveDate;
use std::collections::HashMap;

// ============================================================================
// DIRECTORY TRAITS
// ============================================================================

/// Currency validity lookup: is this currency registered as valid on
/// the given date? Consulted by the validation pipeline.
pub trait CurrencyDirectory: Send + Sync {
    fn is_valid(&self, currency: &str, date: NaiveDate) -> bool;
}

/// Payment-type compatibility lookup: may this payment-type descriptor
/// appear inside a logical file of the given type?
pub trait PaymentTypeDirectory: Send + Sync {
    fn is_compatible(&self, payment_type: &PaymentType, file_type: LogicalFileType) -> bool;
}

// ============================================================================
// CURRENCY REGISTRY
// ============================================================================

/// One validity window; open ends mean "since ever" / "until further notice".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValidityWindow {
    valid_from: Option<NaiveDate>,
    valid_until: Option<NaiveDate>,
}

impl ValidityWindow {
    fn contains(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.valid_from {
            if date < from {
                return false;
            }
        }
        if let Some(until) = self.valid_until {
            if date > until {
                return false;
            }
        }
        true
    }
}

/// In-memory currency directory with per-currency validity windows.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    windows: HashMap<String, Vec<ValidityWindow>>,
}

impl CurrencyRegistry {
    /// Standard registry: EUR since 1999-01-01, DEM until 2001-12-31.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("EUR", NaiveDate::from_ymd_opt(1999, 1, 1), None);
        registry.register("DEM", None, NaiveDate::from_ymd_opt(2001, 12, 31));
        registry
    }

    pub fn empty() -> Self {
        CurrencyRegistry {
            windows: HashMap::new(),
        }
    }

    /// Register a validity window for a currency. A currency may carry
    /// several disjoint windows.
    pub fn register(
        &mut self,
        currency: &str,
        valid_from: Option<NaiveDate>,
        valid_until: Option<NaiveDate>,
    ) {
        self.windows
            .entry(currency.to_string())
            .or_default()
            .push(ValidityWindow {
                valid_from,
                valid_until,
            });
    }

    pub fn count(&self) -> usize {
        self.windows.len()
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrencyDirectory for CurrencyRegistry {
    fn is_valid(&self, currency: &str, date: NaiveDate) -> bool {
        self.windows
            .get(currency)
            .map(|windows| windows.iter().any(|w| w.contains(date)))
            .unwrap_or(false)
    }
}

// ============================================================================
// PAYMENT TYPE REGISTRY
// ============================================================================

/// In-memory payment-type directory: maps a payment-type key to the
/// file types it may appear in. The extension digits do not influence
/// compatibility in the standard set; a custom registry can pin them
/// by registering (key, extension) pairs.
#[derive(Debug, Clone)]
pub struct PaymentTypeRegistry {
    /// Per key: allowed file types for any extension.
    by_key: HashMap<u8, Vec<LogicalFileType>>,
    /// Per (key, extension): overrides `by_key` when present.
    by_key_ext: HashMap<(u8, u16), Vec<LogicalFileType>>,
}

impl PaymentTypeRegistry {
    /// Standard registry: debit keys live in debit files, credit keys in
    /// credit files.
    pub fn new() -> Self {
        use LogicalFileType::*;
        let mut registry = Self::empty();

        let debit = [DebitCustomer, DebitBank];
        let credit = [CreditCustomer, CreditBank];

        // Debit keys: direct debit (04 Abbuchung, 05 Einzug)
        registry.register_key(4, &debit);
        registry.register_key(5, &debit);

        // Credit keys: transfer (51), salary (53), capital-forming (54),
        // public-sector transfer (56)
        registry.register_key(51, &credit);
        registry.register_key(53, &credit);
        registry.register_key(54, &credit);
        registry.register_key(56, &credit);

        registry
    }

    pub fn empty() -> Self {
        PaymentTypeRegistry {
            by_key: HashMap::new(),
            by_key_ext: HashMap::new(),
        }
    }

    /// Register a payment-type key as legal in the given file types,
    /// whatever its extension digits.
    pub fn register_key(&mut self, key: u8, file_types: &[LogicalFileType]) {
        self.by_key.insert(key, file_types.to_vec());
    }

    /// Register one exact (key, extension) combination, overriding the
    /// key-level entry.
    pub fn register_key_ext(&mut self, key: u8, extension: u16, file_types: &[LogicalFileType]) {
        self.by_key_ext.insert((key, extension), file_types.to_vec());
    }

    pub fn count(&self) -> usize {
        self.by_key.len() + self.by_key_ext.len()
    }
}

impl Default for PaymentTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentTypeDirectory for PaymentTypeRegistry {
    fn is_compatible(&self, payment_type: &PaymentType, file_type: LogicalFileType) -> bool {
        if let Some(allowed) = self
            .by_key_ext
            .get(&(payment_type.key, payment_type.extension))
        {
            return allowed.contains(&file_type);
        }
        self.by_key
            .get(&payment_type.key)
            .map(|allowed| allowed.contains(&file_type))
            .unwrap_or(false)
    }
}

// ============================================================================
// TESTS
// ============================================================================
