//! # Ledger Rules
//!
//! The pure half of the purchase engine: everything about a purchase batch
//! that can be decided without touching storage.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Purchase Validation Layers                           │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (pure, before any mutation)                      │
//! │  ├── every amount >= 0, every quantity >= 1                            │
//! │  └── funds gate: total vs. the user's balance snapshot                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: maskmart-db purchase engine (transactional)                  │
//! │  ├── referential checks (pharmacy exists, mask under pharmacy)         │
//! │  └── guarded debit re-validates funds against the committed balance    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite constraints (NOT NULL, FK, CHECK)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The batch total is computed from caller-supplied `transaction_amount`
//! fields only. It is never re-derived from mask unit price × quantity;
//! callers are trusted on the amount, by contract.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::PurchaseLineItem;

/// Validates the caller-controlled fields of a purchase batch.
///
/// ## Rules
/// - every `transaction_amount` >= 0 (negative amounts would turn a
///   purchase into a withdrawal from the pharmacy)
/// - every `quantity` >= 1
///
/// Batch length is unbounded; affordability is the only whole-batch limit.
/// Runs before any mutation; a failing batch has no side effects.
pub fn validate_line_items(items: &[PurchaseLineItem]) -> CoreResult<()> {
    for item in items {
        if item.transaction_amount < 0.0 {
            return Err(ValidationError::NegativeAmount {
                amount: item.transaction_amount,
            }
            .into());
        }
        if item.quantity < 1 {
            return Err(ValidationError::NonPositiveQuantity {
                quantity: item.quantity,
            }
            .into());
        }
    }

    Ok(())
}

/// Sums the transaction amounts of a batch.
///
/// This is the amount the user must afford as a whole: the funds gate is
/// all-or-nothing, never per item.
pub fn batch_total(items: &[PurchaseLineItem]) -> f64 {
    items.iter().map(|item| item.transaction_amount).sum()
}

/// The funds gate: checks the batch total against a balance snapshot.
///
/// A total exactly equal to the balance passes (the user may spend down to
/// zero). Failing this check is definitive; the caller must not retry.
pub fn check_funds(available: f64, required: f64) -> CoreResult<()> {
    if available < required {
        return Err(CoreError::InsufficientFunds {
            required,
            available,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(pharmacy_id: i64, amount: f64, quantity: i64) -> PurchaseLineItem {
        PurchaseLineItem {
            pharmacy_id,
            mask_id: None,
            mask_name: Some("True Barrier (green) (3 per pack)".to_string()),
            quantity,
            transaction_amount: amount,
            transaction_date: Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_valid_batch_passes() {
        let items = vec![item(1, 40.0, 2), item(2, 30.0, 1)];
        assert!(validate_line_items(&items).is_ok());
    }

    #[test]
    fn test_zero_amount_is_allowed() {
        // Free masks exist (promotions); zero moves no money but is recorded
        assert!(validate_line_items(&[item(1, 0.0, 1)]).is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = validate_line_items(&[item(1, -5.0, 1)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert!(validate_line_items(&[item(1, 10.0, 0)]).is_err());
        assert!(validate_line_items(&[item(1, 10.0, -2)]).is_err());
    }

    #[test]
    fn test_batch_length_is_unbounded() {
        let items: Vec<_> = (0..500).map(|i| item(i, 1.0, 1)).collect();
        assert!(validate_line_items(&items).is_ok());
        assert_eq!(batch_total(&items), 500.0);
    }

    #[test]
    fn test_batch_total() {
        let items = vec![item(1, 40.0, 1), item(2, 30.0, 1), item(1, 0.5, 1)];
        assert_eq!(batch_total(&items), 70.5);
        assert_eq!(batch_total(&[]), 0.0);
    }

    #[test]
    fn test_funds_gate_boundary() {
        // Spending the exact balance is allowed
        assert!(check_funds(100.0, 100.0).is_ok());
        assert!(check_funds(100.0, 99.99).is_ok());

        let err = check_funds(50.0, 60.0).unwrap_err();
        match err {
            CoreError::InsufficientFunds {
                required,
                available,
            } => {
                assert_eq!(required, 60.0);
                assert_eq!(available, 50.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
