//! # Error Types
//!
//! Domain-specific error types for maskmart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  maskmart-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations (funds gate)          │
//! │  └── ValidationError  - Input validation failures (bad amount, day)    │
//! │                                                                         │
//! │  maskmart-db errors (separate crate)                                   │
//! │  └── DbError          - Not-found, conflicts, storage failures         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → API collaborator        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, ids, tokens)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are definitive:
/// the caller must not retry them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The user's balance does not cover the full batch.
    ///
    /// ## When This Occurs
    /// - The summed `transaction_amount` of a purchase batch exceeds the
    ///   user's balance at the start of the transaction
    /// - A concurrent purchase committed first and consumed the funds
    ///
    /// The check is all-or-nothing: a batch is never partially affordable.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller-supplied input doesn't meet requirements.
/// Used for early validation before any mutation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A line item carries a negative transaction amount.
    #[error("transaction amount must not be negative, got {amount}")]
    NegativeAmount { amount: f64 },

    /// A line item carries a zero or negative quantity.
    #[error("quantity must be at least 1, got {quantity}")]
    NonPositiveQuantity { quantity: i64 },

    /// A day-of-week token outside `Mon,Tue,Wed,Thur,Fri,Sat,Sun`.
    ///
    /// Note the irregular Thursday abbreviation: `Thur`, not `Thu`.
    #[error("'{token}' is not a day of week (expected one of Mon,Tue,Wed,Thur,Fri,Sat,Sun)")]
    MalformedDay { token: String },

    /// A clock-time string that is not `HH`, `HH:MM` or `HH:MM:SS`.
    #[error("'{value}' is not a clock time (expected HH, HH:MM or HH:MM:SS)")]
    MalformedTime { value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
