//! # Domain Types
//!
//! Core domain types used throughout MaskMart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Pharmacy     │   │      Mask       │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name           │   │  pharmacy_id    │   │  name           │       │
//! │  │  cash_balance   │   │  name, price    │   │  cash_balance   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │  OpeningHours   │   │ PurchaseLineItem │   │ PurchaseRecord  │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  day_of_week    │   │  transient,      │   │  persisted,     │      │
//! │  │  open_time      │   │  caller-supplied │   │  append-only    │      │
//! │  │  close_time     │   │                  │   │                 │      │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every persisted entity carries an integer `id` assigned by the storage
//! layer. Balances are a single floating-point unit; there is deliberately
//! no currency or precision modeling beyond that.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// =============================================================================
// Day Of Week
// =============================================================================

/// Day-of-week token used by opening hours.
///
/// ## Compatibility Note
/// The token set is fixed as `Mon,Tue,Wed,Thur,Fri,Sat,Sun`. Thursday is
/// abbreviated irregularly (`Thur`, four letters) and that exact token is
/// load-bearing: it is stored in the database and appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thur,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    /// All seven days, in week order.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thur,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    /// Returns the canonical token for this day.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Mon => "Mon",
            DayOfWeek::Tue => "Tue",
            DayOfWeek::Wed => "Wed",
            DayOfWeek::Thur => "Thur",
            DayOfWeek::Fri => "Fri",
            DayOfWeek::Sat => "Sat",
            DayOfWeek::Sun => "Sun",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mon" => Ok(DayOfWeek::Mon),
            "Tue" => Ok(DayOfWeek::Tue),
            "Wed" => Ok(DayOfWeek::Wed),
            "Thur" => Ok(DayOfWeek::Thur),
            "Fri" => Ok(DayOfWeek::Fri),
            "Sat" => Ok(DayOfWeek::Sat),
            "Sun" => Ok(DayOfWeek::Sun),
            other => Err(ValidationError::MalformedDay {
                token: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Pharmacy
// =============================================================================

/// A pharmacy selling masks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Pharmacy {
    /// Unique identifier assigned by the storage layer.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Monetary balance. Only ever increased by purchase credits.
    pub cash_balance: f64,
}

// =============================================================================
// Opening Hours
// =============================================================================

/// One contiguous period a pharmacy is open.
///
/// Invariant: `open_time <= close_time`. Intervals spanning midnight are
/// not modeled; a row with `close_time < open_time` is ill-formed and can
/// never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub id: i64,
    pub pharmacy_id: i64,
    pub day_of_week: DayOfWeek,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

// =============================================================================
// Mask
// =============================================================================

/// A mask product listed by a pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Mask {
    pub id: i64,

    /// Owning pharmacy.
    pub pharmacy_id: i64,

    /// Display name shown in listings and purchase records.
    pub name: String,

    /// Listed unit price. Purchases do NOT derive their amount from this;
    /// the caller supplies `transaction_amount` directly.
    pub price: f64,
}

// =============================================================================
// User
// =============================================================================

/// A user buying masks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Monetary balance. Must never go negative after a committed purchase.
    pub cash_balance: f64,
}

// =============================================================================
// Purchase Line Item
// =============================================================================

fn default_quantity() -> i64 {
    1
}

/// One caller-supplied unit within a purchase batch (transient).
///
/// ## Wire Shape
/// ```json
/// {
///   "pharmacy_id": 3,
///   "mask_id": 10,
///   "mask_name": "MaskT (green) (10 per pack)",
///   "quantity": 2,
///   "transaction_amount": 80.0,
///   "transaction_date": "2023-01-01T10:00:00Z"
/// }
/// ```
///
/// `mask_id` may be omitted; the free-text `mask_name` is kept for audit
/// purposes either way. `transaction_amount` is the value to move and is
/// independent of `quantity` × unit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLineItem {
    /// Target pharmacy.
    pub pharmacy_id: i64,

    /// Optional mask reference. When present, must exist under `pharmacy_id`.
    #[serde(default)]
    pub mask_id: Option<i64>,

    /// Descriptive mask name, stored verbatim on the record.
    #[serde(default)]
    pub mask_name: Option<String>,

    /// Units purchased. Must be >= 1.
    #[serde(default = "default_quantity")]
    pub quantity: i64,

    /// Monetary value to move from the user to the pharmacy. Must be >= 0.
    pub transaction_amount: f64,

    /// Caller-supplied timestamp; never overridden by a server-side clock.
    pub transaction_date: DateTime<Utc>,
}

// =============================================================================
// Purchase Record
// =============================================================================

/// A materialized [`PurchaseLineItem`] tagged with its owning user (persisted,
/// append-only).
///
/// Created exclusively by the purchase engine, and only when the owning
/// transaction commits. Never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseRecord {
    pub id: i64,
    pub user_id: i64,
    pub pharmacy_id: i64,
    /// Null when the line item carried no mask reference, or when the mask
    /// was deleted later (FK is SET NULL).
    pub mask_id: Option<i64>,
    pub mask_name: Option<String>,
    pub quantity: i64,
    pub transaction_amount: f64,
    pub transaction_date: DateTime<Utc>,
}

// =============================================================================
// Purchase Outcome
// =============================================================================

/// Result of a committed purchase batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    /// The user's balance after all debits.
    pub user_balance: f64,

    /// Identities of the created purchase records, in line-item order.
    pub record_ids: Vec<i64>,
}

// =============================================================================
// Query Helper Types
// =============================================================================

/// Sort key for a pharmacy's mask listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskSortBy {
    Name,
    Price,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Comparison operator for the mask-count filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountOp {
    /// Pharmacies with strictly more than N matching masks.
    #[serde(rename = "gt")]
    MoreThan,
    /// Pharmacies with strictly fewer than N matching masks.
    #[serde(rename = "lt")]
    LessThan,
}

/// One row of the top-spenders ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopSpender {
    pub user_id: i64,
    pub user_name: String,
    pub total_spent: f64,
}

/// Aggregate of purchases within a date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Sum of quantities.
    pub total_masks: i64,
    /// Sum of transaction amounts.
    pub total_dollar: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
