//! # maskmart-core: Pure Business Logic for MaskMart
//!
//! This crate is the **heart** of MaskMart. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       MaskMart Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              API / Presentation (external collaborator)         │   │
//! │  │    list open pharmacies ──► purchase masks ──► history views   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ maskmart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │  ledger   │  │ schedule  │                  │   │
//! │  │   │ Pharmacy  │  │ funds gate│  │ DayOfWeek │                  │   │
//! │  │   │ LineItem  │  │ batch sum │  │ intervals │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   maskmart-db (Database Layer)                  │   │
//! │  │            SQLite queries, migrations, purchase engine          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Pharmacy, Mask, User, PurchaseLineItem, etc.)
//! - [`ledger`] - Pure purchase rules: line-item validation and the funds gate
//! - [`schedule`] - Opening-hours matching ("is this pharmacy open at …")
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use maskmart_core::schedule::{is_open_at, parse_clock_time};
//! use maskmart_core::{DayOfWeek, OpeningHours};
//!
//! let hours = vec![OpeningHours {
//!     id: 1,
//!     pharmacy_id: 1,
//!     day_of_week: DayOfWeek::Mon,
//!     open_time: parse_clock_time("08:00").unwrap(),
//!     close_time: parse_clock_time("17:00").unwrap(),
//! }];
//!
//! // Open exactly at the opening instant (bounds are inclusive)
//! assert!(is_open_at(&hours, DayOfWeek::Mon, parse_clock_time("08:00").unwrap()));
//! assert!(!is_open_at(&hours, DayOfWeek::Tue, parse_clock_time("09:00").unwrap()));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod schedule;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use maskmart_core::Pharmacy` instead of
// `use maskmart_core::types::Pharmacy`

pub use error::{CoreError, ValidationError};
pub use types::*;
