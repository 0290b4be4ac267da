//! # Repository Module
//!
//! Database repository implementations for MaskMart.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  db.purchases().execute_purchase(user_id, &items)              │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  PurchaseRepository                                                    │
//! │  ├── execute_purchase(&self, user_id, items)                           │
//! │  └── execute_purchase_one(&self, user_id, item)                        │
//! │       │                                                                 │
//! │       │  One SQL transaction, all-or-nothing                           │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Balance mutation has exactly one code path                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PharmacyRepository`] - Pharmacy reads, opening-hours filtering, mask listings
//! - [`UserRepository`] - User reads, purchase history, spend aggregates
//! - [`PurchaseRepository`] - The transactional purchase engine
//!
//! [`PharmacyRepository`]: pharmacy::PharmacyRepository
//! [`UserRepository`]: user::UserRepository
//! [`PurchaseRepository`]: purchase::PurchaseRepository

pub mod pharmacy;
pub mod purchase;
pub mod user;

// =============================================================================
// Shared Test Fixtures
// =============================================================================
