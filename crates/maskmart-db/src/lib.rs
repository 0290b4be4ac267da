//! # maskmart-db: Database Layer for MaskMart
//!
//! This crate provides database access for the MaskMart pharmacy
//! marketplace. It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MaskMart Data Flow                               │
//! │                                                                         │
//! │  API collaborator (purchase request, open-pharmacy query, ...)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    maskmart-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (pharmacy.rs, │    │  (embedded)  │  │   │
//! │  │   │               │    │  user.rs,     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  purchase.rs) │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                         SQLite Database                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (pharmacy, user, purchase)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use maskmart_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/maskmart.db")).await?;
//!
//! // The transactional purchase engine
//! let outcome = db.purchases().execute_purchase(user_id, &items).await?;
//!
//! // Open-pharmacy filtering
//! let open = db.pharmacies().list_open(Some(day), Some(time)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::pharmacy::PharmacyRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::user::UserRepository;
