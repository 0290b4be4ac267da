//! # Pharmacy Repository
//!
//! Database operations for pharmacies: lookups, opening-hours queries, and
//! mask listings.
//!
//! ## Open-Pharmacy Filtering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              "Which pharmacies are open Thur 14:00?"                    │
//! │                                                                         │
//! │  list_open(Some(Thur), Some(14:00))                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Load all pharmacies                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  For each: load its weekly intervals,                                  │
//! │            ask maskmart-core's schedule matcher                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Keep the ones with any covering interval                              │
//! │                                                                         │
//! │  list_open(None, _) or list_open(_, None)                              │
//! │       └── defined fallback: return ALL pharmacies, unfiltered          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The matcher itself is pure and lives in the core crate; this repository
//! only feeds it stable snapshots of interval rows.

use chrono::NaiveTime;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use maskmart_core::schedule::{self, parse_clock_time};
use maskmart_core::{CountOp, DayOfWeek, Mask, MaskSortBy, OpeningHours, Pharmacy, SortOrder};

/// Repository for pharmacy database operations.
#[derive(Debug, Clone)]
pub struct PharmacyRepository {
    pool: SqlitePool,
}

/// Raw opening-hours row; day and times are TEXT in storage and converted
/// into domain types on the way out.
#[derive(Debug, sqlx::FromRow)]
struct OpeningHoursRow {
    id: i64,
    pharmacy_id: i64,
    day_of_week: String,
    open_time: String,
    close_time: String,
}

impl OpeningHoursRow {
    fn into_domain(self) -> DbResult<OpeningHours> {
        // The schema CHECK constraint guards these columns; a failure here
        // means corrupted storage, not caller input.
        let day_of_week = self
            .day_of_week
            .parse::<DayOfWeek>()
            .map_err(|e| DbError::Internal(e.to_string()))?;
        let open_time =
            parse_clock_time(&self.open_time).map_err(|e| DbError::Internal(e.to_string()))?;
        let close_time =
            parse_clock_time(&self.close_time).map_err(|e| DbError::Internal(e.to_string()))?;

        Ok(OpeningHours {
            id: self.id,
            pharmacy_id: self.pharmacy_id,
            day_of_week,
            open_time,
            close_time,
        })
    }
}

impl PharmacyRepository {
    /// Creates a new PharmacyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PharmacyRepository { pool }
    }

    /// Gets a pharmacy by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Pharmacy))` - Pharmacy found
    /// * `Ok(None)` - Pharmacy not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Pharmacy>> {
        let pharmacy = sqlx::query_as::<_, Pharmacy>(
            "SELECT id, name, cash_balance FROM pharmacies WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pharmacy)
    }

    /// Lists all pharmacies, ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Pharmacy>> {
        let pharmacies = sqlx::query_as::<_, Pharmacy>(
            "SELECT id, name, cash_balance FROM pharmacies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(pharmacies)
    }

    /// Counts pharmacies.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pharmacies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Fetches a pharmacy's weekly opening intervals.
    pub async fn opening_hours(&self, pharmacy_id: i64) -> DbResult<Vec<OpeningHours>> {
        let rows = sqlx::query_as::<_, OpeningHoursRow>(
            "SELECT id, pharmacy_id, day_of_week, open_time, close_time \
             FROM pharmacy_opening_hours WHERE pharmacy_id = ?1 ORDER BY id",
        )
        .bind(pharmacy_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OpeningHoursRow::into_domain).collect()
    }

    /// Lists pharmacies open at the given day and clock time.
    ///
    /// ## Fallback
    /// When either `day` or `time` is absent the query degrades, by
    /// contract, to an unfiltered "list all" - this is a defined behavior
    /// the listing endpoints depend on, not an error.
    pub async fn list_open(
        &self,
        day: Option<DayOfWeek>,
        time: Option<NaiveTime>,
    ) -> DbResult<Vec<Pharmacy>> {
        let pharmacies = self.list_all().await?;

        let (day, time) = match (day, time) {
            (Some(day), Some(time)) => (day, time),
            _ => return Ok(pharmacies),
        };

        debug!(%day, %time, "Filtering pharmacies by opening hours");

        let mut open = Vec::new();
        for pharmacy in pharmacies {
            let hours = self.opening_hours(pharmacy.id).await?;
            if schedule::is_open_at(&hours, day, time) {
                open.push(pharmacy);
            }
        }

        Ok(open)
    }

    /// Lists a pharmacy's masks, sorted by name or price.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let masks = repo
    ///     .list_masks(5, MaskSortBy::Price, SortOrder::Desc)
    ///     .await?;
    /// ```
    pub async fn list_masks(
        &self,
        pharmacy_id: i64,
        sort_by: MaskSortBy,
        sort_order: SortOrder,
    ) -> DbResult<Vec<Mask>> {
        // ORDER BY targets can't be bound as parameters; pick from a fixed
        // set of statements instead.
        let sql = match (sort_by, sort_order) {
            (MaskSortBy::Name, SortOrder::Asc) => {
                "SELECT id, pharmacy_id, name, price FROM masks \
                 WHERE pharmacy_id = ?1 ORDER BY name ASC"
            }
            (MaskSortBy::Name, SortOrder::Desc) => {
                "SELECT id, pharmacy_id, name, price FROM masks \
                 WHERE pharmacy_id = ?1 ORDER BY name DESC"
            }
            (MaskSortBy::Price, SortOrder::Asc) => {
                "SELECT id, pharmacy_id, name, price FROM masks \
                 WHERE pharmacy_id = ?1 ORDER BY price ASC"
            }
            (MaskSortBy::Price, SortOrder::Desc) => {
                "SELECT id, pharmacy_id, name, price FROM masks \
                 WHERE pharmacy_id = ?1 ORDER BY price DESC"
            }
        };

        let masks = sqlx::query_as::<_, Mask>(sql)
            .bind(pharmacy_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(masks)
    }

    /// Lists pharmacies with more (or fewer) than `count` masks priced
    /// within `[price_min, price_max]`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // Pharmacies with more than 3 masks between $10 and $50
    /// let result = repo
    ///     .filter_by_mask_count(CountOp::MoreThan, 3, 10.0, 50.0)
    ///     .await?;
    /// ```
    pub async fn filter_by_mask_count(
        &self,
        count_op: CountOp,
        count: i64,
        price_min: f64,
        price_max: f64,
    ) -> DbResult<Vec<Pharmacy>> {
        let sql = match count_op {
            CountOp::MoreThan => {
                "SELECT p.id, p.name, p.cash_balance \
                 FROM pharmacies p \
                 JOIN masks m ON m.pharmacy_id = p.id \
                 WHERE m.price BETWEEN ?1 AND ?2 \
                 GROUP BY p.id \
                 HAVING COUNT(m.id) > ?3 \
                 ORDER BY p.id"
            }
            CountOp::LessThan => {
                "SELECT p.id, p.name, p.cash_balance \
                 FROM pharmacies p \
                 JOIN masks m ON m.pharmacy_id = p.id \
                 WHERE m.price BETWEEN ?1 AND ?2 \
                 GROUP BY p.id \
                 HAVING COUNT(m.id) < ?3 \
                 ORDER BY p.id"
            }
        };

        let pharmacies = sqlx::query_as::<_, Pharmacy>(sql)
            .bind(price_min)
            .bind(price_max)
            .bind(count)
            .fetch_all(&self.pool)
            .await?;

        Ok(pharmacies)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
