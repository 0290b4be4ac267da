//! # Purchase Repository
//!
//! The transactional purchase engine: the only code path that moves money
//! between users and pharmacies, and the only writer of purchase records.
//!
//! ## Purchase Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Purchase Execution                                  │
//! │                                                                         │
//! │  1. PURE VALIDATION (before any mutation)                              │
//! │     └── every amount >= 0, every quantity >= 1                         │
//! │                                                                         │
//! │  2. BEGIN TRANSACTION                                                  │
//! │     ├── snapshot user balance        → NotFound(user) if absent        │
//! │     ├── funds gate: total vs snapshot → InsufficientFunds              │
//! │     └── guarded debit re-validates against the committed balance       │
//! │                                                                         │
//! │  3. PER LINE ITEM (input order)                                        │
//! │     ├── credit pharmacy              → NotFound(pharmacy) if absent    │
//! │     ├── mask under that pharmacy?    → NotFound(mask) on mismatch      │
//! │     └── append purchase record                                         │
//! │                                                                         │
//! │  4. COMMIT  (any failure above ⇒ the whole transaction rolls back)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! SQLite is a single-writer store: two purchase transactions can never
//! interleave their check-and-apply phases. When a second writer collides
//! while this transaction upgrades to a write, SQLite reports busy/locked;
//! that surfaces as [`DbError::Conflict`] and is retried here a bounded
//! number of times. A retried attempt re-reads the committed balance, so
//! two jointly-unaffordable batches end as exactly one success and one
//! `InsufficientFunds` - never both, and never a negative balance.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use maskmart_core::{ledger, PurchaseLineItem, PurchaseOutcome};

/// How many times a busy/locked attempt is retried before the `Conflict`
/// surfaces to the caller.
const CONFLICT_RETRIES: u32 = 2;

/// Repository for purchase execution and purchase-history reads.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Executes a purchase batch as a single all-or-nothing unit.
    ///
    /// ## Arguments
    /// * `user_id` - The buying user
    /// * `items` - Ordered line items; applied in input order
    ///
    /// ## Returns
    /// The user's post-purchase balance and the created record ids.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - negative amount or non-positive quantity
    /// * `NotFound` - user, pharmacy, or mask absent (or mask under a
    ///   different pharmacy); nothing is persisted
    /// * `Domain(InsufficientFunds)` - batch total exceeds the balance;
    ///   checked up front, so no prefix of the batch ever posts
    /// * `Conflict` - writer contention that survived the internal retries
    pub async fn execute_purchase(
        &self,
        user_id: i64,
        items: &[PurchaseLineItem],
    ) -> DbResult<PurchaseOutcome> {
        // Caller-input validation is pure and runs exactly once, before
        // anything touches the database.
        ledger::validate_line_items(items)?;
        let total = ledger::batch_total(items);

        debug!(user_id, items = items.len(), total, "Executing purchase batch");

        let mut attempt = 0;
        loop {
            match self.try_execute(user_id, items, total).await {
                Err(DbError::Conflict(reason)) if attempt < CONFLICT_RETRIES => {
                    attempt += 1;
                    warn!(user_id, attempt, %reason, "Purchase attempt conflicted, retrying");
                }
                Err(err) => return Err(err),
                Ok(outcome) => {
                    info!(
                        user_id,
                        records = outcome.record_ids.len(),
                        balance = outcome.user_balance,
                        "Purchase committed"
                    );
                    return Ok(outcome);
                }
            }
        }
    }

    /// Convenience wrapper: a single-item purchase is a one-element batch.
    pub async fn execute_purchase_one(
        &self,
        user_id: i64,
        item: &PurchaseLineItem,
    ) -> DbResult<PurchaseOutcome> {
        self.execute_purchase(user_id, std::slice::from_ref(item))
            .await
    }

    /// One transactional attempt. Dropping the transaction on any error
    /// path rolls back every mutation made so far in this call.
    async fn try_execute(
        &self,
        user_id: i64,
        items: &[PurchaseLineItem],
        total: f64,
    ) -> DbResult<PurchaseOutcome> {
        let mut tx = self.pool.begin().await?;

        // Funds gate against the pre-transaction snapshot. Also the
        // user-existence check.
        let balance: Option<f64> = sqlx::query_scalar("SELECT cash_balance FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let balance = balance.ok_or_else(|| DbError::not_found("User", user_id))?;
        ledger::check_funds(balance, total)?;

        // Guarded debit: the WHERE clause re-validates the gate against the
        // latest committed value, in case another writer slipped in between
        // our snapshot and this write.
        let debited = sqlx::query(
            "UPDATE users SET cash_balance = cash_balance - ?1 \
             WHERE id = ?2 AND cash_balance >= ?1",
        )
        .bind(total)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if debited.rows_affected() == 0 {
            return Err(maskmart_core::CoreError::InsufficientFunds {
                required: total,
                available: balance,
            }
            .into());
        }

        let mut record_ids = Vec::with_capacity(items.len());

        for item in items {
            // Credit the pharmacy; zero rows affected means it vanished
            // (or never existed) and the whole batch aborts.
            let credited = sqlx::query(
                "UPDATE pharmacies SET cash_balance = cash_balance + ?1 WHERE id = ?2",
            )
            .bind(item.transaction_amount)
            .bind(item.pharmacy_id)
            .execute(&mut *tx)
            .await?;
            if credited.rows_affected() == 0 {
                return Err(DbError::not_found("Pharmacy", item.pharmacy_id));
            }

            // A mask reference is optional, but when present it must exist
            // AND belong to the referenced pharmacy.
            if let Some(mask_id) = item.mask_id {
                let mask: Option<i64> =
                    sqlx::query_scalar("SELECT id FROM masks WHERE id = ?1 AND pharmacy_id = ?2")
                        .bind(mask_id)
                        .bind(item.pharmacy_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if mask.is_none() {
                    return Err(DbError::not_found(
                        "Mask",
                        format!("{mask_id} (pharmacy {})", item.pharmacy_id),
                    ));
                }
            }

            // Append the record exactly as supplied: the timestamp is the
            // caller's, never a server-side clock.
            let inserted = sqlx::query(
                "INSERT INTO purchase_histories \
                 (user_id, pharmacy_id, mask_id, mask_name, quantity, transaction_amount, transaction_date) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(user_id)
            .bind(item.pharmacy_id)
            .bind(item.mask_id)
            .bind(item.mask_name.as_deref())
            .bind(item.quantity)
            .bind(item.transaction_amount)
            .bind(item.transaction_date)
            .execute(&mut *tx)
            .await?;
            record_ids.push(inserted.last_insert_rowid());
        }

        let user_balance: f64 = sqlx::query_scalar("SELECT cash_balance FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(PurchaseOutcome {
            user_balance,
            record_ids,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testsupport::*;
    use chrono::{TimeZone, Utc};
    use maskmart_core::{CoreError, PurchaseRecord, ValidationError};

    fn line_item(pharmacy_id: i64, mask_id: Option<i64>, amount: f64) -> PurchaseLineItem {
        PurchaseLineItem {
            pharmacy_id,
            mask_id,
            mask_name: Some("Second Smile (black) (3 per pack)".to_string()),
            quantity: 2,
            transaction_amount: amount,
            transaction_date: Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_batch_purchase_moves_money_and_appends_records() {
        let db = test_db().await;
        let user = insert_user(&db, "Ada", 100.0).await;
        let pharmacy_a = insert_pharmacy(&db, "Carepoint", 10.0).await;
        let pharmacy_b = insert_pharmacy(&db, "DFW Wellness", 0.0).await;
        let mask_a = insert_mask(&db, pharmacy_a, "True Barrier (green) (3 per pack)", 20.0).await;

        let items = vec![
            line_item(pharmacy_a, Some(mask_a), 40.0),
            line_item(pharmacy_b, None, 30.0),
        ];

        let outcome = db.purchases().execute_purchase(user, &items).await.unwrap();

        assert_eq!(outcome.user_balance, 30.0);
        assert_eq!(outcome.record_ids.len(), 2);
        assert_eq!(user_balance(&db, user).await, 30.0);
        assert_eq!(pharmacy_balance(&db, pharmacy_a).await, 50.0);
        assert_eq!(pharmacy_balance(&db, pharmacy_b).await, 30.0);
        assert_eq!(purchase_record_count(&db).await, 2);
    }

    #[tokio::test]
    async fn test_money_is_conserved() {
        let db = test_db().await;
        let user = insert_user(&db, "Ada", 100.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 55.5).await;

        let before = total_money(&db).await;
        db.purchases()
            .execute_purchase(user, &[line_item(pharmacy, None, 42.5)])
            .await
            .unwrap();
        let after = total_money(&db).await;

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_record_captures_line_item_verbatim() {
        let db = test_db().await;
        let user = insert_user(&db, "Ada", 100.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;
        let mask = insert_mask(&db, pharmacy, "MaskT (green) (10 per pack)", 41.0).await;

        let item = PurchaseLineItem {
            pharmacy_id: pharmacy,
            mask_id: Some(mask),
            mask_name: Some("MaskT (green) (10 per pack)".to_string()),
            quantity: 3,
            transaction_amount: 80.0,
            transaction_date: Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
        };
        let outcome = db.purchases().execute_purchase_one(user, &item).await.unwrap();

        let record: PurchaseRecord = sqlx::query_as(
            "SELECT id, user_id, pharmacy_id, mask_id, mask_name, quantity, \
                    transaction_amount, transaction_date \
             FROM purchase_histories WHERE id = ?1",
        )
        .bind(outcome.record_ids[0])
        .fetch_one(db.pool())
        .await
        .unwrap();

        assert_eq!(record.user_id, user);
        assert_eq!(record.pharmacy_id, pharmacy);
        assert_eq!(record.mask_id, Some(mask));
        assert_eq!(record.mask_name.as_deref(), Some("MaskT (green) (10 per pack)"));
        assert_eq!(record.quantity, 3);
        assert_eq!(record.transaction_amount, 80.0);
        assert_eq!(record.transaction_date, item.transaction_date);
    }

    #[tokio::test]
    async fn test_insufficient_funds_rejects_whole_batch() {
        let db = test_db().await;
        let user = insert_user(&db, "Bob", 50.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 5.0).await;

        // The first item alone would be affordable; the gate is on the total.
        let items = vec![
            line_item(pharmacy, None, 40.0),
            line_item(pharmacy, None, 20.0),
        ];
        let err = db.purchases().execute_purchase(user, &items).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientFunds { .. })
        ));
        assert_eq!(user_balance(&db, user).await, 50.0);
        assert_eq!(pharmacy_balance(&db, pharmacy).await, 5.0);
        assert_eq!(purchase_record_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_exact_balance_spend_succeeds() {
        let db = test_db().await;
        let user = insert_user(&db, "Bob", 60.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;

        let outcome = db
            .purchases()
            .execute_purchase(user, &[line_item(pharmacy, None, 60.0)])
            .await
            .unwrap();
        assert_eq!(outcome.user_balance, 0.0);
    }

    #[tokio::test]
    async fn test_mask_under_wrong_pharmacy_rolls_back_everything() {
        let db = test_db().await;
        let user = insert_user(&db, "Cleo", 100.0).await;
        let pharmacy_a = insert_pharmacy(&db, "Carepoint", 0.0).await;
        let pharmacy_b = insert_pharmacy(&db, "DFW Wellness", 0.0).await;
        let mask_b = insert_mask(&db, pharmacy_b, "Masquerade (blue) (6 per pack)", 10.0).await;

        // First item is fine; the second references pharmacy_b's mask under
        // pharmacy_a. Nothing from the batch may persist.
        let items = vec![
            line_item(pharmacy_a, None, 25.0),
            line_item(pharmacy_a, Some(mask_b), 10.0),
        ];
        let err = db.purchases().execute_purchase(user, &items).await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(user_balance(&db, user).await, 100.0);
        assert_eq!(pharmacy_balance(&db, pharmacy_a).await, 0.0);
        assert_eq!(purchase_record_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_pharmacy_rolls_back_earlier_items() {
        let db = test_db().await;
        let user = insert_user(&db, "Cleo", 100.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;

        let items = vec![line_item(pharmacy, None, 25.0), line_item(9999, None, 10.0)];
        let err = db.purchases().execute_purchase(user, &items).await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(user_balance(&db, user).await, 100.0);
        assert_eq!(pharmacy_balance(&db, pharmacy).await, 0.0);
        assert_eq!(purchase_record_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let db = test_db().await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;

        let err = db
            .purchases()
            .execute_purchase(404, &[line_item(pharmacy, None, 10.0)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(purchase_record_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_negative_amount_is_rejected_before_any_mutation() {
        let db = test_db().await;
        let user = insert_user(&db, "Dana", 100.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;

        let err = db
            .purchases()
            .execute_purchase(user, &[line_item(pharmacy, None, -1.0)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::NegativeAmount { .. }))
        ));
        assert_eq!(user_balance(&db, user).await, 100.0);
    }

    #[tokio::test]
    async fn test_mask_reference_may_be_omitted() {
        let db = test_db().await;
        let user = insert_user(&db, "Dana", 100.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;

        let outcome = db
            .purchases()
            .execute_purchase(user, &[line_item(pharmacy, None, 15.0)])
            .await
            .unwrap();

        let mask_id: Option<i64> =
            sqlx::query_scalar("SELECT mask_id FROM purchase_histories WHERE id = ?1")
                .bind(outcome.record_ids[0])
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(mask_id, None);
    }

    #[tokio::test]
    async fn test_large_batch_of_valid_items_commits() {
        let db = test_db().await;
        let user = insert_user(&db, "Grace", 500.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;

        // Batch length is unbounded; only affordability limits a batch
        let items: Vec<_> = (0..101).map(|_| line_item(pharmacy, None, 1.0)).collect();
        let outcome = db.purchases().execute_purchase(user, &items).await.unwrap();

        assert_eq!(outcome.record_ids.len(), 101);
        assert_eq!(outcome.user_balance, 399.0);
        assert_eq!(user_balance(&db, user).await, 399.0);
        assert_eq!(pharmacy_balance(&db, pharmacy).await, 101.0);
        assert_eq!(purchase_record_count(&db).await, 101);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op_commit() {
        let db = test_db().await;
        let user = insert_user(&db, "Eve", 100.0).await;

        let outcome = db.purchases().execute_purchase(user, &[]).await.unwrap();
        assert_eq!(outcome.user_balance, 100.0);
        assert!(outcome.record_ids.is_empty());
        assert_eq!(purchase_record_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_purchases_never_overdraw() {
        let db = test_db().await;
        let user = insert_user(&db, "Frank", 100.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;

        // Each batch is individually affordable; together they are not.
        let db_a = db.clone();
        let db_b = db.clone();
        let task_a = tokio::spawn(async move {
            db_a.purchases()
                .execute_purchase(user, &[line_item(pharmacy, None, 70.0)])
                .await
        });
        let task_b = tokio::spawn(async move {
            db_b.purchases()
                .execute_purchase(user, &[line_item(pharmacy, None, 70.0)])
                .await
        });

        let results = [task_a.await.unwrap(), task_b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one of the two purchases must commit");

        let failure = results.iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            failure.as_ref().unwrap_err(),
            DbError::Domain(CoreError::InsufficientFunds { .. }) | DbError::Conflict(_)
        ));

        let final_balance = user_balance(&db, user).await;
        assert_eq!(final_balance, 30.0);
        assert!(final_balance >= 0.0);
        assert_eq!(pharmacy_balance(&db, pharmacy).await, 70.0);
        assert_eq!(purchase_record_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_contending_writers_on_shared_file_database() {
        // A multi-connection pool lets both transactions take their balance
        // snapshots before either commits. The loser's write upgrade then
        // fails busy/locked inside SQLite, surfaces as Conflict, and the
        // retry re-reads the committed balance and lands on the funds gate.
        let (db, path) = test_file_db("contending_writers").await;
        let user = insert_user(&db, "Frank", 100.0).await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;

        let db_a = db.clone();
        let db_b = db.clone();
        let task_a = tokio::spawn(async move {
            db_a.purchases()
                .execute_purchase(user, &[line_item(pharmacy, None, 70.0)])
                .await
        });
        let task_b = tokio::spawn(async move {
            db_b.purchases()
                .execute_purchase(user, &[line_item(pharmacy, None, 70.0)])
                .await
        });

        let results = [task_a.await.unwrap(), task_b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one of the two purchases must commit");

        let failure = results.iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            failure.as_ref().unwrap_err(),
            DbError::Domain(CoreError::InsufficientFunds { .. }) | DbError::Conflict(_)
        ));

        let final_balance = user_balance(&db, user).await;
        assert_eq!(final_balance, 30.0);
        assert_eq!(pharmacy_balance(&db, pharmacy).await, 70.0);
        assert_eq!(purchase_record_count(&db).await, 1);

        db.close().await;
        remove_db_files(&path);
    }
}
