//! # User Repository
//!
//! User reads, purchase history, and spend aggregates.
//!
//! All history queries work off `purchase_histories`, the append-only table
//! the purchase engine writes. Nothing here mutates balances; that is the
//! engine's job alone (see [`crate::repository::purchase`]).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use maskmart_core::{PurchaseRecord, TopSpender, TransactionSummary, User};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by their ID.
    ///
    /// ## Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - User not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, name, cash_balance FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Lists all users, ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>("SELECT id, name, cash_balance FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(users)
    }

    /// Counts users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Returns a user's purchase history, oldest first.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No user with that id. A user with no
    ///   purchases yields `Ok(vec![])`, not an error.
    pub async fn purchases(&self, user_id: i64) -> DbResult<Vec<PurchaseRecord>> {
        if self.get_by_id(user_id).await?.is_none() {
            return Err(DbError::not_found("User", user_id));
        }

        let records = sqlx::query_as::<_, PurchaseRecord>(
            "SELECT id, user_id, pharmacy_id, mask_id, mask_name, quantity, \
                    transaction_amount, transaction_date \
             FROM purchase_histories WHERE user_id = ?1 \
             ORDER BY transaction_date, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Ranks users by total spend within `[start, end]`, highest first.
    ///
    /// Users with no purchases in the range do not appear at all. Ties
    /// break by user id for a stable ordering.
    pub async fn top_spenders(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        top_x: i64,
    ) -> DbResult<Vec<TopSpender>> {
        debug!(%start, %end, top_x, "Ranking users by spend");

        let spenders = sqlx::query_as::<_, TopSpender>(
            "SELECT u.id AS user_id, u.name AS user_name, \
                    SUM(h.transaction_amount) AS total_spent \
             FROM users u \
             JOIN purchase_histories h ON h.user_id = u.id \
             WHERE h.transaction_date BETWEEN ?1 AND ?2 \
             GROUP BY u.id \
             ORDER BY total_spent DESC, u.id \
             LIMIT ?3",
        )
        .bind(start)
        .bind(end)
        .bind(top_x)
        .fetch_all(&self.pool)
        .await?;

        Ok(spenders)
    }

    /// Totals masks sold and dollar volume within `[start, end]`.
    ///
    /// An empty range is not an error; both totals come back as zero.
    pub async fn transaction_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<TransactionSummary> {
        let (total_masks, total_dollar): (i64, f64) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity), 0), COALESCE(SUM(transaction_amount), 0.0) \
             FROM purchase_histories \
             WHERE transaction_date BETWEEN ?1 AND ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(TransactionSummary {
            total_masks,
            total_dollar,
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
    use chrono::TimeZone;
    use maskmart_core::PurchaseLineItem;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 15, hour, 0, 0).unwrap()
    }

    fn line(pharmacy_id: i64, amount: f64, quantity: i64, date: DateTime<Utc>) -> PurchaseLineItem {
        PurchaseLineItem {
            pharmacy_id,
            mask_id: None,
            mask_name: Some("True Barrier (green) (3 per pack)".to_string()),
            quantity,
            transaction_amount: amount,
            transaction_date: date,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_and_list_all() {
        let db = test_db().await;
        let id = insert_user(&db, "Yvonne Guerrero", 200.0).await;
        insert_user(&db, "Timothy Schultz", 50.0).await;

        let user = db.users().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.name, "Yvonne Guerrero");
        assert_eq!(user.cash_balance, 200.0);

        assert!(db.users().get_by_id(9999).await.unwrap().is_none());
        assert_eq!(db.users().list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_purchases_requires_existing_user() {
        let db = test_db().await;

        let err = db.users().purchases(42).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_purchases_ordered_oldest_first() {
        let db = test_db().await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;
        let user = insert_user(&db, "Yvonne Guerrero", 500.0).await;

        // Inserted newest-first; history must come back oldest-first
        db.purchases()
            .execute_purchase_one(user, &line(pharmacy, 30.0, 1, at(16)))
            .await
            .unwrap();
        db.purchases()
            .execute_purchase_one(user, &line(pharmacy, 10.0, 2, at(9)))
            .await
            .unwrap();

        let history = db.users().purchases(user).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transaction_amount, 10.0);
        assert_eq!(history[1].transaction_amount, 30.0);

        // A user with no purchases gets an empty history, not an error
        let idle = insert_user(&db, "Timothy Schultz", 10.0).await;
        assert!(db.users().purchases(idle).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top_spenders_ranking_and_limit() {
        let db = test_db().await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;
        let alice = insert_user(&db, "Alice", 500.0).await;
        let bob = insert_user(&db, "Bob", 500.0).await;
        let carol = insert_user(&db, "Carol", 500.0).await;
        insert_user(&db, "Idle", 500.0).await;

        db.purchases()
            .execute_purchase(
                alice,
                &[line(pharmacy, 40.0, 1, at(9)), line(pharmacy, 35.0, 1, at(10))],
            )
            .await
            .unwrap();
        db.purchases()
            .execute_purchase_one(bob, &line(pharmacy, 60.0, 1, at(11)))
            .await
            .unwrap();
        db.purchases()
            .execute_purchase_one(carol, &line(pharmacy, 5.0, 1, at(12)))
            .await
            .unwrap();

        let top = db.users().top_spenders(at(0), at(23), 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, alice);
        assert_eq!(top[0].total_spent, 75.0);
        assert_eq!(top[1].user_id, bob);
        assert_eq!(top[1].total_spent, 60.0);
    }

    #[tokio::test]
    async fn test_top_spenders_respects_date_range() {
        let db = test_db().await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;
        let user = insert_user(&db, "Alice", 500.0).await;

        db.purchases()
            .execute_purchase_one(user, &line(pharmacy, 100.0, 1, at(8)))
            .await
            .unwrap();
        db.purchases()
            .execute_purchase_one(user, &line(pharmacy, 20.0, 1, at(18)))
            .await
            .unwrap();

        // Only the evening purchase falls inside the window
        let top = db.users().top_spenders(at(12), at(23), 10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].total_spent, 20.0);
        assert_eq!(top[0].user_name, "Alice");
    }

    #[tokio::test]
    async fn test_transaction_summary() {
        let db = test_db().await;
        let pharmacy = insert_pharmacy(&db, "Carepoint", 0.0).await;
        let user = insert_user(&db, "Alice", 500.0).await;

        db.purchases()
            .execute_purchase(
                user,
                &[line(pharmacy, 25.5, 2, at(9)), line(pharmacy, 10.0, 3, at(10))],
            )
            .await
            .unwrap();

        let summary = db.users().transaction_summary(at(0), at(23)).await.unwrap();
        assert_eq!(summary.total_masks, 5);
        assert_eq!(summary.total_dollar, 35.5);
    }

    #[tokio::test]
    async fn test_transaction_summary_empty_range() {
        let db = test_db().await;

        let summary = db.users().transaction_summary(at(0), at(23)).await.unwrap();
        assert_eq!(
            summary,
            TransactionSummary {
                total_masks: 0,
                total_dollar: 0.0,
            }
        );
    }
}
