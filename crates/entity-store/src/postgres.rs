use async_trait::async_trait;
use common::EntityId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::Result;
use crate::entities::{Book, Order, OrderStatus, Payment, Role, User, WishlistEntry};
use crate::error::StoreError;
use crate::store::{EntityStore, RecordedPayment, WishlistToggle};

const BOOKS: &str = "books";
const USERS: &str = "users";
const ORDERS: &str = "orders";
const PAYMENTS: &str = "payments";
const WISHLIST: &str = "wishlist";

/// PostgreSQL-backed entity store.
///
/// Every entity lives in a single `documents` table as a JSONB body keyed
/// by `(collection, id)`, mirroring the document shape of the source data.
/// A partial unique index on the payments collection's `transaction_id`
/// enforces the one-payment-per-transaction invariant at the database level.
#[derive(Clone)]
pub struct PostgresEntityStore {
    pool: PgPool,
}

impl PostgresEntityStore {
    /// Creates a new PostgreSQL entity store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to<T: DeserializeOwned>(row: PgRow) -> Result<T> {
        let body: serde_json::Value = row.try_get("body")?;
        Ok(serde_json::from_value(body)?)
    }

    async fn insert_document<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        document: &T,
    ) -> Result<()> {
        let body = serde_json::to_value(document)?;
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(body)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_document<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to).transpose()
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_documents<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let rows =
            sqlx::query("SELECT body FROM documents WHERE collection = $1 ORDER BY seq")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Self::row_to).collect()
    }
}

#[async_trait]
impl EntityStore for PostgresEntityStore {
    async fn insert_book(&self, book: Book) -> Result<()> {
        self.insert_document(BOOKS, &book.id.to_string(), &book).await
    }

    async fn get_book(&self, id: EntityId) -> Result<Option<Book>> {
        self.get_document(BOOKS, &id.to_string()).await
    }

    async fn delete_book(&self, id: EntityId) -> Result<bool> {
        self.delete_document(BOOKS, &id.to_string()).await
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        self.list_documents(BOOKS).await
    }

    async fn upsert_user(&self, user: User) -> Result<()> {
        let body = serde_json::to_value(&user)?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE documents SET body = $1 WHERE collection = $2 AND body->>'email' = $3",
        )
        .bind(&body)
        .bind(USERS)
        .bind(&user.email)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
                .bind(USERS)
                .bind(user.id.to_string())
                .bind(&body)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND body->>'email' = $2",
        )
        .bind(USERS)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to).transpose()
    }

    async fn update_user_role(&self, email: &str, role: Role) -> Result<bool> {
        let role_json = serde_json::to_value(role)?;
        let result = sqlx::query(
            "UPDATE documents SET body = jsonb_set(body, '{role}', $1) \
             WHERE collection = $2 AND body->>'email' = $3",
        )
        .bind(role_json)
        .bind(USERS)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.list_documents(USERS).await
    }

    async fn insert_order(&self, order: Order) -> Result<()> {
        self.insert_document(ORDERS, &order.id.to_string(), &order)
            .await
    }

    async fn get_order(&self, id: EntityId) -> Result<Option<Order>> {
        self.get_document(ORDERS, &id.to_string()).await
    }

    async fn update_order_status(&self, id: EntityId, status: OrderStatus) -> Result<bool> {
        let status_json = serde_json::to_value(status)?;
        let result = sqlx::query(
            "UPDATE documents SET body = jsonb_set(body, '{status}', $1) \
             WHERE collection = $2 AND id = $3",
        )
        .bind(status_json)
        .bind(ORDERS)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_order(&self, id: EntityId) -> Result<bool> {
        self.delete_document(ORDERS, &id.to_string()).await
    }

    async fn delete_orders_for_book(&self, book_id: EntityId) -> Result<u64> {
        // Both key representations serialize to the same string form.
        let result = sqlx::query(
            "DELETE FROM documents WHERE collection = $1 AND body->>'book_id' = $2",
        )
        .bind(ORDERS)
        .bind(book_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        self.list_documents(ORDERS).await
    }

    async fn find_payment_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND body->>'transaction_id' = $2",
        )
        .bind(PAYMENTS)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to).transpose()
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        self.list_documents(PAYMENTS).await
    }

    async fn record_payment(&self, payment: Payment) -> Result<RecordedPayment> {
        let mut tx = self.pool.begin().await?;

        // Idempotency guard inside the transaction.
        let existing = sqlx::query(
            "SELECT body FROM documents \
             WHERE collection = $1 AND body->>'transaction_id' = $2 FOR UPDATE",
        )
        .bind(PAYMENTS)
        .bind(&payment.transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = existing {
            tx.rollback().await?;
            return Ok(RecordedPayment::Existing(Self::row_to(row)?));
        }

        // Lock the referenced order and check its status inside the same
        // transaction, so two distinct transactions against one order
        // cannot both land. An absent order is tolerated: the payment is
        // still recorded with no flip.
        let order_row = sqlx::query(
            "SELECT body->>'payment_status' AS payment_status FROM documents \
             WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(ORDERS)
        .bind(&payment.order_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = order_row {
            let status: String = row.try_get("payment_status")?;
            if status != "unpaid" {
                tx.rollback().await?;
                return Ok(RecordedPayment::OrderAlreadyPaid);
            }
            sqlx::query(
                "UPDATE documents SET body = jsonb_set(body, '{payment_status}', '\"paid\"') \
                 WHERE collection = $1 AND id = $2 \
                 AND body->>'payment_status' = 'unpaid'",
            )
            .bind(ORDERS)
            .bind(&payment.order_id)
            .execute(&mut *tx)
            .await?;
        }

        let body = serde_json::to_value(&payment)?;
        let inserted = sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)",
        )
        .bind(PAYMENTS)
        .bind(payment.id.to_string())
        .bind(body)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(RecordedPayment::Created(payment))
            }
            Err(e) => {
                // A concurrent confirmation won the unique transaction_id
                // index race; surface its record instead.
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("unique_payment_transaction")
                {
                    tx.rollback().await?;
                    let winner = self
                        .find_payment_by_transaction(&payment.transaction_id)
                        .await?;
                    if let Some(winner) = winner {
                        return Ok(RecordedPayment::Existing(winner));
                    }
                }
                Err(StoreError::Database(e))
            }
        }
    }

    async fn toggle_wishlist(&self, entry: WishlistEntry) -> Result<WishlistToggle> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM documents WHERE collection = $1 \
             AND body->>'user_email' = $2 AND body->>'book_id' = $3",
        )
        .bind(WISHLIST)
        .bind(&entry.user_email)
        .bind(entry.book_id.to_string())
        .execute(&mut *tx)
        .await?;

        if removed.rows_affected() > 0 {
            tx.commit().await?;
            return Ok(WishlistToggle::Removed);
        }

        let body = serde_json::to_value(&entry)?;
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(WISHLIST)
            .bind(entry.id.to_string())
            .bind(body)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(WishlistToggle::Added)
    }

    async fn list_wishlist_for_user(&self, email: &str) -> Result<Vec<WishlistEntry>> {
        let rows = sqlx::query(
            "SELECT body FROM documents \
             WHERE collection = $1 AND body->>'user_email' = $2 ORDER BY seq",
        )
        .bind(WISHLIST)
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to).collect()
    }
}
