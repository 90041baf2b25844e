use std::sync::Arc;

use async_trait::async_trait;
use common::EntityId;
use tokio::sync::RwLock;

use crate::entities::{Book, Order, OrderStatus, Payment, PaymentState, Role, User, WishlistEntry};
use crate::store::{EntityStore, RecordedPayment, WishlistToggle};
use crate::Result;

#[derive(Default)]
struct Collections {
    books: Vec<Book>,
    users: Vec<User>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
    wishlist: Vec<WishlistEntry>,
}

/// In-memory entity store implementation for tests and local runs.
///
/// All collections live behind a single lock, which makes the compound
/// `record_payment` operation atomic without further coordination. Provides
/// the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct MemoryEntityStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryEntityStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.collections.read().await.orders.len()
    }

    /// Returns the number of stored payments.
    pub async fn payment_count(&self) -> usize {
        self.collections.read().await.payments.len()
    }

    /// Clears all collections.
    pub async fn clear(&self) {
        let mut c = self.collections.write().await;
        c.books.clear();
        c.users.clear();
        c.orders.clear();
        c.payments.clear();
        c.wishlist.clear();
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn insert_book(&self, book: Book) -> Result<()> {
        self.collections.write().await.books.push(book);
        Ok(())
    }

    async fn get_book(&self, id: EntityId) -> Result<Option<Book>> {
        let c = self.collections.read().await;
        Ok(c.books.iter().find(|b| b.id == id).cloned())
    }

    async fn delete_book(&self, id: EntityId) -> Result<bool> {
        let mut c = self.collections.write().await;
        let before = c.books.len();
        c.books.retain(|b| b.id != id);
        Ok(c.books.len() < before)
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.collections.read().await.books.clone())
    }

    async fn upsert_user(&self, user: User) -> Result<()> {
        let mut c = self.collections.write().await;
        if let Some(existing) = c.users.iter_mut().find(|u| u.email == user.email) {
            *existing = user;
        } else {
            c.users.push(user);
        }
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let c = self.collections.read().await;
        Ok(c.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user_role(&self, email: &str, role: Role) -> Result<bool> {
        let mut c = self.collections.write().await;
        match c.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.collections.read().await.users.clone())
    }

    async fn insert_order(&self, order: Order) -> Result<()> {
        self.collections.write().await.orders.push(order);
        Ok(())
    }

    async fn get_order(&self, id: EntityId) -> Result<Option<Order>> {
        let c = self.collections.read().await;
        Ok(c.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn update_order_status(&self, id: EntityId, status: OrderStatus) -> Result<bool> {
        let mut c = self.collections.write().await;
        match c.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_order(&self, id: EntityId) -> Result<bool> {
        let mut c = self.collections.write().await;
        let before = c.orders.len();
        c.orders.retain(|o| o.id != id);
        Ok(c.orders.len() < before)
    }

    async fn delete_orders_for_book(&self, book_id: EntityId) -> Result<u64> {
        let mut c = self.collections.write().await;
        let before = c.orders.len();
        c.orders.retain(|o| !o.book_id.matches(book_id));
        Ok((before - c.orders.len()) as u64)
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.collections.read().await.orders.clone())
    }

    async fn find_payment_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>> {
        let c = self.collections.read().await;
        Ok(c.payments
            .iter()
            .find(|p| p.transaction_id == transaction_id)
            .cloned())
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        Ok(self.collections.read().await.payments.clone())
    }

    async fn record_payment(&self, payment: Payment) -> Result<RecordedPayment> {
        let mut c = self.collections.write().await;

        // Idempotency guard: one payment per external transaction.
        if let Some(existing) = c
            .payments
            .iter()
            .find(|p| p.transaction_id == payment.transaction_id)
        {
            return Ok(RecordedPayment::Existing(existing.clone()));
        }

        // The order status check runs under the same lock as the insert, so
        // two distinct transactions against one order cannot both land.
        if let Ok(order_id) = EntityId::parse(&payment.order_id)
            && let Some(order) = c.orders.iter_mut().find(|o| o.id == order_id)
        {
            if !order.payment_status.can_charge() {
                return Ok(RecordedPayment::OrderAlreadyPaid);
            }
            order.payment_status = PaymentState::Paid;
        }

        c.payments.push(payment.clone());
        Ok(RecordedPayment::Created(payment))
    }

    async fn toggle_wishlist(&self, entry: WishlistEntry) -> Result<WishlistToggle> {
        let mut c = self.collections.write().await;
        let before = c.wishlist.len();
        c.wishlist
            .retain(|w| !(w.user_email == entry.user_email && w.book_id == entry.book_id));
        if c.wishlist.len() < before {
            return Ok(WishlistToggle::Removed);
        }
        c.wishlist.push(entry);
        Ok(WishlistToggle::Added)
    }

    async fn list_wishlist_for_user(&self, email: &str) -> Result<Vec<WishlistEntry>> {
        let c = self.collections.read().await;
        Ok(c.wishlist
            .iter()
            .filter(|w| w.user_email == email)
            .cloned()
            .collect())
    }
}
