use async_trait::async_trait;
use common::EntityId;

use crate::entities::{Book, Order, OrderStatus, Payment, User, WishlistEntry};
use crate::{Result, entities::Role};

/// Outcome of recording a payment.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedPayment {
    /// The payment was inserted and the order flipped to paid.
    Created(Payment),
    /// A payment already existed for this transaction; nothing changed.
    Existing(Payment),
    /// The referenced order is already paid under a different transaction;
    /// nothing was inserted.
    OrderAlreadyPaid,
}

impl RecordedPayment {
    /// Returns the recorded payment, when one exists for this outcome.
    pub fn payment(&self) -> Option<&Payment> {
        match self {
            RecordedPayment::Created(p) | RecordedPayment::Existing(p) => Some(p),
            RecordedPayment::OrderAlreadyPaid => None,
        }
    }

    /// Returns true if this call inserted the payment.
    pub fn is_created(&self) -> bool {
        matches!(self, RecordedPayment::Created(_))
    }
}

/// Outcome of a wishlist toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistToggle {
    /// The entry was added.
    Added,
    /// A matching entry existed and was removed.
    Removed,
}

/// Core trait for entity store implementations.
///
/// Each collection exposes insert/find/update/delete; every mutation is
/// atomic at the document level. `record_payment` is the one compound
/// operation: it must insert-if-absent by transaction id and flip the
/// referenced order's payment status as a single atomic unit.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EntityStore: Send + Sync {
    // -- Books --

    /// Inserts a book into the catalog.
    async fn insert_book(&self, book: Book) -> Result<()>;

    /// Retrieves a book by identifier.
    async fn get_book(&self, id: EntityId) -> Result<Option<Book>>;

    /// Deletes a book. Returns true if a record existed.
    async fn delete_book(&self, id: EntityId) -> Result<bool>;

    /// Lists all books in insertion order.
    async fn list_books(&self) -> Result<Vec<Book>>;

    // -- Users --

    /// Inserts a user, or replaces the existing record with the same email.
    async fn upsert_user(&self, user: User) -> Result<()>;

    /// Looks up a user by email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Updates a user's role by email. Returns true if a record matched.
    async fn update_user_role(&self, email: &str, role: Role) -> Result<bool>;

    /// Lists all users.
    async fn list_users(&self) -> Result<Vec<User>>;

    // -- Orders --

    /// Inserts an order.
    async fn insert_order(&self, order: Order) -> Result<()>;

    /// Retrieves an order by identifier.
    async fn get_order(&self, id: EntityId) -> Result<Option<Order>>;

    /// Updates an order's fulfillment status. Returns true if a record
    /// matched.
    async fn update_order_status(&self, id: EntityId, status: OrderStatus) -> Result<bool>;

    /// Deletes an order. Returns true if a record existed.
    async fn delete_order(&self, id: EntityId) -> Result<bool>;

    /// Deletes every order referencing the given book under either key
    /// representation. Returns the number of deleted orders.
    async fn delete_orders_for_book(&self, book_id: EntityId) -> Result<u64>;

    /// Lists all orders in insertion order.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    // -- Payments --

    /// Looks up a payment by its external transaction identifier.
    async fn find_payment_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>>;

    /// Lists all payments.
    async fn list_payments(&self) -> Result<Vec<Payment>>;

    /// Records a confirmed payment idempotently.
    ///
    /// If a payment already exists for `payment.transaction_id`, returns it
    /// unchanged with no second status flip. If the referenced order exists
    /// but is already paid under a different transaction, inserts nothing
    /// and returns `OrderAlreadyPaid`. Otherwise inserts the payment and
    /// marks the referenced order paid. The transaction lookup, the order
    /// status check and flip, and the insert are a single atomic unit, so
    /// an order can never end up paid with more than one payment.
    async fn record_payment(&self, payment: Payment) -> Result<RecordedPayment>;

    // -- Wishlist --

    /// Toggles a wishlist entry for (book, user). Adding twice removes the
    /// entry; zero matched rows on removal is a soft outcome, not an error.
    async fn toggle_wishlist(&self, entry: WishlistEntry) -> Result<WishlistToggle>;

    /// Lists wishlist entries for a user.
    async fn list_wishlist_for_user(&self, email: &str) -> Result<Vec<WishlistEntry>>;
}
