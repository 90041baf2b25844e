//! Read-side composite views over the entity store.
//!
//! Reassembles enriched order and payment views (order+book,
//! payment+order+book+librarian) by value-matching across collections that
//! carry no foreign-key constraints, and produces the admin-facing
//! transaction ledger.

pub mod error;
pub mod ledger;
pub mod order_views;
pub mod payment_views;

pub use error::ViewError;
pub use ledger::{LedgerRow, RequesterIdentity};
pub use order_views::{BookSummary, CustomerOrderRow, LibrarianOrderRow, OrderDetail};
pub use payment_views::CustomerPaymentRow;

use entity_store::EntityStore;

/// Builds read-optimized composite views for customer, librarian, and
/// admin consumers.
pub struct ViewBuilder<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> ViewBuilder<S> {
    /// Creates a view builder over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
