//! Order lifecycle service.

use common::{EntityId, EntityRef};
use entity_store::{EntityStore, Order, OrderStatus, PartyDetails};
use serde::Deserialize;

use crate::error::{OrderError, Result};

/// Input for placing an order.
///
/// `book_id` and `user_id` arrive as strings and are normalized through
/// `EntityRef::parse` — syntactically valid identifiers become typed,
/// anything else is preserved raw so no information is silently dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrder {
    pub book_id: String,
    pub user_id: String,
    #[serde(default)]
    pub librarian: Option<PartyDetails>,
    pub customer: PartyDetails,
}

/// Service for managing the order lifecycle.
///
/// Provides a high-level API over the entity store for order mutations:
/// placement, status updates, cancellation, and the book-deletion cascade.
pub struct OrderLifecycle<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> OrderLifecycle<S> {
    /// Creates a new lifecycle service with the given entity store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places a new order and returns its identifier.
    ///
    /// Fails with a validation error when a required field is absent. The
    /// created order starts `Pending`/`Unpaid`.
    #[tracing::instrument(skip(self, cmd))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<EntityId> {
        if cmd.book_id.trim().is_empty() {
            return Err(OrderError::MissingField { field: "book_id" });
        }
        if cmd.user_id.trim().is_empty() {
            return Err(OrderError::MissingField { field: "user_id" });
        }
        if cmd.customer.email.trim().is_empty() {
            return Err(OrderError::MissingField { field: "customer.email" });
        }

        let order = Order::new(
            EntityRef::parse(&cmd.book_id),
            EntityRef::parse(&cmd.user_id),
            cmd.librarian.unwrap_or_default(),
            cmd.customer,
        );
        let id = order.id;

        self.store.insert_order(order).await?;
        tracing::info!(order_id = %id, "order placed");
        Ok(id)
    }

    /// Updates an order's fulfillment status.
    ///
    /// A malformed identifier and an absent order are reported as distinct
    /// failures.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
        let id = parse_order_id(order_id)?;
        let matched = self.store.update_order_status(id, status).await?;
        if !matched {
            return Err(OrderError::NotFound(order_id.to_string()));
        }
        Ok(())
    }

    /// Cancels an order by deleting it.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> Result<()> {
        let id = parse_order_id(order_id)?;
        let existed = self.store.delete_order(id).await?;
        if !existed {
            return Err(OrderError::NotFound(order_id.to_string()));
        }
        tracing::info!(order_id = %id, "order cancelled");
        Ok(())
    }

    /// Deletes a book and cascades deletion of its dependent orders, so no
    /// order referencing the book (under either key representation)
    /// survives. Returns the number of cascaded orders.
    #[tracing::instrument(skip(self))]
    pub async fn on_book_deleted(&self, book_id: EntityId) -> Result<u64> {
        let existed = self.store.delete_book(book_id).await?;
        if !existed {
            return Err(OrderError::NotFound(book_id.to_string()));
        }
        let cascaded = self.store.delete_orders_for_book(book_id).await?;
        tracing::info!(book_id = %book_id, cascaded, "book deleted with order cascade");
        Ok(cascaded)
    }
}

fn parse_order_id(raw: &str) -> Result<EntityId> {
    EntityId::parse(raw).map_err(|_| OrderError::MalformedId {
        value: raw.to_string(),
    })
}
