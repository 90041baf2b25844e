//! Customer payment history view.

use common::EntityId;
use entity_store::{Book, EntityStore, Order, Payment};
use serde::Serialize;

use crate::ViewBuilder;
use crate::error::Result;
use crate::order_views::index_books;

/// One row of a customer's payment history, enriched through the
/// Payment → Order → Book chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerPaymentRow {
    pub payment: Payment,
    pub order: Option<Order>,
    pub book: Option<Book>,
}

impl<S: EntityStore> ViewBuilder<S> {
    /// Payments made by a customer, matched by the denormalized customer
    /// email and enriched by following each payment's stored order
    /// reference to its book. Rows are sorted by payment time.
    #[tracing::instrument(skip(self))]
    pub async fn customer_payments(&self, email: &str) -> Result<Vec<CustomerPaymentRow>> {
        let payments = self.store().list_payments().await?;
        let books = index_books(self.store().list_books().await?);
        let orders: std::collections::HashMap<EntityId, Order> = self
            .store()
            .list_orders()
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();

        let mut rows: Vec<CustomerPaymentRow> = payments
            .into_iter()
            .filter(|p| p.customer.email == email)
            .map(|payment| {
                let order = EntityId::parse(&payment.order_id)
                    .ok()
                    .and_then(|id| orders.get(&id).cloned());
                let book = order
                    .as_ref()
                    .and_then(|o| o.book_id.as_id())
                    .and_then(|id| books.get(&id).cloned());
                CustomerPaymentRow {
                    payment,
                    order,
                    book,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            (a.payment.paid_at, a.payment.id.as_uuid())
                .cmp(&(b.payment.paid_at, b.payment.id.as_uuid()))
        });
        Ok(rows)
    }
}
