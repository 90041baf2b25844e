//! Admin transaction ledger.

use std::collections::HashMap;

use entity_store::{Book, EntityStore, Order, PartyDetails, Payment, Role, User};
use serde::Serialize;

use crate::ViewBuilder;
use crate::error::{Result, ViewError};

/// Verified identity of the requester, supplied by the trusted API
/// boundary rather than read from client-controlled query input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterIdentity {
    pub email: String,
}

impl RequesterIdentity {
    /// Creates an identity claim for an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// One ledger row: a payment with whatever order/book/librarian/customer
/// context could be reassembled by value matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub payment: Payment,
    pub order: Option<Order>,
    pub book: Option<Book>,
    /// Librarian summary derived from the matched book's denormalized
    /// details.
    pub librarian: Option<PartyDetails>,
    pub customer: Option<User>,
}

impl<S: EntityStore> ViewBuilder<S> {
    /// The full audit trail: every payment enriched with its order, book,
    /// librarian, and customer, or `None` where the chain breaks.
    ///
    /// The requester's role lookup is the only read performed before the
    /// gate; non-admins are rejected without touching the transaction
    /// collections. The join builds id-indexed maps once, then makes a
    /// single pass over payments. Rows are sorted by payment time.
    #[tracing::instrument(skip(self), fields(requester = %identity.email))]
    pub async fn transaction_ledger(
        &self,
        identity: &RequesterIdentity,
    ) -> Result<Vec<LedgerRow>> {
        let requester = self.store().find_user_by_email(&identity.email).await?;
        match requester {
            Some(user) if user.role == Role::Admin => {}
            _ => {
                return Err(ViewError::Forbidden {
                    email: identity.email.clone(),
                });
            }
        }

        let payments = self.store().list_payments().await?;
        let orders = self.store().list_orders().await?;
        let books = self.store().list_books().await?;
        let users = self.store().list_users().await?;

        let orders_by_id: HashMap<String, &Order> =
            orders.iter().map(|o| (o.id.to_string(), o)).collect();
        let books_by_id: HashMap<String, &Book> =
            books.iter().map(|b| (b.id.to_string(), b)).collect();
        let users_by_id: HashMap<String, &User> =
            users.iter().map(|u| (u.id.to_string(), u)).collect();
        let users_by_email: HashMap<&str, &User> =
            users.iter().map(|u| (u.email.as_str(), u)).collect();

        let mut rows: Vec<LedgerRow> = payments
            .into_iter()
            .map(|payment| {
                let order = orders_by_id.get(&payment.order_id).copied();
                let book = order
                    .and_then(|o| books_by_id.get(&o.book_id.to_string()).copied())
                    .or_else(|| books_by_id.get(&payment.product.book_id).copied());
                let librarian = book.map(|b| b.librarian.clone());
                // Customer matched by identifier first, then by email.
                let customer = order
                    .and_then(|o| users_by_id.get(&o.user_id.to_string()).copied())
                    .or_else(|| users_by_email.get(payment.customer.email.as_str()).copied());

                LedgerRow {
                    order: order.cloned(),
                    book: book.cloned(),
                    librarian,
                    customer: customer.cloned(),
                    payment,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            (a.payment.paid_at, a.payment.id.as_uuid())
                .cmp(&(b.payment.paid_at, b.payment.id.as_uuid()))
        });

        metrics::counter!("ledger_reports_total").increment(1);
        Ok(rows)
    }
}
