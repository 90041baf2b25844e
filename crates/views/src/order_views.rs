//! Customer, librarian, and single-order composite views.

use common::{EntityId, Money};
use entity_store::{Book, EntityStore, Order, OrderStatus};
use serde::Serialize;

use crate::error::{Result, ViewError};
use crate::ViewBuilder;

/// Minimal book fields merged into a single-order view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub id: EntityId,
    pub name: String,
    pub image: Option<String>,
    /// Catalog price converted to minor units.
    pub price: Money,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            name: book.name.clone(),
            image: book.image.clone(),
            price: Money::from_major(book.price),
        }
    }
}

/// One row of the customer order view: order inner-joined with its book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerOrderRow {
    pub order: Order,
    pub book: Book,
}

/// One row of the librarian order view: the book side is optional because
/// orders outlive book deletion here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibrarianOrderRow {
    pub order: Order,
    /// Normalized form of the order's book reference, when it parses.
    pub book_id: Option<EntityId>,
    pub book: Option<Book>,
}

/// An order merged with a minimal book summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub book: BookSummary,
}

impl<S: EntityStore> ViewBuilder<S> {
    /// Orders placed by a customer, excluding cancelled ones, inner-joined
    /// with their books.
    ///
    /// An order whose book no longer exists is excluded by the join; that
    /// filter is intentional. Rows are sorted by creation time, order id
    /// as tiebreak.
    #[tracing::instrument(skip(self))]
    pub async fn customer_orders(&self, email: &str) -> Result<Vec<CustomerOrderRow>> {
        let orders = self.store().list_orders().await?;
        let books = index_books(self.store().list_books().await?);

        let mut rows: Vec<CustomerOrderRow> = orders
            .into_iter()
            .filter(|o| o.customer.email == email && o.status != OrderStatus::Cancelled)
            .filter_map(|order| {
                let book = order
                    .book_id
                    .as_id()
                    .and_then(|id| books.get(&id).cloned())?;
                Some(CustomerOrderRow { order, book })
            })
            .collect();

        rows.sort_by(|a, b| {
            (a.order.created_at, a.order.id.as_uuid())
                .cmp(&(b.order.created_at, b.order.id.as_uuid()))
        });
        Ok(rows)
    }

    /// Orders handled by a librarian, outer-joined with their books: a
    /// deleted book yields a row with no book details rather than an error.
    #[tracing::instrument(skip(self))]
    pub async fn librarian_orders(&self, email: &str) -> Result<Vec<LibrarianOrderRow>> {
        let orders = self.store().list_orders().await?;
        let books = index_books(self.store().list_books().await?);

        let mut rows: Vec<LibrarianOrderRow> = orders
            .into_iter()
            .filter(|o| o.librarian.email == email)
            .map(|order| {
                let book_id = order.book_id.as_id();
                let book = book_id.and_then(|id| books.get(&id).cloned());
                LibrarianOrderRow {
                    order,
                    book_id,
                    book,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            (a.order.created_at, a.order.id.as_uuid())
                .cmp(&(b.order.created_at, b.order.id.as_uuid()))
        });
        Ok(rows)
    }

    /// A single order merged with a minimal book summary.
    #[tracing::instrument(skip(self))]
    pub async fn order_detail(&self, order_id: &str) -> Result<OrderDetail> {
        let id = EntityId::parse(order_id).map_err(|_| ViewError::MalformedId {
            value: order_id.to_string(),
        })?;

        let order = self
            .store()
            .get_order(id)
            .await?
            .ok_or_else(|| ViewError::OrderNotFound(order_id.to_string()))?;

        let book = match order.book_id.as_id() {
            Some(book_id) => self.store().get_book(book_id).await?,
            None => None,
        }
        .ok_or_else(|| ViewError::BookNotFound(order_id.to_string()))?;

        Ok(OrderDetail {
            book: BookSummary::from(&book),
            order,
        })
    }
}

pub(crate) fn index_books(books: Vec<Book>) -> std::collections::HashMap<EntityId, Book> {
    books.into_iter().map(|b| (b.id, b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::EntityRef;
    use entity_store::{MemoryEntityStore, PartyDetails};

    async fn seed_book(store: &MemoryEntityStore, name: &str, price: f64) -> Book {
        let book = Book::new(
            name,
            "Author",
            price,
            PartyDetails::new("lib@example.com", "Librarian"),
        );
        store.insert_book(book.clone()).await.unwrap();
        book
    }

    fn order_for(book: &Book, customer_email: &str) -> Order {
        Order::new(
            EntityRef::Id(book.id),
            EntityRef::Id(EntityId::new()),
            book.librarian.clone(),
            PartyDetails::new(customer_email, "Reader"),
        )
    }

    #[tokio::test]
    async fn test_customer_orders_excludes_cancelled() {
        let store = MemoryEntityStore::new();
        let book = seed_book(&store, "Dune", 10.0).await;

        store
            .insert_order(order_for(&book, "reader@example.com"))
            .await
            .unwrap();
        let mut cancelled = order_for(&book, "reader@example.com");
        cancelled.status = OrderStatus::Cancelled;
        store.insert_order(cancelled).await.unwrap();

        let views = ViewBuilder::new(store);
        let rows = views.customer_orders("reader@example.com").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].book.name, "Dune");
    }

    #[tokio::test]
    async fn test_customer_orders_inner_join_drops_orphans() {
        let store = MemoryEntityStore::new();
        let book = seed_book(&store, "Dune", 10.0).await;

        store
            .insert_order(order_for(&book, "reader@example.com"))
            .await
            .unwrap();
        // Order referencing a book that no longer exists.
        let mut orphan = order_for(&book, "reader@example.com");
        orphan.book_id = EntityRef::Id(EntityId::new());
        store.insert_order(orphan).await.unwrap();

        let views = ViewBuilder::new(store);
        let rows = views.customer_orders("reader@example.com").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_librarian_orders_outer_join_keeps_orphans() {
        let store = MemoryEntityStore::new();
        let book = seed_book(&store, "Dune", 10.0).await;

        store
            .insert_order(order_for(&book, "reader@example.com"))
            .await
            .unwrap();
        let mut orphan = order_for(&book, "other@example.com");
        orphan.book_id = EntityRef::Raw("BK-GONE".to_string());
        store.insert_order(orphan).await.unwrap();

        let views = ViewBuilder::new(store);
        let rows = views.librarian_orders("lib@example.com").await.unwrap();
        assert_eq!(rows.len(), 2);

        let orphan_row = rows
            .iter()
            .find(|r| r.order.book_id == EntityRef::Raw("BK-GONE".to_string()))
            .unwrap();
        assert!(orphan_row.book.is_none());
        assert!(orphan_row.book_id.is_none());
    }

    #[tokio::test]
    async fn test_order_detail_errors() {
        let store = MemoryEntityStore::new();
        let views = ViewBuilder::new(store);

        assert!(matches!(
            views.order_detail("garbage").await,
            Err(ViewError::MalformedId { .. })
        ));
        assert!(matches!(
            views.order_detail(&EntityId::new().to_string()).await,
            Err(ViewError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_order_detail_merges_book_summary() {
        let store = MemoryEntityStore::new();
        let book = seed_book(&store, "Dune", 12.50).await;
        let order = order_for(&book, "reader@example.com");
        let order_id = order.id;
        store.insert_order(order).await.unwrap();

        let views = ViewBuilder::new(store);
        let detail = views.order_detail(&order_id.to_string()).await.unwrap();
        assert_eq!(detail.book.name, "Dune");
        assert_eq!(detail.book.price, Money::from_minor_units(1250));
    }

    #[tokio::test]
    async fn test_order_detail_missing_book_is_not_found() {
        let store = MemoryEntityStore::new();
        let book = seed_book(&store, "Dune", 10.0).await;
        let mut order = order_for(&book, "reader@example.com");
        order.book_id = EntityRef::Id(EntityId::new());
        let order_id = order.id;
        store.insert_order(order).await.unwrap();

        let views = ViewBuilder::new(store);
        assert!(matches!(
            views.order_detail(&order_id.to_string()).await,
            Err(ViewError::BookNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rows_sorted_by_creation() {
        let store = MemoryEntityStore::new();
        let book = seed_book(&store, "Dune", 10.0).await;

        let mut first = order_for(&book, "reader@example.com");
        first.created_at = chrono::Utc::now() - chrono::Duration::hours(2);
        let mut second = order_for(&book, "reader@example.com");
        second.created_at = chrono::Utc::now() - chrono::Duration::hours(1);

        // Insert newest first; the view must sort.
        store.insert_order(second.clone()).await.unwrap();
        store.insert_order(first.clone()).await.unwrap();

        let views = ViewBuilder::new(store);
        let rows = views.customer_orders("reader@example.com").await.unwrap();
        assert_eq!(rows[0].order.id, first.id);
        assert_eq!(rows[1].order.id, second.id);
    }
}
