//! Entity store for the BookCourier marketplace.
//!
//! Provides durable collections for Book, User, Order, Payment, and
//! Wishlist records behind the `EntityStore` trait, with two
//! implementations:
//! - `MemoryEntityStore` — in-memory maps for tests and local runs
//! - `PostgresEntityStore` — documents-as-JSONB over sqlx

pub mod entities;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use entities::{
    Book, BookStatus, Order, OrderStatus, PartyDetails, Payment, PaymentState, ProductSnapshot,
    Role, User, WishlistEntry,
};
pub use error::{Result, StoreError};
pub use memory::MemoryEntityStore;
pub use postgres::PostgresEntityStore;
pub use store::{EntityStore, RecordedPayment, WishlistToggle};
