//! Route handlers.

pub mod books;
pub mod health;
pub mod ledger;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod users;
pub mod wishlist;
