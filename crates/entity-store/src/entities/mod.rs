//! Entity records stored in the marketplace collections.

mod book;
mod order;
mod payment;
mod user;
mod wishlist;

pub use book::{Book, BookStatus};
pub use order::{Order, OrderStatus, PartyDetails, PaymentState};
pub use payment::{Payment, ProductSnapshot};
pub use user::{Role, User};
pub use wishlist::WishlistEntry;
