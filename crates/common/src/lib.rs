//! Shared value types for the BookCourier marketplace.
//!
//! This crate provides the identifier and money primitives used across
//! the store, lifecycle, payment, and view layers:
//! - `EntityId` — typed UUID identifier for stored records
//! - `EntityRef` — a foreign key that may be typed or a raw string
//! - `Money` — integer minor-unit amounts

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{EntityId, EntityRef};
