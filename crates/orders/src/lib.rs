//! Order lifecycle management.
//!
//! This crate owns the mutating half of the order subsystem: placing
//! orders (with foreign-key normalization at ingress), status updates,
//! cancellation, and the cascade that removes dependent orders when a
//! book is deleted.

pub mod error;
pub mod service;

pub use error::OrderError;
pub use service::{OrderLifecycle, PlaceOrder};
