//! Payment reconciliation for the BookCourier marketplace.
//!
//! The engine drives an order from `unpaid` to `paid` against an external
//! payment provider: it computes chargeable amounts, requests intents and
//! hosted checkout sessions, and records confirmed charges idempotently
//! keyed by the provider's transaction identifier.

pub mod engine;
pub mod error;
pub mod provider;

pub use engine::{ConfirmedPayment, EngineOptions, ReconciliationEngine};
pub use error::PaymentError;
pub use provider::{
    ChargeIntent, CheckoutSession, CheckoutSessionHandle, LineItem, MockPaymentProvider,
    PaymentProvider,
};
