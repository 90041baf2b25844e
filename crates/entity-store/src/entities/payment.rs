//! Payment record.

use chrono::{DateTime, Utc};
use common::{EntityId, Money};
use serde::{Deserialize, Serialize};

use super::order::PartyDetails;

/// Product details frozen at confirmation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// String form of the purchased book's identifier.
    pub book_id: String,
    pub name: String,
    pub image: Option<String>,
    /// Price actually charged, in minor units.
    pub price: Money,
}

/// An immutable record of a completed charge.
///
/// `transaction_id` is the external charge identifier and the natural
/// idempotency key: at most one Payment may exist per transaction. Payments
/// are never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: EntityId,
    /// String reference to the paid order.
    pub order_id: String,
    /// External charge/session identifier.
    pub transaction_id: String,
    pub amount: Money,
    pub currency: String,
    pub paid_at: DateTime<Utc>,
    /// Customer details frozen at confirmation time.
    pub customer: PartyDetails,
    pub product: ProductSnapshot,
}

impl Payment {
    /// Creates a payment record for a confirmed charge.
    pub fn new(
        order_id: impl Into<String>,
        transaction_id: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
        customer: PartyDetails,
        product: ProductSnapshot,
    ) -> Self {
        Self {
            id: EntityId::new(),
            order_id: order_id.into(),
            transaction_id: transaction_id.into(),
            amount,
            currency: currency.into(),
            paid_at: Utc::now(),
            customer,
            product,
        }
    }
}
