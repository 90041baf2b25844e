//! Order record and its status machines.

use chrono::{DateTime, Utc};
use common::{EntityId, EntityRef};
use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
///
/// Transitions:
/// ```text
/// Pending ──► Processing ──► Shipped ──► Delivered
///     │            │            │
///     └────────────┴────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, not yet handled by the librarian.
    #[default]
    Pending,
    /// Librarian is preparing the order.
    Processing,
    /// Order has left the librarian.
    Shipped,
    /// Order reached the customer (terminal state).
    Delivered,
    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status of an order.
///
/// The only transition in scope is `Unpaid → Paid`, made exactly once when
/// a confirmed charge is recorded. There is no reverse transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    /// No confirmed charge exists for this order.
    #[default]
    Unpaid,
    /// A charge was confirmed and recorded (terminal state).
    Paid,
}

impl PaymentState {
    /// Returns true if the order can accept a new charge.
    pub fn can_charge(&self) -> bool {
        matches!(self, PaymentState::Unpaid)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Unpaid => "unpaid",
            PaymentState::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Contact snapshot for one party of an order (librarian or customer).
///
/// Denormalized at order-placement time; defaulted when the caller did not
/// supply details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PartyDetails {
    pub email: String,
    pub name: String,
    pub photo: Option<String>,
}

impl PartyDetails {
    /// Creates party details with an email and display name.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            photo: None,
        }
    }
}

/// A purchase request linking a book, a customer, and a librarian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: EntityId,
    /// Reference to the purchased book. May be typed or raw in stored data.
    pub book_id: EntityRef,
    /// Reference to the purchasing customer.
    pub user_id: EntityRef,
    pub librarian: PartyDetails,
    pub customer: PartyDetails,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub payment_status: PaymentState,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending, unpaid order.
    pub fn new(
        book_id: EntityRef,
        user_id: EntityRef,
        librarian: PartyDetails,
        customer: PartyDetails,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            book_id,
            user_id,
            librarian,
            customer,
            order_date: now,
            status: OrderStatus::default(),
            payment_status: PaymentState::default(),
            created_at: now,
        }
    }
}
