//! Payment provider trait and in-memory mock implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::Money;

use crate::error::PaymentError;

/// A client-confirmable charge created at the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeIntent {
    /// Opaque intent identifier; becomes the transaction id on confirmation.
    pub intent_id: String,
    /// Secret handed to the client to confirm the charge.
    pub client_secret: String,
    /// Amount the intent was created for, in minor units.
    pub amount: Money,
}

/// A hosted checkout session handle.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionHandle {
    pub session_id: String,
    /// Redirect URL for the hosted flow.
    pub url: String,
}

/// Retrieved state of a hosted checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    /// The charge behind this session.
    pub payment_intent_id: String,
    pub amount_total: Money,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

/// One purchasable line of a checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub amount: Money,
    pub quantity: u32,
}

/// Trait for the external payment provider boundary.
///
/// The engine only passes opaque identifiers through; provider secrets are
/// never stored.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates a client-confirmable charge intent.
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<ChargeIntent, PaymentError>;

    /// Creates a hosted checkout session.
    async fn create_checkout_session(
        &self,
        line_items: Vec<LineItem>,
        success_url: &str,
        cancel_url: &str,
        metadata: HashMap<String, String>,
    ) -> Result<CheckoutSessionHandle, PaymentError>;

    /// Retrieves the state of a previously created session.
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError>;
}

#[derive(Debug, Default)]
struct MockProviderState {
    sessions: HashMap<String, CheckoutSession>,
    next_id: u32,
    fail_requests: bool,
}

/// In-memory payment provider for testing.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentProvider {
    state: Arc<RwLock<MockProviderState>>,
}

impl MockPaymentProvider {
    /// Creates a new mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the provider to fail subsequent requests.
    pub fn set_fail_requests(&self, fail: bool) {
        self.state.write().unwrap().fail_requests = fail;
    }

    /// Returns the number of open sessions.
    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().sessions.len()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_intent(
        &self,
        amount: Money,
        _currency: &str,
        _metadata: HashMap<String, String>,
    ) -> Result<ChargeIntent, PaymentError> {
        let mut state = self.state.write().unwrap();

        if state.fail_requests {
            return Err(PaymentError::Provider("intent declined".to_string()));
        }

        state.next_id += 1;
        let intent_id = format!("pi_{:04}", state.next_id);
        let client_secret = format!("{intent_id}_secret");
        Ok(ChargeIntent {
            intent_id,
            client_secret,
            amount,
        })
    }

    async fn create_checkout_session(
        &self,
        line_items: Vec<LineItem>,
        _success_url: &str,
        _cancel_url: &str,
        metadata: HashMap<String, String>,
    ) -> Result<CheckoutSessionHandle, PaymentError> {
        let mut state = self.state.write().unwrap();

        if state.fail_requests {
            return Err(PaymentError::Provider("session declined".to_string()));
        }

        state.next_id += 1;
        let session_id = format!("cs_{:04}", state.next_id);
        let payment_intent_id = format!("pi_{:04}", state.next_id);

        let amount_total = line_items
            .iter()
            .fold(Money::zero(), |acc, item| {
                acc + Money::from_minor_units(item.amount.minor_units() * item.quantity as i64)
            });

        state.sessions.insert(
            session_id.clone(),
            CheckoutSession {
                payment_intent_id,
                amount_total,
                currency: "usd".to_string(),
                metadata,
            },
        );

        Ok(CheckoutSessionHandle {
            url: format!("https://checkout.example.com/{session_id}"),
            session_id,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        let state = self.state.read().unwrap();

        if state.fail_requests {
            return Err(PaymentError::Provider("retrieve failed".to_string()));
        }

        state
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| PaymentError::Provider(format!("no such session: {session_id}")))
    }
}
