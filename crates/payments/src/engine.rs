//! Payment reconciliation engine.

use std::collections::HashMap;
use std::time::Duration;

use common::{EntityId, Money};
use entity_store::{Book, EntityStore, Order, Payment, ProductSnapshot, RecordedPayment};

use crate::error::{PaymentError, Result};
use crate::provider::{ChargeIntent, CheckoutSessionHandle, LineItem, PaymentProvider};

/// Metadata key carrying the order identifier through the provider.
const ORDER_ID_KEY: &str = "order_id";

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Bound on every provider call; elapsing surfaces a retryable error
    /// without touching the store.
    pub provider_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            success_url: "https://bookcourier.example.com/payment/success".to_string(),
            cancel_url: "https://bookcourier.example.com/payment/cancel".to_string(),
            provider_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of a confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedPayment {
    pub payment: Payment,
    pub order_id: EntityId,
    /// True when an earlier confirmation already recorded this transaction
    /// and this call changed nothing.
    pub already_recorded: bool,
}

/// Drives orders from `unpaid` to `paid` against the payment provider.
///
/// Intent/session creation mutates nothing locally; the order stays unpaid
/// until a confirmation arrives. Both confirmation entry points (direct
/// intent and hosted checkout session) converge on one guarded recording
/// path keyed by the provider's transaction identifier, so confirming the
/// same transaction twice records exactly one payment and flips the order's
/// payment status exactly once.
pub struct ReconciliationEngine<S, P> {
    store: S,
    provider: P,
    options: EngineOptions,
}

impl<S: EntityStore, P: PaymentProvider> ReconciliationEngine<S, P> {
    /// Creates an engine with default options.
    pub fn new(store: S, provider: P) -> Self {
        Self::with_options(store, provider, EngineOptions::default())
    }

    /// Creates an engine with explicit options.
    pub fn with_options(store: S, provider: P, options: EngineOptions) -> Self {
        Self {
            store,
            provider,
            options,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a client-confirmable charge intent for an order.
    ///
    /// The amount is the book's current price converted to minor units.
    /// If the price changes before confirmation, last write wins; the
    /// payment snapshot freezes whatever was confirmed.
    #[tracing::instrument(skip(self))]
    pub async fn create_charge_intent(&self, order_id: EntityId) -> Result<ChargeIntent> {
        let (order, book) = self.load_order_and_book(order_id).await?;
        if !order.payment_status.can_charge() {
            return Err(PaymentError::AlreadyPaid(order_id));
        }

        let amount = Money::from_major(book.price);
        let metadata = order_metadata(order_id);

        let intent = self
            .bounded(self.provider.create_intent(amount, &self.options.currency, metadata))
            .await?;

        metrics::counter!("payment_intents_created_total").increment(1);
        tracing::info!(order_id = %order_id, intent_id = %intent.intent_id, "charge intent created");
        Ok(intent)
    }

    /// Creates a hosted checkout session for an order.
    #[tracing::instrument(skip(self))]
    pub async fn create_checkout_session(
        &self,
        order_id: EntityId,
    ) -> Result<CheckoutSessionHandle> {
        let (order, book) = self.load_order_and_book(order_id).await?;
        if !order.payment_status.can_charge() {
            return Err(PaymentError::AlreadyPaid(order_id));
        }

        let line_items = vec![LineItem {
            name: book.name.clone(),
            amount: Money::from_major(book.price),
            quantity: 1,
        }];

        let handle = self
            .bounded(self.provider.create_checkout_session(
                line_items,
                &self.options.success_url,
                &self.options.cancel_url,
                order_metadata(order_id),
            ))
            .await?;

        metrics::counter!("checkout_sessions_created_total").increment(1);
        Ok(handle)
    }

    /// Confirms a hosted checkout session.
    ///
    /// Retrieves the session from the provider, resolves the order through
    /// its metadata, and records the payment through the idempotency guard.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_checkout_session(&self, session_id: &str) -> Result<ConfirmedPayment> {
        let session = self
            .bounded(self.provider.retrieve_session(session_id))
            .await?;

        let raw_order_id = session
            .metadata
            .get(ORDER_ID_KEY)
            .ok_or(PaymentError::MissingMetadata { field: ORDER_ID_KEY })?;
        let order_id = parse_order_id(raw_order_id)?;

        let (order, book) = self.load_order_and_book(order_id).await?;
        self.record(
            order,
            &book,
            &session.payment_intent_id,
            session.amount_total,
            &session.currency,
        )
        .await
    }

    /// Confirms a directly-confirmed charge intent.
    ///
    /// Runs through the same guarded recording path as the session flow.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_direct(&self, order_id: &str, intent_id: &str) -> Result<ConfirmedPayment> {
        let order_id = parse_order_id(order_id)?;
        let (order, book) = self.load_order_and_book(order_id).await?;
        let amount = Money::from_major(book.price);
        let currency = self.options.currency.clone();
        self.record(order, &book, intent_id, amount, &currency).await
    }

    async fn load_order_and_book(&self, order_id: EntityId) -> Result<(Order, Book)> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| PaymentError::OrderNotFound(order_id.to_string()))?;
        let book_id = order
            .book_id
            .as_id()
            .ok_or(PaymentError::BookNotFound(order_id))?;
        let book = self
            .store
            .get_book(book_id)
            .await?
            .ok_or(PaymentError::BookNotFound(order_id))?;
        Ok((order, book))
    }

    /// The single guarded recording path.
    ///
    /// The store decides the outcome under its own atomic unit: a replayed
    /// transaction returns the prior payment (even on a paid order), a new
    /// transaction against a paid order is a conflict, anything else
    /// inserts and flips.
    async fn record(
        &self,
        order: Order,
        book: &Book,
        transaction_id: &str,
        amount: Money,
        currency: &str,
    ) -> Result<ConfirmedPayment> {
        let payment = Payment::new(
            order.id.to_string(),
            transaction_id,
            amount,
            currency,
            order.customer.clone(),
            ProductSnapshot {
                book_id: book.id.to_string(),
                name: book.name.clone(),
                image: book.image.clone(),
                price: amount,
            },
        );

        let payment = match self.store.record_payment(payment).await? {
            RecordedPayment::Existing(existing) => {
                metrics::counter!("payment_confirm_replays_total").increment(1);
                return Ok(ConfirmedPayment {
                    order_id: order.id,
                    payment: existing,
                    already_recorded: true,
                });
            }
            RecordedPayment::OrderAlreadyPaid => {
                return Err(PaymentError::AlreadyPaid(order.id));
            }
            RecordedPayment::Created(payment) => payment,
        };

        metrics::counter!("payments_confirmed_total").increment(1);
        tracing::info!(
            order_id = %order.id,
            transaction_id,
            amount = amount.minor_units(),
            "payment recorded"
        );

        Ok(ConfirmedPayment {
            payment,
            order_id: order.id,
            already_recorded: false,
        })
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout_ms = self.options.provider_timeout.as_millis() as u64;
        match tokio::time::timeout(self.options.provider_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(PaymentError::ProviderTimeout { timeout_ms }),
        }
    }
}

fn order_metadata(order_id: EntityId) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert(ORDER_ID_KEY.to_string(), order_id.to_string());
    metadata
}

fn parse_order_id(raw: &str) -> Result<EntityId> {
    EntityId::parse(raw).map_err(|_| PaymentError::MalformedId {
        value: raw.to_string(),
    })
}
