//! # Checkout
//!
//! Orchestrates a storefront checkout against an external payment provider.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Flow                                    │
//! │                                                                         │
//! │  begin(cart)                                                            │
//! │    │  total the cart in integer cents                                   │
//! │    ▼                                                                    │
//! │  provider.create_intent(total, currency) ──► client_secret              │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  orders row (status = pending) ──► client completes payment in the     │
//! │                                     provider's own UI                   │
//! │                                                                         │
//! │  confirm(order)                                                         │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  provider.session_status(session)                                       │
//! │    ├── Complete + paid → order.status = paid, cart cleared              │
//! │    ├── Expired         → order.status = expired                         │
//! │    └── Open            → order stays pending (poll again)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The provider is consumed through the [`PaymentProvider`] trait, never
//! implemented here: production wires in the real gateway client, tests an
//! in-memory fake. Amounts cross the boundary as integer minor units.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::cart::CartRepository;
use ruta_core::{CoreError, ValidationError};

// =============================================================================
// Provider Boundary
// =============================================================================

/// An error from the payment provider, opaque to us.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl From<ProviderError> for DbError {
    fn from(err: ProviderError) -> Self {
        DbError::PaymentProvider(err.0)
    }
}

/// A created payment session at the provider.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    /// Provider-side session identifier, stored on the order.
    pub session_id: String,
    /// Opaque secret the storefront hands to the provider's client SDK.
    pub client_secret: String,
}

/// Provider-side session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Complete,
    Expired,
}

/// A session status poll result.
#[derive(Debug, Clone, Copy)]
pub struct SessionState {
    pub status: SessionStatus,
    /// Whether the provider considers the session paid. Checked separately
    /// from `Complete`: a completed session with a failed capture is not
    /// paid.
    pub paid: bool,
}

/// The payment gateway seam. Implemented by the real gateway client in
/// production and by an in-memory fake in tests.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates a payment session for the given amount in minor units.
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentIntent, ProviderError>;

    /// Polls the state of a previously created session.
    async fn session_status(&self, session_id: &str) -> Result<SessionState, ProviderError>;
}

// =============================================================================
// Orders
// =============================================================================

/// Order lifecycle, driven by the provider's session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Expired,
}

/// A storefront order created at checkout begin.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub cart_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub provider_session_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Checkout
// =============================================================================

/// Checkout orchestrator: cart totals on one side, the payment provider on
/// the other.
pub struct Checkout<P> {
    pool: SqlitePool,
    provider: P,
}

impl<P: PaymentProvider> Checkout<P> {
    /// Creates a checkout orchestrator over a pool and a provider.
    pub fn new(pool: SqlitePool, provider: P) -> Self {
        Checkout { pool, provider }
    }

    fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    /// Begins a checkout: totals the cart, creates a provider session, and
    /// records a pending order.
    ///
    /// Returns the order and the client secret the storefront needs.
    ///
    /// ## Errors
    /// * `DbError::Core(Validation(..))` - the cart is empty
    /// * `DbError::PaymentProvider` - the provider rejected the intent
    pub async fn begin(&self, cart_id: &str, currency: &str) -> DbResult<(Order, String)> {
        let amount_cents = self.carts().total_cents(cart_id).await?;
        if amount_cents <= 0 {
            return Err(CoreError::Validation(ValidationError::MustBePositive {
                field: "cart total".to_string(),
            })
            .into());
        }

        let intent = self.provider.create_intent(amount_cents, currency).await?;

        let order = Order {
            id: Uuid::new_v4().to_string(),
            cart_id: cart_id.to_string(),
            amount_cents,
            currency: currency.to_string(),
            provider_session_id: intent.session_id,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            paid_at: None,
        };

        sqlx::query(
            "INSERT INTO orders \
             (id, cart_id, amount_cents, currency, provider_session_id, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)",
        )
        .bind(&order.id)
        .bind(&order.cart_id)
        .bind(order.amount_cents)
        .bind(&order.currency)
        .bind(&order.provider_session_id)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        info!(order_id = %order.id, amount_cents, "Checkout started");
        Ok((order, intent.client_secret))
    }

    /// Confirms an order by polling the provider session.
    ///
    /// Idempotent: re-confirming a paid order returns `Paid` without
    /// another provider call. A still-open session leaves the order
    /// pending; callers poll again.
    pub async fn confirm(&self, order_id: &str) -> DbResult<OrderStatus> {
        let order = self
            .get_order(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if order.status != OrderStatus::Pending {
            return Ok(order.status);
        }

        let state = self
            .provider
            .session_status(&order.provider_session_id)
            .await?;

        match (state.status, state.paid) {
            (SessionStatus::Complete, true) => {
                let now = Utc::now();
                sqlx::query(
                    "UPDATE orders SET status = 'paid', paid_at = ?2 \
                     WHERE id = ?1 AND status = 'pending'",
                )
                .bind(&order.id)
                .bind(now)
                .execute(&self.pool)
                .await?;

                self.carts().clear(&order.cart_id).await?;

                info!(order_id = %order.id, "Order paid");
                Ok(OrderStatus::Paid)
            }
            (SessionStatus::Complete, false) => {
                // Completed session without capture: keep polling, but flag it.
                warn!(order_id = %order.id, "Session complete but unpaid");
                Ok(OrderStatus::Pending)
            }
            (SessionStatus::Expired, _) => {
                sqlx::query(
                    "UPDATE orders SET status = 'expired' WHERE id = ?1 AND status = 'pending'",
                )
                .bind(&order.id)
                .execute(&self.pool)
                .await?;

                info!(order_id = %order.id, "Order expired");
                Ok(OrderStatus::Expired)
            }
            (SessionStatus::Open, _) => Ok(OrderStatus::Pending),
        }
    }

    /// Loads an order by id.
    pub async fn get_order(&self, id: &str) -> DbResult<Option<Order>> {
        let order: Option<Order> = sqlx::query_as(
            "SELECT id, cart_id, amount_cents, currency, provider_session_id, \
             status, created_at, paid_at \
             FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
