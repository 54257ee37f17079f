//! # Cart Repository
//!
//! Storefront cart persistence: one cart per identity, quantities clamped
//! to what the online store can actually ship.
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Cart Per Identity                              │
//! │                                                                         │
//! │  Signed-in visitor   → carts.user_id = account id     (UNIQUE)         │
//! │  Anonymous visitor   → carts.anon_id = "anon_..."      (UNIQUE)        │
//! │                                                                         │
//! │  The anonymous token is generated once per client installation and     │
//! │  sent with every request; the same browser always lands on the same    │
//! │  cart.                                                                  │
//! │                                                                         │
//! │  ensure_cart is find-or-create: two concurrent first requests both     │
//! │  try to INSERT, the loser hits the UNIQUE index and re-reads the       │
//! │  winner's row. No row is ever duplicated.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ruta_core::{Cart, CartIdentity, CartItem, CoreError, Location, MAX_CART_QUANTITY};

/// Client-side anonymous identity token.
pub struct AnonId;

impl AnonId {
    /// Generates a fresh `anon_`-prefixed token. Called once per client
    /// installation; the client persists and re-sends it.
    pub fn generate() -> String {
        format!("anon_{}", Uuid::new_v4().simple())
    }
}

/// Repository for storefront carts.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Finds the identity's cart, creating it on first use.
    ///
    /// Concurrent first calls race on the UNIQUE identity index; the loser
    /// re-reads and returns the winner's row.
    pub async fn ensure_cart(&self, identity: &CartIdentity) -> DbResult<Cart> {
        if let Some(cart) = self.find_cart(identity).await? {
            return Ok(cart);
        }

        let cart = Cart {
            id: Uuid::new_v4().to_string(),
            user_id: match identity {
                CartIdentity::User(id) => Some(id.clone()),
                CartIdentity::Anonymous(_) => None,
            },
            anon_id: match identity {
                CartIdentity::User(_) => None,
                CartIdentity::Anonymous(id) => Some(id.clone()),
            },
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            "INSERT INTO carts (id, user_id, anon_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&cart.id)
        .bind(&cart.user_id)
        .bind(&cart.anon_id)
        .bind(cart.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                debug!(cart_id = %cart.id, "Created cart");
                Ok(cart)
            }
            Err(err) => {
                let err = DbError::from(err);
                if err.is_unique_violation() {
                    // Lost the race; the winner's cart is there now.
                    self.find_cart(identity)
                        .await?
                        .ok_or_else(|| DbError::not_found("Cart", identity.token()))
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn find_cart(&self, identity: &CartIdentity) -> DbResult<Option<Cart>> {
        let (column, token) = match identity {
            CartIdentity::User(id) => ("user_id", id),
            CartIdentity::Anonymous(id) => ("anon_id", id),
        };

        let sql = format!(
            "SELECT id, user_id, anon_id, created_at FROM carts WHERE {column} = ?1"
        );
        let cart: Option<Cart> = sqlx::query_as(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(cart)
    }

    /// Sets a product's quantity in the cart, returning the stored quantity.
    ///
    /// The requested quantity is clamped to the online (warehouse) stock
    /// and to [`MAX_CART_QUANTITY`]; a clamped-to-zero or explicit zero
    /// removes the line. The unit price is snapshotted from the catalog at
    /// write time.
    pub async fn set_item(&self, cart_id: &str, product_id: &str, quantity: i64) -> DbResult<i64> {
        let available: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock \
             WHERE product_id = ?1 AND location_kind = 'warehouse' AND van_id = ''",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        let stored = quantity
            .max(0)
            .min(available.unwrap_or(0))
            .min(MAX_CART_QUANTITY);

        if stored == 0 {
            sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND product_id = ?2")
                .bind(cart_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
            return Ok(0);
        }

        let price_cents: Option<i64> =
            sqlx::query_scalar("SELECT price_cents FROM products WHERE id = ?1 AND is_active = 1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
        let price_cents = price_cents
            .ok_or_else(|| DbError::from(CoreError::ProductNotFound(product_id.to_string())))?;

        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, quantity, unit_price_cents) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = excluded.quantity, \
                           unit_price_cents = excluded.unit_price_cents",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(stored)
        .bind(price_cents)
        .execute(&self.pool)
        .await?;

        debug!(cart_id, product_id, requested = quantity, stored, "Cart item set");
        Ok(stored)
    }

    /// All lines in a cart.
    pub async fn items(&self, cart_id: &str) -> DbResult<Vec<CartItem>> {
        let items: Vec<CartItem> = sqlx::query_as(
            "SELECT cart_id, product_id, quantity, unit_price_cents \
             FROM cart_items WHERE cart_id = ?1 ORDER BY product_id",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Total units across all lines (the badge number).
    pub async fn item_count(&self, cart_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE cart_id = ?1",
        )
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Cart total in cents (Σ quantity × snapshotted unit price).
    pub async fn total_cents(&self, cart_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity * unit_price_cents), 0) \
             FROM cart_items WHERE cart_id = ?1",
        )
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Empties a cart (after a completed checkout).
    pub async fn clear(&self, cart_id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// The location online orders ship from.
    pub fn online_location() -> Location {
        Location::Warehouse
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
