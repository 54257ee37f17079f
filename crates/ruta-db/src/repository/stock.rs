//! # Stock Repository
//!
//! Per-location stock balances and the transfer engine.
//!
//! ## Ledger Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stock Ledger                                      │
//! │                                                                         │
//! │  One row per (product, location):                                      │
//! │                                                                         │
//! │  product_id  | location_kind | van_id  | quantity                      │
//! │  ────────────┼───────────────┼─────────┼─────────                      │
//! │  SHAMPOO-500 | warehouse     | ''      | 40                            │
//! │  SHAMPOO-500 | van           | van-1   | 12                            │
//! │  SHAMPOO-500 | van           | van-2   | 3                             │
//! │                                                                         │
//! │  Missing row ⇒ quantity 0. Rows may sit at 0 after transfers           │
//! │  (deleting them would lose the "was ever stocked here" signal).        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transfer Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Transfer: debit origin, credit destination                 │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE stock SET quantity = quantity - n                              │
//! │   WHERE product + origin AND quantity >= n    ← conditional decrement  │
//! │       │                                                                 │
//! │       ├── 0 rows affected → InsufficientStock, ROLLBACK (no writes)    │
//! │       ▼                                                                 │
//! │  INSERT ... ON CONFLICT DO UPDATE quantity + n  ← upsert credit        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  The quantity >= n predicate makes concurrent over-debits lose the     │
//! │  race instead of driving the balance negative; the CHECK constraint    │
//! │  in the schema backstops it.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use ruta_core::validation::validate_transfer;
use ruta_core::{CoreError, Location, StockCandidate, StockEntry, TransferRequest, Van};

/// Repository for stock balance operations and transfers.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

/// Splits a location into its (kind, van_id) column pair.
/// The warehouse stores an empty van_id so the UNIQUE index applies.
fn location_parts(location: &Location) -> (&str, &str) {
    (location.kind(), location.van_id().unwrap_or(""))
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Current quantity of a product at a location. Missing row ⇒ 0.
    pub async fn quantity_at(&self, product_id: &str, location: &Location) -> DbResult<i64> {
        let (kind, van_id) = location_parts(location);

        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock \
             WHERE product_id = ?1 AND location_kind = ?2 AND van_id = ?3",
        )
        .bind(product_id)
        .bind(kind)
        .bind(van_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Adds stock at a location, creating the row if needed.
    ///
    /// Used for receiving goods at the warehouse and for corrections.
    pub async fn add_stock(
        &self,
        product_id: &str,
        location: &Location,
        quantity: i64,
    ) -> DbResult<()> {
        ruta_core::validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let (kind, van_id) = location_parts(location);
        let id = Uuid::new_v4().to_string();

        debug!(product_id = %product_id, location = %location, quantity, "Adding stock");

        sqlx::query(
            "INSERT INTO stock (id, product_id, location_kind, van_id, quantity) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (product_id, location_kind, van_id) \
             DO UPDATE SET quantity = quantity + excluded.quantity",
        )
        .bind(&id)
        .bind(product_id)
        .bind(kind)
        .bind(van_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Registers a van so it can appear as a transfer destination.
    pub async fn register_van(&self, van: &Van) -> DbResult<()> {
        sqlx::query("INSERT INTO vans (id, name, is_active) VALUES (?1, ?2, ?3)")
            .bind(&van.id)
            .bind(&van.name)
            .bind(van.is_active)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Active vans, the selectable transfer destinations.
    pub async fn active_vans(&self) -> DbResult<Vec<Van>> {
        let vans: Vec<Van> =
            sqlx::query_as("SELECT id, name, is_active FROM vans WHERE is_active = 1 ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(vans)
    }

    /// All balances of one product across locations (the "where is this
    /// product" view). Rows sitting at 0 are included.
    pub async fn entries_for_product(&self, product_id: &str) -> DbResult<Vec<StockEntry>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            "SELECT id, location_kind, van_id, quantity FROM stock \
             WHERE product_id = ?1 ORDER BY location_kind, van_id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .into_iter()
            .filter_map(|(id, kind, van_id, quantity)| {
                let van_id = (!van_id.is_empty()).then_some(van_id);
                Location::from_parts(&kind, van_id).map(|location| StockEntry {
                    id,
                    product_id: product_id.to_string(),
                    location,
                    quantity,
                })
            })
            .collect();

        Ok(entries)
    }

    /// Searches active products by substring (code, name, brand), annotating
    /// each candidate with its balance at the given location.
    ///
    /// Products never stocked at the location still appear, with
    /// `in_inventory = false` and quantity 0, so the seller can see what
    /// exists in the catalog but not on the shelf.
    pub async fn search_in_location(
        &self,
        filter: &str,
        location: &Location,
        limit: u32,
    ) -> DbResult<Vec<StockCandidate>> {
        let (kind, van_id) = location_parts(location);
        let pattern = format!("%{}%", filter.trim());

        debug!(filter = %filter, location = %location, "Searching stock");

        let candidates: Vec<StockCandidate> = sqlx::query_as(
            "SELECT \
                 p.id AS product_id, \
                 p.code, \
                 p.name, \
                 p.brand, \
                 s.id IS NOT NULL AS in_inventory, \
                 COALESCE(s.quantity, 0) AS quantity \
             FROM products p \
             LEFT JOIN stock s \
                 ON s.product_id = p.id \
                 AND s.location_kind = ?2 \
                 AND s.van_id = ?3 \
             WHERE p.is_active = 1 \
             AND (p.code LIKE ?1 OR p.name LIKE ?1 OR p.brand LIKE ?1) \
             ORDER BY p.name \
             LIMIT ?4",
        )
        .bind(&pattern)
        .bind(kind)
        .bind(van_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    /// Moves stock from one location to another, atomically.
    ///
    /// ## What This Does
    /// 1. Validates the request (distinct locations, positive quantity)
    /// 2. In a single transaction:
    ///    a. Conditionally decrements the origin (`quantity >= n` predicate)
    ///    b. Upserts the credit at the destination
    ///
    /// ## Errors
    /// * `DbError::Core(InsufficientStock)` - origin balance below the
    ///   requested quantity; no writes occurred
    /// * `DbError::Core(Validation(..))` - malformed request; no writes
    pub async fn transfer(&self, request: &TransferRequest) -> DbResult<()> {
        validate_transfer(request).map_err(CoreError::from)?;

        let (origin_kind, origin_van) = location_parts(&request.origin);
        let (dest_kind, dest_van) = location_parts(&request.destination);

        debug!(
            product_id = %request.product_id,
            origin = %request.origin,
            destination = %request.destination,
            quantity = request.quantity,
            "Starting stock transfer"
        );

        let mut tx = self.pool.begin().await?;

        // Debit the origin. The quantity >= n predicate is the concurrency
        // guard: a racing transfer that would overdraw simply affects 0 rows.
        let debit = sqlx::query(
            "UPDATE stock SET quantity = quantity - ?4 \
             WHERE product_id = ?1 AND location_kind = ?2 AND van_id = ?3 \
             AND quantity >= ?4",
        )
        .bind(&request.product_id)
        .bind(origin_kind)
        .bind(origin_van)
        .bind(request.quantity)
        .execute(&mut *tx)
        .await?;

        if debit.rows_affected() == 0 {
            // Read the actual balance for the error message, then abort.
            let available: Option<i64> = sqlx::query_scalar(
                "SELECT quantity FROM stock \
                 WHERE product_id = ?1 AND location_kind = ?2 AND van_id = ?3",
            )
            .bind(&request.product_id)
            .bind(origin_kind)
            .bind(origin_van)
            .fetch_optional(&mut *tx)
            .await?;

            tx.rollback().await?;

            return Err(CoreError::InsufficientStock {
                product_id: request.product_id.clone(),
                location: request.origin.to_string(),
                available: available.unwrap_or(0),
                requested: request.quantity,
            }
            .into());
        }

        // Credit the destination. A failure here (e.g. FK violation on an
        // unknown product) aborts the whole transaction, debit included.
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO stock (id, product_id, location_kind, van_id, quantity) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (product_id, location_kind, van_id) \
             DO UPDATE SET quantity = quantity + excluded.quantity",
        )
        .bind(&id)
        .bind(&request.product_id)
        .bind(dest_kind)
        .bind(dest_van)
        .bind(request.quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            product_id = %request.product_id,
            origin = %request.origin,
            destination = %request.destination,
            quantity = request.quantity,
            "Stock transfer complete"
        );

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
