//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Substring search across code, name, and brand
//! - CRUD operations
//! - Soft delete via the active flag
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Catalog Search Works                             │
//! │                                                                         │
//! │  User types: "cola"                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE '%cola%' across: code, name, brand (case-insensitive)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ COLA-330  | Cola 330ml      | Fresca   │ ← MATCH (code, name)      │
//! │  │ AGUA-600  | Agua 600ml      | Colina   │ ← MATCH (brand)           │
//! │  │ JABON-01  | Jabón de barra  | Limpio   │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  The catalog is a few thousand rows; LIKE with a name index is plenty. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ruta_core::validation::validate_code;
use ruta_core::{CoreError, Product};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.search("cola", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str =
    "id, code, name, brand, price_cents, is_active, created_at, updated_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by substring across code, name, and brand.
    ///
    /// An empty query lists active products sorted by name.
    ///
    /// ## Arguments
    /// * `query` - Search term (can be partial)
    /// * `limit` - Maximum results to return
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        // SQLite LIKE is case-insensitive for ASCII by default.
        let pattern = format!("%{query}%");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 \
             AND (code LIKE ?1 OR name LIKE ?1 OR brand LIKE ?1) \
             ORDER BY name LIMIT ?2"
        );
        let products: Vec<Product> = sqlx::query_as(&sql)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products (no search filter), sorted by name.
    async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 ORDER BY name LIMIT ?1"
        );
        let products: Vec<Product> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID. `Ok(None)` when the ID doesn't exist.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product: Option<Product> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its business code (what the scanner produces).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1");
        let product: Option<Product> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - code already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_code(&product.code).map_err(CoreError::from)?;

        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            "INSERT INTO products \
             (id, code, name, brand, price_cents, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET \
             code = ?2, name = ?3, brand = ?4, price_cents = ?5, \
             is_active = ?6, updated_at = ?7 \
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical stock and sale rows still reference the product, so rows
    /// are never physically removed.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_product(code: &str, name: &str, brand: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            code: code.to_string(),
            name: name.to_string(),
            brand: brand.map(str::to_string),
            price_cents: 2_500,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("COLA-330", "Cola 330ml", Some("Fresca"));
        repo.insert(&product).await.unwrap();

        let found = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.code, "COLA-330");
        assert_eq!(found.price_cents, 2_500);

        let by_code = repo.get_by_code("COLA-330").await.unwrap().unwrap();
        assert_eq!(by_code.id, product.id);
    }

    #[tokio::test]
    async fn test_empty_code_rejected() {
        let db = test_db().await;
        let err = db
            .products()
            .insert(&sample_product("   ", "Nameless", None))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("DUP-1", "First", None))
            .await
            .unwrap();
        let err = repo
            .insert(&sample_product("DUP-1", "Second", None))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_search_matches_code_name_brand() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("COLA-330", "Cola 330ml", Some("Fresca")))
            .await
            .unwrap();
        repo.insert(&sample_product("AGUA-600", "Agua 600ml", Some("Colina")))
            .await
            .unwrap();
        repo.insert(&sample_product("JABON-01", "Jabón", Some("Limpio")))
            .await
            .unwrap();

        // "cola" matches the first by code/name and the second by brand
        let results = repo.search("cola", 20).await.unwrap();
        assert_eq!(results.len(), 2);

        // Empty query lists everything active
        let all = repo.search("", 20).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_search() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("GONE-1", "Widget", None);
        repo.insert(&product).await.unwrap();
        repo.soft_delete(&product.id).await.unwrap();

        assert!(repo.search("widget", 20).await.unwrap().is_empty());
        // Still reachable by ID for history
        let found = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert!(!found.is_active);
    }
}
