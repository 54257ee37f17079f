//! # ruta-db: Database Layer for Ruta POS
//!
//! This crate provides database access for the Ruta POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ruta POS Data Flow                               │
//! │                                                                         │
//! │  API Handler (transfer_stock, apply_payment, begin_checkout, ...)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      ruta-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ stock, cart,  │    │  (embedded)  │  │   │
//! │  │   │               │    │ commission,   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ agreement,    │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ product       │    │ ...          │  │   │
//! │  │   │ Management    │    │ + checkout    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  SQLite Database                     Payment Provider                   │
//! │  (WAL mode, embedded)                (external, via trait)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`checkout`] - Checkout orchestration over the payment provider seam
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ruta_db::{Database, DbConfig};
//!
//! // Create database with default config (migrations run automatically)
//! let db = Database::new(DbConfig::new("path/to/ruta.db")).await?;
//!
//! // Use repositories
//! let candidates = db.stock().search_in_location("soap", &location, 20).await?;
//! db.stock().transfer(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use checkout::{Checkout, PaymentProvider};
pub use repository::agreement::AgreementRepository;
pub use repository::cart::{AnonId, CartRepository};
pub use repository::commission::CommissionRepository;
pub use repository::product::ProductRepository;
pub use repository::stock::StockRepository;
