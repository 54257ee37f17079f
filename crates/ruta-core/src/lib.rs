//! # ruta-core: Pure Business Logic for Ruta POS
//!
//! This crate is the **heart** of Ruta POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ruta POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Seller & Storefront Frontends                  │   │
//! │  │   Stock Search ──► Transfers ──► Commissions ──► Cart/Checkout  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ ruta-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌────────────┐ ┌─────────────┐ ┌────────┐        │   │
//! │  │  │  money  │ │ commission │ │ installment │ │ credit │        │   │
//! │  │  │  types  │ │ calculator │ │  coverage   │ │ rules  │        │   │
//! │  │  └─────────┘ └────────────┘ └─────────────┘ └────────┘        │   │
//! │  │  ┌────────────┐ ┌────────┐                                    │   │
//! │  │  │ validation │ │ search │                                    │   │
//! │  │  └────────────┘ └────────┘                                    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ruta-db (Database Layer)                     │   │
//! │  │      SQLite queries, migrations, repositories, checkout         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockEntry, Agreement, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`commission`] - Seller commission calculator (per-method rates, bonuses, discounts)
//! - [`installment`] - FIFO payment coverage over installment schedules
//! - [`credit`] - Credit rules engine and payment plan generation
//! - [`search`] - Exact-match resolution for stock search input
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use ruta_core::money::Money;
//! use ruta_core::types::Percentage;
//!
//! // Create money from cents (never from floats!)
//! let sale = Money::from_cents(10_000); // $100.00
//!
//! // A 5% cash commission, computed in basis points
//! let rate = Percentage::from_bps(500);
//! let commission = sale.apply_percentage(rate);
//!
//! assert_eq!(commission.cents(), 500); // $5.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod credit;
pub mod error;
pub mod installment;
pub mod money;
pub mod search;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use ruta_core::Money` instead of
// `use ruta_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity moved in a single stock transfer
///
/// ## Business Reason
/// Prevents fat-finger transfers (e.g., typing 5000 instead of 50) from
/// draining the warehouse. Larger moves are split into multiple transfers.
pub const MAX_TRANSFER_QUANTITY: i64 = 9_999;

/// Maximum quantity of a single product in a storefront cart
///
/// ## Business Reason
/// Online orders are retail-sized. Wholesale quantities go through the
/// seller flow, not the storefront.
pub const MAX_CART_QUANTITY: i64 = 999;
