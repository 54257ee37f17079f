//! # Repository Module
//!
//! Database repository implementations for Ruta POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  API Handler                                                            │
//! │       │                                                                 │
//! │       │  db.stock().transfer(&request)                                 │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  StockRepository                                                       │
//! │  ├── quantity_at(&self, product, location)                             │
//! │  ├── add_stock(&self, product, location, qty)                          │
//! │  ├── search_in_location(&self, filter, location, limit)                │
//! │  └── transfer(&self, request)                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database per test)                          │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and search
//! - [`StockRepository`](stock::StockRepository) - Per-location balances and transfers
//! - [`CommissionRepository`](commission::CommissionRepository) - Configs, runs, approval
//! - [`AgreementRepository`](agreement::AgreementRepository) - Credit agreements and installments
//! - [`CartRepository`](cart::CartRepository) - Storefront carts

pub mod agreement;
pub mod cart;
pub mod commission;
pub mod product;
pub mod stock;
