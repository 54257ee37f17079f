//! # Validation Module
//!
//! Input validation utilities for Ruta POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Business rule preconditions, before any remote call               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── CHECK (quantity >= 0) on the stock ledger                         │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ruta_core::validation::{validate_quantity, validate_percent};
//!
//! validate_quantity(5).unwrap();
//! validate_percent(4.0).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::TransferRequest;
use crate::MAX_TRANSFER_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product business code.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 50 characters
///
/// ## Example
/// ```rust
/// use ruta_core::validation::validate_code;
///
/// assert!(validate_code("SHAMPOO-500").is_ok());
/// assert!(validate_code("").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock quantity for an addition or transfer.
///
/// ## Rules
/// - Must be positive (zero-quantity moves are rejected before any I/O)
/// - Must not exceed [`MAX_TRANSFER_QUANTITY`]
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_TRANSFER_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_TRANSFER_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a commission percentage entered on the admin screen.
///
/// Percentages are 0-100 at the edge; they become basis points internally.
pub fn validate_percent(percent: f64) -> ValidationResult<()> {
    if !(0.0..=100.0).contains(&percent) || !percent.is_finite() {
        return Err(ValidationError::OutOfRange {
            field: "percentage".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Transfer Preconditions
// =============================================================================

/// Validates a transfer request before any remote call.
///
/// ## Rules
/// - Origin and destination must differ
/// - Product id must be present
/// - Quantity must be positive and bounded
///
/// Stock sufficiency is NOT checked here — that requires the ledger and is
/// the transfer engine's conditional decrement.
pub fn validate_transfer(request: &TransferRequest) -> ValidationResult<()> {
    if request.origin == request.destination {
        return Err(ValidationError::SameLocation);
    }

    if request.product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    validate_quantity(request.quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
