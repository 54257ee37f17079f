//! # Domain Types
//!
//! Core domain types used throughout Ruta POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   StockEntry    │   │ TransferRequest │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  product_id     │   │  origin         │       │
//! │  │  code (business)│   │  location       │   │  destination    │       │
//! │  │  name / brand   │   │  quantity ≥ 0   │   │  quantity > 0   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Location     │   │  SalesRecord    │   │  Installment    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Warehouse      │   │  method         │   │  amount / paid  │       │
//! │  │  Van { id }     │   │  amount_cents   │   │  due_date       │       │
//! │  └─────────────────┘   │  seller / van   │   │  status         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (product code, installment sequence, etc.) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Percentage
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% (the default cash commission rate)
///
/// Commission config is entered as 0-100 values at the API edge and stored
/// as bps internally so the math stays in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from a 0-100 value (for convenience at the edge).
    pub fn from_percent(pct: f64) -> Self {
        Percentage((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a 0-100 value (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

// =============================================================================
// Location
// =============================================================================

/// An inventory location.
///
/// The location set is closed: one central warehouse plus zero or more
/// "vans" — mobile routes or the virtual online store. Exactly one
/// warehouse exists; vans carry unique identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Location {
    /// The central warehouse (singleton; needs no identifier).
    Warehouse,
    /// A van: a delivery route or the online store.
    Van { van_id: String },
}

impl Location {
    /// Stable discriminant used as the database column value.
    pub fn kind(&self) -> &'static str {
        match self {
            Location::Warehouse => "warehouse",
            Location::Van { .. } => "van",
        }
    }

    /// The van identifier, if this location is a van.
    pub fn van_id(&self) -> Option<&str> {
        match self {
            Location::Warehouse => None,
            Location::Van { van_id } => Some(van_id),
        }
    }

    /// Reassembles a location from its stored (kind, van_id) pair.
    ///
    /// Returns `None` for an unknown kind or a van row missing its id,
    /// which would indicate ledger corruption.
    pub fn from_parts(kind: &str, van_id: Option<String>) -> Option<Location> {
        match kind {
            "warehouse" => Some(Location::Warehouse),
            "van" => van_id.map(|van_id| Location::Van { van_id }),
            _ => None,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Warehouse => write!(f, "warehouse"),
            Location::Van { van_id } => write!(f, "van:{van_id}"),
        }
    }
}

// =============================================================================
// Van
// =============================================================================

/// A van record: a mobile route or the virtual online-store location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Van {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in location selectors ("Van Norte", "Online").
    pub name: String,

    /// Inactive vans keep their history but stop appearing as transfer
    /// destinations.
    pub is_active: bool,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code - what the barcode scanner produces.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Brand, used as a third search field.
    pub brand: Option<String>,

    /// List price in cents.
    pub price_cents: i64,

    /// Soft-delete flag; inactive products stay referenced by history.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Stock Ledger Types
// =============================================================================

/// Quantity-on-hand of one product at one location.
///
/// ## Invariants
/// - At most one StockEntry per (product, location) pair
/// - `quantity` is never negative
/// - A missing row means quantity 0; rows may sit at 0 after transfers
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product this balance belongs to.
    pub product_id: String,

    /// Where the stock physically (or virtually) sits.
    pub location: Location,

    /// Units on hand. Non-negative.
    pub quantity: i64,
}

/// A product candidate returned by stock search, annotated with its
/// current balance at the searched location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockCandidate {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub brand: Option<String>,

    /// Whether a stock row exists at the searched location.
    pub in_inventory: bool,

    /// Current quantity at the searched location (0 if not stocked yet).
    pub quantity: i64,
}

/// A request to move stock between two locations.
///
/// Ephemeral: exists only for the duration of one transfer operation.
/// Validated before execution; see [`crate::validation::validate_transfer`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferRequest {
    pub origin: Location,
    pub destination: Location,
    pub product_id: String,
    /// Units to move. Must be positive.
    pub quantity: i64,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
///
/// The four-way split mirrors how sellers reconcile a day: cash in the
/// drawer, card terminal batch, bank transfers, everything else.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

impl PaymentMethod {
    /// All methods, in the order configuration screens list them.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
        PaymentMethod::Other,
    ];
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Other => "other",
        };
        write!(f, "{s}")
    }
}

// =============================================================================
// Sales Record
// =============================================================================

/// One sale's contribution to commission math.
///
/// Immutable once recorded by the point-of-sale flow; the commission
/// calculator only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesRecord {
    pub id: String,
    pub method: PaymentMethod,
    /// Amount in cents. Non-negative.
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub seller_id: String,
    pub van_id: String,
}

impl SalesRecord {
    /// Returns the sale amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// The sales a commission run covers, plus the day's side-channel counts
/// that bonus rules consult.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesBatch {
    pub seller_id: String,
    pub van_id: String,
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
    pub records: Vec<SalesRecord>,
    /// New customers registered in the period (bonus-rule input).
    pub new_customers: u32,
}

// =============================================================================
// Approval Status
// =============================================================================

/// Approval state of a persisted commission result.
///
/// The only transition is `Pending → Approved`, one-way. There is no
/// un-approve.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        ApprovalStatus::Pending
    }
}

// =============================================================================
// Payment Agreements
// =============================================================================

/// Lifecycle of a payment agreement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    /// Installments outstanding, customer in good standing.
    Active,
    /// The customer defaulted; broken agreements reduce the credit limit.
    Broken,
    /// Fully paid.
    Completed,
}

/// A payment agreement: a credit balance split into installments.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Agreement {
    pub id: String,
    pub customer_id: String,
    /// Sale that originated the credit, when known.
    pub sale_id: Option<String>,
    pub van_id: Option<String>,
    pub user_id: Option<String>,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub num_installments: i64,
    /// Total term in days.
    pub term_days: i64,
    #[ts(as = "String")]
    pub deadline: NaiveDate,
    pub status: AgreementStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Agreement {
    /// Outstanding balance on this agreement, never negative.
    #[inline]
    pub fn outstanding(&self) -> Money {
        (Money::from_cents(self.total_cents) - Money::from_cents(self.paid_cents))
            .clamp_non_negative()
    }
}

/// Status of a single installment (cuota).
///
/// Transitions are monotonic except `Partial ↔ Overdue`, which may cycle
/// with the passage of time relative to the due date.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Partial,
    Overdue,
    Paid,
}

/// One scheduled partial payment within a payment agreement.
///
/// Ordered by due date ascending for FIFO payment application.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Installment {
    pub id: String,
    pub agreement_id: String,
    /// 1-based position within the agreement.
    pub sequence: i64,
    pub amount_cents: i64,
    pub paid_cents: i64,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
    pub status: InstallmentStatus,
    pub days_late: i64,
}

impl Installment {
    /// Amount still owed on this installment, never negative.
    #[inline]
    pub fn pending(&self) -> Money {
        (Money::from_cents(self.amount_cents) - Money::from_cents(self.paid_cents))
            .clamp_non_negative()
    }
}

// =============================================================================
// Storefront Cart
// =============================================================================

/// Who a storefront cart belongs to.
///
/// Anonymous visitors get a client-generated token with lifecycle =
/// first-use creation, persisted for the life of the client installation;
/// signing in replaces it with the account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartIdentity {
    User(String),
    Anonymous(String),
}

impl CartIdentity {
    /// The identity token regardless of kind.
    pub fn token(&self) -> &str {
        match self {
            CartIdentity::User(id) | CartIdentity::Anonymous(id) => id,
        }
    }
}

/// A storefront cart row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Cart {
    pub id: String,
    /// Set when the cart belongs to an authenticated account.
    pub user_id: Option<String>,
    /// Set when the cart belongs to an anonymous visitor.
    pub anon_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One product line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartItem {
    pub cart_id: String,
    pub product_id: String,
    /// Units requested; clamped to available online stock on write.
    pub quantity: i64,
    /// Unit price in cents at the time the line was added.
    pub unit_price_cents: i64,
}

impl CartItem {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
