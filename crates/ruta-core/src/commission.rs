//! # Commission Calculator
//!
//! Pure commission math: turns a batch of sales records plus a
//! per-payment-method configuration into a commission breakdown and a
//! total payable.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Commission Pipeline                                 │
//! │                                                                         │
//! │  SalesBatch (records)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Step 1: group by payment method ──► totals, counts, share %           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Step 2: per-method commission (active methods only)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Step 3: bonus rules (sales target / cash share / new customers)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Step 4: discount rules (fixed / manual override)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Step 5: payable = commission + base salary + bonuses − discounts      │
//! │          (may be negative; never clamped)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! `CommissionCalculator::calculate` is deterministic and side-effect-free:
//! the same batch, config and adjustments always produce an identical
//! result. Persisting and approving results is the data layer's job.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ApprovalStatus, PaymentMethod, Percentage, SalesBatch};

// =============================================================================
// Configuration
// =============================================================================

/// Commission settings for one payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodConfig {
    pub percentage: Percentage,
    /// Inactive methods earn no commission but still count toward the
    /// grand total (and therefore the share percentages).
    pub active: bool,
}

/// Condition attached to a bonus rule, evaluated against the batch's
/// aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BonusCondition {
    /// Total sales reach a threshold.
    SalesTarget { threshold_cents: i64 },
    /// Cash's share of total sales reaches a threshold (basis points).
    CashShare { threshold_bps: u32 },
    /// New customers registered in the period reach a threshold.
    NewCustomers { threshold: u32 },
}

/// A bonus rule: contributes its fixed amount when its condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BonusRule {
    pub id: String,
    pub name: String,
    pub amount_cents: i64,
    pub active: bool,
    pub condition: BonusCondition,
}

/// How a discount rule determines its amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Contributes its configured amount whenever the rule is active.
    Fixed { amount_cents: i64 },
    /// Contributes a caller-supplied override (0 if not supplied).
    Manual,
}

/// A discount rule (uniform deduction, damage chargeback, advance, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRule {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub kind: DiscountKind,
}

/// The full commission configuration for one (van, seller) pair.
///
/// ## Versioning
/// Configs are superseded, not overwritten: saving a new version
/// deactivates the previous row and inserts a fresh one, so past
/// calculations stay auditable. The data layer owns that; this type is
/// just the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionConfig {
    pub van_id: String,
    pub seller_id: String,
    /// Percentage and active flag per payment method. BTreeMap keeps
    /// iteration (and therefore results) deterministic.
    pub per_method: BTreeMap<PaymentMethod, MethodConfig>,
    pub base_salary_cents: i64,
    pub bonuses: Vec<BonusRule>,
    pub discounts: Vec<DiscountRule>,
}

impl CommissionConfig {
    /// The configuration a (van, seller) pair gets before an administrator
    /// touches anything: cash 5%, card 3%, transfer 4%, other 2%, base
    /// salary $500, no bonus or discount rules.
    pub fn default_for(van_id: impl Into<String>, seller_id: impl Into<String>) -> Self {
        let mut per_method = BTreeMap::new();
        per_method.insert(
            PaymentMethod::Cash,
            MethodConfig {
                percentage: Percentage::from_bps(500),
                active: true,
            },
        );
        per_method.insert(
            PaymentMethod::Card,
            MethodConfig {
                percentage: Percentage::from_bps(300),
                active: true,
            },
        );
        per_method.insert(
            PaymentMethod::Transfer,
            MethodConfig {
                percentage: Percentage::from_bps(400),
                active: true,
            },
        );
        per_method.insert(
            PaymentMethod::Other,
            MethodConfig {
                percentage: Percentage::from_bps(200),
                active: true,
            },
        );

        CommissionConfig {
            van_id: van_id.into(),
            seller_id: seller_id.into(),
            per_method,
            base_salary_cents: 50_000,
            bonuses: Vec::new(),
            discounts: Vec::new(),
        }
    }
}

/// Caller-supplied overrides for manual discount rules, keyed by rule id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManualAdjustments {
    pub discounts: BTreeMap<String, i64>,
}

// =============================================================================
// Result Types
// =============================================================================

/// Sales aggregate for one payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodBreakdown {
    /// Number of sales records with this method.
    pub count: u32,
    pub amount_cents: i64,
    /// This method's share of total sales, 0-100. Defined as 0 when the
    /// grand total is 0 (never an error, never NaN).
    pub share_percent: f64,
}

/// Commission earned on one payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodCommission {
    pub amount_cents: i64,
    pub percentage: Percentage,
    pub commission_cents: i64,
}

/// A bonus that fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedBonus {
    pub name: String,
    pub amount_cents: i64,
}

/// A discount that applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedDiscount {
    pub name: String,
    pub amount_cents: i64,
}

/// Category of a payout line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    Base,
    Commission,
    Bonus,
    Discount,
}

/// One row of the itemised payout statement shown to the administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub category: LineCategory,
    pub concept: String,
    /// Human-readable derivation ("$450.00 × 5%", "Condition met: 62.5").
    pub detail: String,
    /// Signed cents: discounts appear negative.
    pub amount_cents: i64,
}

/// The complete outcome of one commission calculation.
///
/// Derived and non-persistent by default: it only reaches the database on
/// an explicit save or approve, at which point `id` is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionResult {
    /// Present once persisted; `None` for a fresh calculation.
    pub id: Option<String>,
    pub seller_id: String,
    pub van_id: String,
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,

    pub breakdown: BTreeMap<PaymentMethod, MethodBreakdown>,
    pub total_sales_cents: i64,
    pub sales_count: u32,

    pub per_method: BTreeMap<PaymentMethod, MethodCommission>,
    pub commission_total_cents: i64,

    pub base_salary_cents: i64,
    pub bonuses: Vec<AppliedBonus>,
    pub total_bonuses_cents: i64,
    pub discounts: Vec<AppliedDiscount>,
    pub total_discounts_cents: i64,

    /// commission + base salary + bonuses − discounts. May be negative.
    pub total_payable_cents: i64,

    pub line_items: Vec<LineItem>,
    pub status: ApprovalStatus,
}

// =============================================================================
// Calculator
// =============================================================================

/// The commission calculator. Stateless; holds only the configuration.
#[derive(Debug, Clone)]
pub struct CommissionCalculator<'a> {
    config: &'a CommissionConfig,
}

impl<'a> CommissionCalculator<'a> {
    pub fn new(config: &'a CommissionConfig) -> Self {
        CommissionCalculator { config }
    }

    /// Runs the full pipeline over a batch of sales.
    ///
    /// Deterministic and side-effect-free: recomputation from the same
    /// inputs yields an identical result.
    pub fn calculate(
        &self,
        batch: &SalesBatch,
        adjustments: &ManualAdjustments,
    ) -> CommissionResult {
        let mut result = CommissionResult {
            id: None,
            seller_id: batch.seller_id.clone(),
            van_id: batch.van_id.clone(),
            from: batch.from,
            to: batch.to,
            breakdown: BTreeMap::new(),
            total_sales_cents: 0,
            sales_count: batch.records.len() as u32,
            per_method: BTreeMap::new(),
            commission_total_cents: 0,
            base_salary_cents: self.config.base_salary_cents,
            bonuses: Vec::new(),
            total_bonuses_cents: 0,
            discounts: Vec::new(),
            total_discounts_cents: 0,
            total_payable_cents: 0,
            line_items: Vec::new(),
            status: ApprovalStatus::Pending,
        };

        self.group_by_method(batch, &mut result);
        self.commission_per_method(&mut result);

        result.line_items.push(LineItem {
            category: LineCategory::Base,
            concept: "Guaranteed base salary".to_string(),
            detail: "Fixed".to_string(),
            amount_cents: result.base_salary_cents,
        });

        self.evaluate_bonuses(batch, &mut result);
        self.apply_discounts(adjustments, &mut result);

        result.total_payable_cents = result.commission_total_cents
            + result.base_salary_cents
            + result.total_bonuses_cents
            - result.total_discounts_cents;

        result
    }

    /// Step 1: partition records by payment method and compute shares.
    fn group_by_method(&self, batch: &SalesBatch, result: &mut CommissionResult) {
        for record in &batch.records {
            let entry = result
                .breakdown
                .entry(record.method)
                .or_insert(MethodBreakdown {
                    count: 0,
                    amount_cents: 0,
                    share_percent: 0.0,
                });
            entry.count += 1;
            entry.amount_cents += record.amount_cents;
            result.total_sales_cents += record.amount_cents;
        }

        // Share percentages in a second pass, once the grand total is known.
        // A zero grand total yields zero shares, not a division error.
        if result.total_sales_cents > 0 {
            let total = result.total_sales_cents as f64;
            for entry in result.breakdown.values_mut() {
                entry.share_percent = entry.amount_cents as f64 / total * 100.0;
            }
        }
    }

    /// Step 2: commission on each method present in both the breakdown and
    /// the config, active methods only.
    fn commission_per_method(&self, result: &mut CommissionResult) {
        for (method, data) in &result.breakdown {
            let Some(method_config) = self.config.per_method.get(method) else {
                continue;
            };
            if !method_config.active {
                continue;
            }

            let commission =
                Money::from_cents(data.amount_cents).apply_percentage(method_config.percentage);

            result.per_method.insert(
                *method,
                MethodCommission {
                    amount_cents: data.amount_cents,
                    percentage: method_config.percentage,
                    commission_cents: commission.cents(),
                },
            );
            result.commission_total_cents += commission.cents();

            result.line_items.push(LineItem {
                category: LineCategory::Commission,
                concept: format!("Commission {method}"),
                detail: format!(
                    "{} × {}%",
                    Money::from_cents(data.amount_cents),
                    method_config.percentage.percent()
                ),
                amount_cents: commission.cents(),
            });
        }
    }

    /// Step 3: bonus rules against the batch's aggregates.
    fn evaluate_bonuses(&self, batch: &SalesBatch, result: &mut CommissionResult) {
        for bonus in &self.config.bonuses {
            if !bonus.active {
                continue;
            }

            let (met, observed) = match &bonus.condition {
                BonusCondition::SalesTarget { threshold_cents } => (
                    result.total_sales_cents >= *threshold_cents,
                    result.total_sales_cents as f64 / 100.0,
                ),
                BonusCondition::CashShare { threshold_bps } => {
                    let cash_cents = result
                        .breakdown
                        .get(&PaymentMethod::Cash)
                        .map(|b| b.amount_cents)
                        .unwrap_or(0);
                    if result.total_sales_cents > 0 {
                        let share_bps =
                            cash_cents as i128 * 10_000 / result.total_sales_cents as i128;
                        (
                            share_bps >= *threshold_bps as i128,
                            share_bps as f64 / 100.0,
                        )
                    } else {
                        // No sales at all: a share threshold cannot be met.
                        (false, 0.0)
                    }
                }
                BonusCondition::NewCustomers { threshold } => (
                    batch.new_customers >= *threshold,
                    batch.new_customers as f64,
                ),
            };

            if met {
                result.bonuses.push(AppliedBonus {
                    name: bonus.name.clone(),
                    amount_cents: bonus.amount_cents,
                });
                result.total_bonuses_cents += bonus.amount_cents;

                result.line_items.push(LineItem {
                    category: LineCategory::Bonus,
                    concept: bonus.name.clone(),
                    detail: format!("Condition met: {observed:.1}"),
                    amount_cents: bonus.amount_cents,
                });
            }
        }
    }

    /// Step 4: discount rules, fixed or manually overridden.
    fn apply_discounts(&self, adjustments: &ManualAdjustments, result: &mut CommissionResult) {
        for discount in &self.config.discounts {
            if !discount.active {
                continue;
            }

            let amount_cents = match &discount.kind {
                DiscountKind::Fixed { amount_cents } => *amount_cents,
                DiscountKind::Manual => {
                    adjustments.discounts.get(&discount.id).copied().unwrap_or(0)
                }
            };

            if amount_cents > 0 {
                result.discounts.push(AppliedDiscount {
                    name: discount.name.clone(),
                    amount_cents,
                });
                result.total_discounts_cents += amount_cents;

                result.line_items.push(LineItem {
                    category: LineCategory::Discount,
                    concept: discount.name.clone(),
                    detail: match discount.kind {
                        DiscountKind::Fixed { .. } => "Fixed".to_string(),
                        DiscountKind::Manual => "Manual".to_string(),
                    },
                    amount_cents: -amount_cents,
                });
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SalesRecord;
    use chrono::{TimeZone, Utc};

    fn record(method: PaymentMethod, cents: i64) -> SalesRecord {
        SalesRecord {
            id: format!("s-{method}-{cents}"),
            method,
            amount_cents: cents,
            sold_at: Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap(),
            seller_id: "seller-1".to_string(),
            van_id: "van-1".to_string(),
        }
    }

    fn batch(records: Vec<SalesRecord>) -> SalesBatch {
        SalesBatch {
            seller_id: "seller-1".to_string(),
            van_id: "van-1".to_string(),
            from: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            records,
            new_customers: 0,
        }
    }

    fn default_config() -> CommissionConfig {
        CommissionConfig::default_for("van-1", "seller-1")
    }

    #[test]
    fn test_grouping_additivity() {
        let config = default_config();
        let calc = CommissionCalculator::new(&config);

        let result = calc.calculate(
            &batch(vec![
                record(PaymentMethod::Cash, 30_000),
                record(PaymentMethod::Cash, 20_000),
                record(PaymentMethod::Card, 25_000),
                record(PaymentMethod::Transfer, 25_000),
            ]),
            &ManualAdjustments::default(),
        );

        // Σ methodTotal == grandTotal
        let sum: i64 = result.breakdown.values().map(|b| b.amount_cents).sum();
        assert_eq!(sum, result.total_sales_cents);
        assert_eq!(result.total_sales_cents, 100_000);

        // Σ sharePercent == 100 when grandTotal > 0
        let share_sum: f64 = result.breakdown.values().map(|b| b.share_percent).sum();
        assert!((share_sum - 100.0).abs() < 1e-9);

        // Counts
        assert_eq!(result.breakdown[&PaymentMethod::Cash].count, 2);
        assert_eq!(result.sales_count, 4);
    }

    #[test]
    fn test_zero_sales_zero_shares() {
        let config = default_config();
        let calc = CommissionCalculator::new(&config);

        let result = calc.calculate(&batch(vec![]), &ManualAdjustments::default());

        assert_eq!(result.total_sales_cents, 0);
        assert!(result.breakdown.is_empty());
        assert_eq!(result.commission_total_cents, 0);
        // Base salary still paid
        assert_eq!(result.total_payable_cents, 50_000);
    }

    #[test]
    fn test_zero_total_with_zero_amount_records() {
        let config = default_config();
        let calc = CommissionCalculator::new(&config);

        let result = calc.calculate(
            &batch(vec![record(PaymentMethod::Cash, 0)]),
            &ManualAdjustments::default(),
        );

        // Method present, share defined as 0, no division error
        assert_eq!(result.breakdown[&PaymentMethod::Cash].share_percent, 0.0);
    }

    #[test]
    fn test_per_method_commission() {
        let config = default_config();
        let calc = CommissionCalculator::new(&config);

        let result = calc.calculate(
            &batch(vec![
                record(PaymentMethod::Cash, 45_000),  // 5% = 2250
                record(PaymentMethod::Card, 20_000),  // 3% = 600
            ]),
            &ManualAdjustments::default(),
        );

        assert_eq!(
            result.per_method[&PaymentMethod::Cash].commission_cents,
            2250
        );
        assert_eq!(result.per_method[&PaymentMethod::Card].commission_cents, 600);
        assert_eq!(result.commission_total_cents, 2850);
    }

    #[test]
    fn test_inactive_method_earns_nothing_but_counts_in_total() {
        let mut config = default_config();
        config
            .per_method
            .get_mut(&PaymentMethod::Card)
            .unwrap()
            .active = false;
        let calc = CommissionCalculator::new(&config);

        let result = calc.calculate(
            &batch(vec![
                record(PaymentMethod::Cash, 50_000),
                record(PaymentMethod::Card, 50_000),
            ]),
            &ManualAdjustments::default(),
        );

        assert!(!result.per_method.contains_key(&PaymentMethod::Card));
        assert_eq!(result.total_sales_cents, 100_000);
        // Card still holds half the share
        assert!((result.breakdown[&PaymentMethod::Card].share_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_bonus_sales_target() {
        let mut config = default_config();
        config.bonuses.push(BonusRule {
            id: "b1".to_string(),
            name: "Daily target".to_string(),
            amount_cents: 2_000,
            active: true,
            condition: BonusCondition::SalesTarget {
                threshold_cents: 80_000,
            },
        });
        let calc = CommissionCalculator::new(&config);

        let hit = calc.calculate(
            &batch(vec![record(PaymentMethod::Cash, 90_000)]),
            &ManualAdjustments::default(),
        );
        assert_eq!(hit.total_bonuses_cents, 2_000);

        let miss = calc.calculate(
            &batch(vec![record(PaymentMethod::Cash, 70_000)]),
            &ManualAdjustments::default(),
        );
        assert_eq!(miss.total_bonuses_cents, 0);
    }

    #[test]
    fn test_bonus_cash_share() {
        let mut config = default_config();
        config.bonuses.push(BonusRule {
            id: "b2".to_string(),
            name: "Cash collector".to_string(),
            amount_cents: 1_500,
            active: true,
            condition: BonusCondition::CashShare {
                threshold_bps: 6_000, // 60%
            },
        });
        let calc = CommissionCalculator::new(&config);

        let hit = calc.calculate(
            &batch(vec![
                record(PaymentMethod::Cash, 70_000),
                record(PaymentMethod::Card, 30_000),
            ]),
            &ManualAdjustments::default(),
        );
        assert_eq!(hit.total_bonuses_cents, 1_500);

        let miss = calc.calculate(
            &batch(vec![
                record(PaymentMethod::Cash, 50_000),
                record(PaymentMethod::Card, 50_000),
            ]),
            &ManualAdjustments::default(),
        );
        assert_eq!(miss.total_bonuses_cents, 0);

        // No sales at all: share threshold cannot fire
        let empty = calc.calculate(&batch(vec![]), &ManualAdjustments::default());
        assert_eq!(empty.total_bonuses_cents, 0);
    }

    #[test]
    fn test_bonus_new_customers() {
        let mut config = default_config();
        config.bonuses.push(BonusRule {
            id: "b3".to_string(),
            name: "Door knocker".to_string(),
            amount_cents: 1_000,
            active: true,
            condition: BonusCondition::NewCustomers { threshold: 3 },
        });
        let calc = CommissionCalculator::new(&config);

        let mut b = batch(vec![record(PaymentMethod::Cash, 10_000)]);
        b.new_customers = 3;
        assert_eq!(
            calc.calculate(&b, &ManualAdjustments::default())
                .total_bonuses_cents,
            1_000
        );

        b.new_customers = 2;
        assert_eq!(
            calc.calculate(&b, &ManualAdjustments::default())
                .total_bonuses_cents,
            0
        );
    }

    #[test]
    fn test_discounts_fixed_and_manual() {
        let mut config = default_config();
        config.discounts.push(DiscountRule {
            id: "d1".to_string(),
            name: "Uniform".to_string(),
            active: true,
            kind: DiscountKind::Fixed { amount_cents: 500 },
        });
        config.discounts.push(DiscountRule {
            id: "d2".to_string(),
            name: "Advance".to_string(),
            active: true,
            kind: DiscountKind::Manual,
        });
        let calc = CommissionCalculator::new(&config);

        // Manual default is 0: only the fixed discount applies
        let base = calc.calculate(
            &batch(vec![record(PaymentMethod::Cash, 10_000)]),
            &ManualAdjustments::default(),
        );
        assert_eq!(base.total_discounts_cents, 500);

        // Supply an override for the manual rule
        let mut adjustments = ManualAdjustments::default();
        adjustments.discounts.insert("d2".to_string(), 2_500);
        let with_advance = calc.calculate(
            &batch(vec![record(PaymentMethod::Cash, 10_000)]),
            &adjustments,
        );
        assert_eq!(with_advance.total_discounts_cents, 3_000);

        // Discount line items carry a negative sign
        let discount_line = with_advance
            .line_items
            .iter()
            .find(|l| l.concept == "Advance")
            .unwrap();
        assert_eq!(discount_line.amount_cents, -2_500);
    }

    #[test]
    fn test_payable_formula_including_negative() {
        let mut config = default_config();
        config.base_salary_cents = 1_000;
        config.discounts.push(DiscountRule {
            id: "d1".to_string(),
            name: "Big chargeback".to_string(),
            active: true,
            kind: DiscountKind::Fixed {
                amount_cents: 10_000,
            },
        });
        let calc = CommissionCalculator::new(&config);

        let result = calc.calculate(
            &batch(vec![record(PaymentMethod::Cash, 10_000)]), // 5% = 500
            &ManualAdjustments::default(),
        );

        assert_eq!(
            result.total_payable_cents,
            result.commission_total_cents + result.base_salary_cents
                + result.total_bonuses_cents
                - result.total_discounts_cents
        );
        // 500 + 1000 + 0 − 10000 = −8500, not clamped
        assert_eq!(result.total_payable_cents, -8_500);
    }

    #[test]
    fn test_determinism() {
        let mut config = default_config();
        config.bonuses.push(BonusRule {
            id: "b1".to_string(),
            name: "Daily target".to_string(),
            amount_cents: 2_000,
            active: true,
            condition: BonusCondition::SalesTarget {
                threshold_cents: 10_000,
            },
        });
        let calc = CommissionCalculator::new(&config);

        let b = batch(vec![
            record(PaymentMethod::Cash, 33_333),
            record(PaymentMethod::Transfer, 11_111),
            record(PaymentMethod::Other, 7),
        ]);

        let first = calc.calculate(&b, &ManualAdjustments::default());
        let second = calc.calculate(&b, &ManualAdjustments::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_method_absent_from_config_is_skipped() {
        let mut config = default_config();
        config.per_method.remove(&PaymentMethod::Other);
        let calc = CommissionCalculator::new(&config);

        let result = calc.calculate(
            &batch(vec![record(PaymentMethod::Other, 40_000)]),
            &ManualAdjustments::default(),
        );

        assert!(result.per_method.is_empty());
        assert_eq!(result.commission_total_cents, 0);
        assert_eq!(result.total_sales_cents, 40_000);
    }
}
