//! # Credit Rules Engine
//!
//! Decides whether a customer can take credit, how much they must pay up
//! front, and what risk tier drives the UI (green / yellow / red / frozen).
//!
//! ## The Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Visit cycle: 18 days | installments weekly                             │
//! │                                                                         │
//! │  R1: minimum payment = 50% of the new sale                              │
//! │  R2: old debt (> 10 days) → pay 40% of it before buying                 │
//! │  R3: each broken agreement lowers the limit 25% (capped at 75%)         │
//! │  R4: 2+ broken agreements → credit frozen, cash only                    │
//! │  R5: more than 1 overdue installment → seller override required         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The evaluator is pure: all ledger-derived inputs (balance, agreement
//! summary, age of the oldest debt) arrive in [`CreditRequest`], and the
//! reference date for plan generation is a parameter, so the same inputs
//! always produce the same decision.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Percentage;

// =============================================================================
// Policy
// =============================================================================

/// Tunable thresholds of the credit rules. Defaults match the business's
/// 18-day route cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditPolicy {
    /// Maximum total term for a payment plan.
    pub max_term_days: i64,
    /// Default spacing between installments.
    pub installment_interval_days: i64,
    /// Hard cap on installments per agreement.
    pub max_installments: u32,

    /// R1: share of a new sale that must be paid at the time of sale.
    pub min_sale_payment: Percentage,

    /// R2: debt older than this many days triggers the old-debt minimum.
    pub old_debt_trigger_days: i64,
    /// R2: share of old debt that must be paid before new credit.
    pub min_old_debt_payment: Percentage,

    /// R3: limit penalty per broken agreement.
    pub broken_agreement_penalty: Percentage,
    /// R3: penalty ceiling.
    pub max_penalty: Percentage,

    /// R4: broken agreements at which credit freezes entirely.
    pub freeze_at_broken: u32,

    /// R5: overdue installments tolerated before requiring an override.
    pub max_overdue_installments: u32,

    /// Comparison tolerance in cents.
    pub tolerance_cents: i64,
    /// Days after the due date before an installment counts as overdue.
    pub grace_days: i64,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        CreditPolicy {
            max_term_days: 18,
            installment_interval_days: 7,
            max_installments: 8,
            min_sale_payment: Percentage::from_bps(5_000),
            old_debt_trigger_days: 10,
            min_old_debt_payment: Percentage::from_bps(4_000),
            broken_agreement_penalty: Percentage::from_bps(2_500),
            max_penalty: Percentage::from_bps(7_500),
            freeze_at_broken: 2,
            max_overdue_installments: 1,
            tolerance_cents: 1,
            grace_days: 2,
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Aggregate view of a customer's payment agreements, produced by the
/// agreement repository and consumed read-only here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgreementSummary {
    pub total_agreements: u32,
    pub active_agreements: u32,
    pub broken_agreements: u32,
    pub completed_agreements: u32,
    pub debt_in_agreements_cents: i64,
    pub overdue_installments: u32,
    pub max_days_late: i64,
    #[ts(as = "Option<String>")]
    pub next_due_date: Option<NaiveDate>,
    pub next_due_amount_cents: Option<i64>,
}

/// Everything the evaluator needs to know about one credit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditRequest {
    /// Total of the sale being rung up.
    pub sale_cents: i64,
    /// Customer's current outstanding balance.
    pub balance_cents: i64,
    /// Credit limit before penalties.
    pub base_limit_cents: i64,
    /// Days since the oldest unpaid debt.
    pub oldest_debt_days: i64,
    /// What the customer is paying on this visit.
    pub paying_now_cents: i64,
    /// Agreement history, when any exists.
    pub summary: Option<AgreementSummary>,
}

// =============================================================================
// Decision
// =============================================================================

/// Qualitative risk tier driving the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Green,
    Yellow,
    Red,
    Frozen,
}

/// The evaluator's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditDecision {
    /// Whether a credit sale may proceed at all.
    pub allowed: bool,
    pub tier: RiskTier,

    /// Minimum to pay on this sale (R1).
    pub min_sale_payment_cents: i64,
    /// Minimum to pay on old debt (R2), 0 when not triggered.
    pub min_old_debt_payment_cents: i64,
    /// Sum of both minimums.
    pub min_total_payment_cents: i64,

    /// Limit after broken-agreement penalties.
    pub effective_limit_cents: i64,
    /// Credit actually available after the balance.
    pub available_cents: i64,
    /// Penalty applied to the base limit.
    pub penalty: Percentage,

    /// Rules that fired, for the seller's screen.
    pub rules: Vec<String>,
    /// Warnings for the seller.
    pub warnings: Vec<String>,

    /// The seller can override with a recorded exception.
    pub requires_override: bool,
    /// Why credit is blocked outright, when it is.
    pub block_reason: Option<String>,

    /// Suggested installment plan for the unpaid remainder.
    pub suggested_plan: Option<PaymentPlan>,
}

// =============================================================================
// Evaluator
// =============================================================================

/// Evaluates the credit rules for one request.
///
/// `today` anchors the suggested payment plan's due dates.
pub fn evaluate_credit(
    request: &CreditRequest,
    policy: &CreditPolicy,
    today: NaiveDate,
) -> CreditDecision {
    let mut rules = Vec::new();
    let mut warnings = Vec::new();
    let mut requires_override = false;

    let summary = request.summary.clone().unwrap_or_default();
    let broken = summary.broken_agreements;
    let active = summary.active_agreements;
    let overdue = summary.overdue_installments;

    let sale = Money::from_cents(request.sale_cents);
    let balance = Money::from_cents(request.balance_cents);
    let paying_now = Money::from_cents(request.paying_now_cents);
    let tolerance = Money::from_cents(policy.tolerance_cents);

    // R4: freeze. Short-circuits everything else: cash only until the
    // whole debt is cleared.
    if broken >= policy.freeze_at_broken {
        rules.push(format!("R4: credit frozen ({broken} broken agreements)"));
        return CreditDecision {
            allowed: false,
            tier: RiskTier::Frozen,
            min_sale_payment_cents: sale.cents(),
            min_old_debt_payment_cents: balance.cents(),
            min_total_payment_cents: (sale + balance).cents(),
            effective_limit_cents: 0,
            available_cents: 0,
            penalty: Percentage::from_bps(10_000),
            rules,
            warnings: vec![
                "CREDIT FROZEN — cash sales only until all outstanding debt is paid".to_string(),
            ],
            requires_override: true,
            block_reason: Some(format!(
                "{broken} broken payment agreements; customer must pay all outstanding debt before new credit"
            )),
            suggested_plan: None,
        };
    }

    // R3: limit penalty per broken agreement, capped.
    let penalty = Percentage::from_bps(
        (broken * policy.broken_agreement_penalty.bps()).min(policy.max_penalty.bps()),
    );
    if broken > 0 {
        rules.push(format!(
            "R3: limit reduced {}% for {broken} broken agreement(s)",
            penalty.percent()
        ));
        warnings.push(format!(
            "Limit reduced {}% due to {broken} broken agreement(s)",
            penalty.percent()
        ));
    }

    let base_limit = Money::from_cents(request.base_limit_cents);
    let effective_limit =
        (base_limit - base_limit.apply_percentage(penalty)).clamp_non_negative();
    let available = (effective_limit - balance).clamp_non_negative();

    // R5: overdue installments beyond tolerance need an override.
    if overdue > policy.max_overdue_installments {
        requires_override = true;
        rules.push(format!(
            "R5: {overdue} overdue installments (max allowed: {})",
            policy.max_overdue_installments
        ));
        warnings.push(format!(
            "{overdue} overdue installment(s); customer should pay before taking more credit"
        ));
    }

    // R1: minimum payment on the new sale.
    let min_sale_payment = sale.apply_percentage(policy.min_sale_payment);
    rules.push(format!(
        "R1: minimum payment on sale = {}% of {sale} = {min_sale_payment}",
        policy.min_sale_payment.percent()
    ));

    // R2: minimum payment on old debt.
    let mut min_old_debt_payment = Money::zero();
    if balance > tolerance && request.oldest_debt_days > policy.old_debt_trigger_days {
        min_old_debt_payment = balance.apply_percentage(policy.min_old_debt_payment);
        rules.push(format!(
            "R2: debt {balance} is {} days old (> {}); minimum {}% = {min_old_debt_payment}",
            request.oldest_debt_days,
            policy.old_debt_trigger_days,
            policy.min_old_debt_payment.percent()
        ));
        warnings.push(format!(
            "Old debt ({} days): must pay at least {min_old_debt_payment} of {balance} before new credit",
            request.oldest_debt_days
        ));
    }

    // R2+: an overdue installment's amount floors the old-debt minimum.
    if overdue > 0 {
        if let Some(next_due) = summary.next_due_amount_cents.map(Money::from_cents) {
            if next_due > min_old_debt_payment {
                min_old_debt_payment = next_due;
                rules.push(format!(
                    "R2+: overdue installment {next_due} exceeds the percentage minimum; using it"
                ));
            }
        }
    }

    let min_total_payment = min_sale_payment + min_old_debt_payment;

    // Enough credit available for the unpaid part of the sale?
    let credit_needed = (sale - paying_now).clamp_non_negative();
    if credit_needed > available + tolerance {
        requires_override = true;
        warnings.push(format!(
            "Needs {credit_needed} credit but only {available} available (limit: {effective_limit})"
        ));
    }

    // Is the customer paying the combined minimum?
    if paying_now < min_total_payment - tolerance {
        let short = min_total_payment - paying_now;
        requires_override = true;
        warnings.push(format!(
            "Minimum payment {min_total_payment} (paying {paying_now}, short {short})"
        ));
    }

    let tier = if requires_override {
        if overdue > 1 || broken > 0 {
            RiskTier::Red
        } else {
            RiskTier::Yellow
        }
    } else if balance.is_positive() || active > 0 {
        RiskTier::Yellow
    } else {
        RiskTier::Green
    };

    let suggested_plan = if credit_needed > tolerance {
        Some(generate_payment_plan(
            credit_needed.cents(),
            today,
            None,
            policy,
        ))
    } else {
        None
    };

    CreditDecision {
        allowed: true,
        tier,
        min_sale_payment_cents: min_sale_payment.cents(),
        min_old_debt_payment_cents: min_old_debt_payment.cents(),
        min_total_payment_cents: min_total_payment.cents(),
        effective_limit_cents: effective_limit.cents(),
        available_cents: available.cents(),
        penalty,
        rules,
        warnings,
        requires_override,
        block_reason: None,
        suggested_plan,
    }
}

// =============================================================================
// Payment Plan
// =============================================================================

/// One scheduled installment of a suggested plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlannedInstallment {
    /// 1-based position.
    pub sequence: u32,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub days_from_start: i64,
}

/// A full installment plan for a credit balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentPlan {
    pub total_cents: i64,
    pub num_installments: u32,
    pub term_days: i64,
    #[ts(as = "String")]
    pub deadline: NaiveDate,
    pub installments: Vec<PlannedInstallment>,
}

/// Splits `total_cents` across installments due within the route cycle.
///
/// ## Sizing
/// When `num_installments` is not given, the count scales with the amount:
/// up to $30 → 1, $80 → 2, $200 → 3, $400 → 4, above → 5; always clamped
/// to `1..=max_installments`. Due dates spread proportionally across the
/// term (at least `max_term_days`, or count × interval if longer). The
/// last installment absorbs the remainder cent so the plan sums exactly.
pub fn generate_payment_plan(
    total_cents: i64,
    today: NaiveDate,
    num_installments: Option<u32>,
    policy: &CreditPolicy,
) -> PaymentPlan {
    let count = num_installments.unwrap_or(match total_cents {
        c if c <= 3_000 => 1,
        c if c <= 8_000 => 2,
        c if c <= 20_000 => 3,
        c if c <= 40_000 => 4,
        _ => 5,
    });
    let count = count.clamp(1, policy.max_installments);

    let term_days = policy
        .max_term_days
        .max(count as i64 * policy.installment_interval_days);

    let per_installment = total_cents / count as i64;
    let mut installments = Vec::with_capacity(count as usize);

    for i in 0..count {
        let is_last = i == count - 1;
        let amount_cents = if is_last {
            total_cents - per_installment * (count as i64 - 1)
        } else {
            per_installment
        };

        // Due dates spread proportionally: (i+1)/count of the term.
        let days_from_start =
            ((i as i64 + 1) * term_days + count as i64 / 2) / count as i64;

        installments.push(PlannedInstallment {
            sequence: i + 1,
            amount_cents,
            due_date: today + Duration::days(days_from_start),
            days_from_start,
        });
    }

    PaymentPlan {
        total_cents,
        num_installments: count,
        term_days,
        deadline: today + Duration::days(term_days),
        installments,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn clean_request(sale_cents: i64, paying_now_cents: i64) -> CreditRequest {
        CreditRequest {
            sale_cents,
            balance_cents: 0,
            base_limit_cents: 100_000,
            oldest_debt_days: 0,
            paying_now_cents,
            summary: None,
        }
    }

    #[test]
    fn test_clean_customer_green() {
        // $100 sale, paying the 50% minimum, no history
        let decision = evaluate_credit(&clean_request(10_000, 5_000), &CreditPolicy::default(), today());

        assert!(decision.allowed);
        assert_eq!(decision.tier, RiskTier::Green);
        assert!(!decision.requires_override);
        assert_eq!(decision.min_sale_payment_cents, 5_000);
        assert_eq!(decision.min_old_debt_payment_cents, 0);
        assert_eq!(decision.effective_limit_cents, 100_000);
    }

    #[test]
    fn test_underpaying_minimum_requires_override() {
        let decision = evaluate_credit(&clean_request(10_000, 3_000), &CreditPolicy::default(), today());

        assert!(decision.allowed);
        assert!(decision.requires_override);
        assert_eq!(decision.tier, RiskTier::Yellow);
    }

    #[test]
    fn test_old_debt_minimum() {
        let request = CreditRequest {
            sale_cents: 10_000,
            balance_cents: 20_000,
            base_limit_cents: 100_000,
            oldest_debt_days: 15, // > 10-day trigger
            paying_now_cents: 13_000,
            summary: None,
        };
        let decision = evaluate_credit(&request, &CreditPolicy::default(), today());

        // 50% of sale + 40% of old debt
        assert_eq!(decision.min_sale_payment_cents, 5_000);
        assert_eq!(decision.min_old_debt_payment_cents, 8_000);
        assert_eq!(decision.min_total_payment_cents, 13_000);
        assert!(!decision.requires_override);
        // Balance outstanding keeps the tier at yellow
        assert_eq!(decision.tier, RiskTier::Yellow);
    }

    #[test]
    fn test_fresh_debt_has_no_old_debt_minimum() {
        let request = CreditRequest {
            sale_cents: 10_000,
            balance_cents: 20_000,
            base_limit_cents: 100_000,
            oldest_debt_days: 5, // under the trigger
            paying_now_cents: 5_000,
            summary: None,
        };
        let decision = evaluate_credit(&request, &CreditPolicy::default(), today());
        assert_eq!(decision.min_old_debt_payment_cents, 0);
    }

    #[test]
    fn test_broken_agreement_penalty() {
        let request = CreditRequest {
            sale_cents: 10_000,
            balance_cents: 0,
            base_limit_cents: 100_000,
            oldest_debt_days: 0,
            paying_now_cents: 5_000,
            summary: Some(AgreementSummary {
                broken_agreements: 1,
                ..AgreementSummary::default()
            }),
        };
        let decision = evaluate_credit(&request, &CreditPolicy::default(), today());

        assert_eq!(decision.penalty.bps(), 2_500);
        assert_eq!(decision.effective_limit_cents, 75_000);
        assert!(decision.allowed);
    }

    #[test]
    fn test_freeze_at_two_broken() {
        let request = CreditRequest {
            sale_cents: 10_000,
            balance_cents: 30_000,
            base_limit_cents: 100_000,
            oldest_debt_days: 20,
            paying_now_cents: 0,
            summary: Some(AgreementSummary {
                broken_agreements: 2,
                ..AgreementSummary::default()
            }),
        };
        let decision = evaluate_credit(&request, &CreditPolicy::default(), today());

        assert!(!decision.allowed);
        assert_eq!(decision.tier, RiskTier::Frozen);
        assert!(decision.block_reason.is_some());
        // Must pay everything: the whole sale plus the whole balance
        assert_eq!(decision.min_total_payment_cents, 40_000);
        assert_eq!(decision.available_cents, 0);
        assert!(decision.suggested_plan.is_none());
    }

    #[test]
    fn test_overdue_installment_floors_old_debt_minimum() {
        let request = CreditRequest {
            sale_cents: 10_000,
            balance_cents: 20_000,
            base_limit_cents: 100_000,
            oldest_debt_days: 15,
            paying_now_cents: 0,
            summary: Some(AgreementSummary {
                active_agreements: 1,
                overdue_installments: 1,
                next_due_amount_cents: Some(9_000), // above the 40% = 8000
                ..AgreementSummary::default()
            }),
        };
        let decision = evaluate_credit(&request, &CreditPolicy::default(), today());
        assert_eq!(decision.min_old_debt_payment_cents, 9_000);
    }

    #[test]
    fn test_exceeding_available_credit_requires_override() {
        let request = CreditRequest {
            sale_cents: 50_000,
            balance_cents: 90_000,
            base_limit_cents: 100_000,
            oldest_debt_days: 0,
            paying_now_cents: 25_000,
            summary: None,
        };
        let decision = evaluate_credit(&request, &CreditPolicy::default(), today());

        // needs 25_000, only 10_000 available
        assert_eq!(decision.available_cents, 10_000);
        assert!(decision.requires_override);
    }

    #[test]
    fn test_red_tier_with_broken_history_and_override() {
        let request = CreditRequest {
            sale_cents: 10_000,
            balance_cents: 0,
            base_limit_cents: 100_000,
            oldest_debt_days: 0,
            paying_now_cents: 0, // under the minimum → override
            summary: Some(AgreementSummary {
                broken_agreements: 1,
                ..AgreementSummary::default()
            }),
        };
        let decision = evaluate_credit(&request, &CreditPolicy::default(), today());
        assert_eq!(decision.tier, RiskTier::Red);
    }

    #[test]
    fn test_plan_auto_sizing() {
        let policy = CreditPolicy::default();

        assert_eq!(generate_payment_plan(2_500, today(), None, &policy).num_installments, 1);
        assert_eq!(generate_payment_plan(7_000, today(), None, &policy).num_installments, 2);
        assert_eq!(generate_payment_plan(15_000, today(), None, &policy).num_installments, 3);
        assert_eq!(generate_payment_plan(30_000, today(), None, &policy).num_installments, 4);
        assert_eq!(generate_payment_plan(90_000, today(), None, &policy).num_installments, 5);

        // Explicit count is clamped to the cap
        assert_eq!(
            generate_payment_plan(90_000, today(), Some(20), &policy).num_installments,
            8
        );
    }

    #[test]
    fn test_plan_sums_exactly() {
        let policy = CreditPolicy::default();
        let plan = generate_payment_plan(10_000, today(), Some(3), &policy);

        let sum: i64 = plan.installments.iter().map(|c| c.amount_cents).sum();
        assert_eq!(sum, 10_000);
        // 3333 / 3333 / 3334 — the last installment takes the remainder
        assert_eq!(plan.installments[0].amount_cents, 3_333);
        assert_eq!(plan.installments[2].amount_cents, 3_334);
    }

    #[test]
    fn test_plan_dates_within_term() {
        let policy = CreditPolicy::default();
        let plan = generate_payment_plan(10_000, today(), Some(3), &policy);

        assert_eq!(plan.term_days, 21); // 3 × 7 > 18
        assert_eq!(plan.deadline, today() + Duration::days(21));
        assert!(plan
            .installments
            .iter()
            .all(|c| c.due_date <= plan.deadline));
        // Strictly increasing due dates
        assert!(plan
            .installments
            .windows(2)
            .all(|w| w[0].due_date < w[1].due_date));
    }

    #[test]
    fn test_suggested_plan_for_unpaid_remainder() {
        let decision = evaluate_credit(&clean_request(10_000, 5_000), &CreditPolicy::default(), today());
        let plan = decision.suggested_plan.expect("remainder should get a plan");
        assert_eq!(plan.total_cents, 5_000);
    }
}
