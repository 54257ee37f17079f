//! # Installment FIFO Coverage
//!
//! Given the outstanding installments of a customer (sorted by due date
//! ascending) and an amount the customer is about to pay, classify how the
//! payment would be absorbed, earliest-due first.
//!
//! ## Display Only
//! This is a read-time visualization for the payment screen: nothing here
//! mutates installment state. Actual settlement (mutating `paid_cents`) is
//! the agreement repository's `apply_payment`.
//!
//! ## The Math
//! ```text
//! For the installment at ordinal i:
//!   covered_before = Σ pending[0..i]
//!   remaining      = max(0, payment − covered_before)
//!
//!   Full     if remaining ≥ pending
//!   Partial  if 0 < remaining < pending
//!   None     otherwise
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Installment;

// =============================================================================
// Coverage Types
// =============================================================================

/// How much of one installment a hypothetical payment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// The payment fully settles this installment.
    Full,
    /// The payment covers part of it.
    Partial,
    /// Nothing left for this installment.
    None,
}

/// Per-installment coverage line for the payment preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CoverageLine {
    pub installment_id: String,
    /// Amount still owed on the installment.
    pub pending_cents: i64,
    /// Pending sum of all earlier installments.
    pub covered_before_cents: i64,
    /// What this payment would put toward the installment.
    pub applied_cents: i64,
    pub coverage: Coverage,
}

// =============================================================================
// Coverage Computation
// =============================================================================

/// Classifies how `payment` is absorbed by `installments`, earliest-due
/// first.
///
/// The caller supplies installments already sorted by due date ascending
/// (the repository query orders them); this function preserves that order.
///
/// ## Example
/// ```rust
/// use ruta_core::installment::{payment_coverage, Coverage};
/// # use ruta_core::types::{Installment, InstallmentStatus};
/// # use chrono::NaiveDate;
/// # fn cuota(id: &str, due: u32, amount: i64) -> Installment {
/// #     Installment {
/// #         id: id.into(), agreement_id: "a".into(), sequence: due as i64,
/// #         amount_cents: amount, paid_cents: 0,
/// #         due_date: NaiveDate::from_ymd_opt(2025, 3, due).unwrap(),
/// #         paid_at: None, status: InstallmentStatus::Pending, days_late: 0,
/// #     }
/// # }
/// let cuotas = vec![cuota("a", 1, 10_000), cuota("b", 8, 5_000), cuota("c", 15, 3_000)];
/// let lines = payment_coverage(&cuotas, 12_000);
///
/// assert_eq!(lines[0].coverage, Coverage::Full);
/// assert_eq!(lines[1].coverage, Coverage::Partial);
/// assert_eq!(lines[2].coverage, Coverage::None);
/// ```
pub fn payment_coverage(installments: &[Installment], payment_cents: i64) -> Vec<CoverageLine> {
    let payment = Money::from_cents(payment_cents);
    let mut covered_before = Money::zero();

    installments
        .iter()
        .map(|cuota| {
            let pending = cuota.pending();
            let remaining = (payment - covered_before).clamp_non_negative();

            let coverage = if remaining >= pending {
                Coverage::Full
            } else if remaining.is_positive() {
                Coverage::Partial
            } else {
                Coverage::None
            };

            let line = CoverageLine {
                installment_id: cuota.id.clone(),
                pending_cents: pending.cents(),
                covered_before_cents: covered_before.cents(),
                applied_cents: remaining.min(pending).cents(),
                coverage,
            };

            covered_before += pending;
            line
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InstallmentStatus;
    use chrono::NaiveDate;

    fn cuota(id: &str, day: u32, amount_cents: i64, paid_cents: i64) -> Installment {
        Installment {
            id: id.to_string(),
            agreement_id: "a-1".to_string(),
            sequence: day as i64,
            amount_cents,
            paid_cents,
            due_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            paid_at: None,
            status: if paid_cents > 0 {
                InstallmentStatus::Partial
            } else {
                InstallmentStatus::Pending
            },
            days_late: 0,
        }
    }

    /// The worked example: pending 100/50/30, payment 120
    /// ⇒ full / partial (20 of 50) / none.
    #[test]
    fn test_coverage_worked_example() {
        let cuotas = vec![
            cuota("c1", 1, 10_000, 0),
            cuota("c2", 8, 5_000, 0),
            cuota("c3", 15, 3_000, 0),
        ];

        let lines = payment_coverage(&cuotas, 12_000);

        assert_eq!(lines[0].coverage, Coverage::Full);
        assert_eq!(lines[0].covered_before_cents, 0);
        assert_eq!(lines[0].applied_cents, 10_000);

        assert_eq!(lines[1].coverage, Coverage::Partial);
        assert_eq!(lines[1].covered_before_cents, 10_000);
        assert_eq!(lines[1].applied_cents, 2_000);

        assert_eq!(lines[2].coverage, Coverage::None);
        assert_eq!(lines[2].covered_before_cents, 15_000);
        assert_eq!(lines[2].applied_cents, 0);
    }

    #[test]
    fn test_coverage_uses_pending_not_full_amount() {
        // c1 has 60 pending of its 100 (already paid 40)
        let cuotas = vec![cuota("c1", 1, 10_000, 4_000), cuota("c2", 8, 5_000, 0)];

        let lines = payment_coverage(&cuotas, 6_000);

        assert_eq!(lines[0].pending_cents, 6_000);
        assert_eq!(lines[0].coverage, Coverage::Full);
        // Everything went to c1; nothing for c2
        assert_eq!(lines[1].coverage, Coverage::None);
    }

    #[test]
    fn test_exact_payment_is_full() {
        let cuotas = vec![cuota("c1", 1, 10_000, 0)];
        let lines = payment_coverage(&cuotas, 10_000);
        assert_eq!(lines[0].coverage, Coverage::Full);
    }

    #[test]
    fn test_zero_payment_covers_nothing() {
        let cuotas = vec![cuota("c1", 1, 10_000, 0), cuota("c2", 8, 5_000, 0)];
        for line in payment_coverage(&cuotas, 0) {
            assert_eq!(line.coverage, Coverage::None);
            assert_eq!(line.applied_cents, 0);
        }
    }

    #[test]
    fn test_overpayment_covers_all() {
        let cuotas = vec![cuota("c1", 1, 10_000, 0), cuota("c2", 8, 5_000, 0)];
        let lines = payment_coverage(&cuotas, 100_000);
        assert!(lines.iter().all(|l| l.coverage == Coverage::Full));
    }

    #[test]
    fn test_empty_installment_list() {
        assert!(payment_coverage(&[], 5_000).is_empty());
    }

    #[test]
    fn test_no_mutation() {
        let cuotas = vec![cuota("c1", 1, 10_000, 0)];
        let before = cuotas.clone();
        let _ = payment_coverage(&cuotas, 9_999);
        assert_eq!(cuotas[0].paid_cents, before[0].paid_cents);
        assert_eq!(cuotas[0].status, before[0].status);
    }
}
