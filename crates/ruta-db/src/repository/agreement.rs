//! # Agreement Repository
//!
//! Persistence for payment agreements and their installments, plus the
//! aggregate summary the credit rules engine consumes.
//!
//! ## Payment Application
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 FIFO Settlement (oldest due first)                      │
//! │                                                                         │
//! │  Customer pays $120. Outstanding installments by due date:             │
//! │                                                                         │
//! │  #1 due Mar 03, pending $100  ← gets $100, status → paid               │
//! │  #2 due Mar 10, pending $50   ← gets $20,  status → partial            │
//! │  #3 due Mar 17, pending $30   ← untouched                              │
//! │                                                                         │
//! │  Each applied amount also rolls up into the parent agreement's         │
//! │  paid total; an agreement whose paid ≥ total flips to completed.       │
//! │  All in one transaction.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pure classification of the same walk (for display, no writes) lives
//! in `ruta_core::installment::payment_coverage`.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use ruta_core::credit::{AgreementSummary, CreditPolicy, PaymentPlan};
use ruta_core::{Agreement, AgreementStatus, CoreError, Installment, InstallmentStatus};

/// Days past the due date before an installment is flipped to overdue.
/// Matches the grace period in the default credit policy.
const OVERDUE_GRACE_DAYS: i64 = 2;

/// What became of a manual payment after FIFO application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentApplication {
    /// Cents absorbed by outstanding installments.
    pub applied_cents: i64,
    /// Cents left over (overpayment, or no outstanding installments).
    pub remaining_cents: i64,
}

/// Repository for credit agreements and installments.
#[derive(Debug, Clone)]
pub struct AgreementRepository {
    pool: SqlitePool,
}

const INSTALLMENT_COLUMNS: &str =
    "i.id, i.agreement_id, i.sequence, i.amount_cents, i.paid_cents, \
     i.due_date, i.paid_at, i.status, i.days_late";

impl AgreementRepository {
    /// Creates a new AgreementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AgreementRepository { pool }
    }

    /// Creates an agreement from a generated payment plan, installments
    /// included, in one transaction.
    ///
    /// Frozen customers (at or past the broken-agreement freeze threshold)
    /// are rejected outright; the seller's override flow does not reach
    /// this far.
    pub async fn create_agreement(
        &self,
        customer_id: &str,
        sale_id: Option<&str>,
        van_id: &str,
        user_id: &str,
        plan: &PaymentPlan,
    ) -> DbResult<Agreement> {
        let broken: u32 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM agreements WHERE customer_id = ?1 AND status = 'broken'",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        if broken >= CreditPolicy::default().freeze_at_broken {
            return Err(CoreError::CreditFrozen {
                customer_id: customer_id.to_string(),
                broken_agreements: broken,
            }
            .into());
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let agreement = Agreement {
            id: id.clone(),
            customer_id: customer_id.to_string(),
            sale_id: sale_id.map(str::to_string),
            van_id: Some(van_id.to_string()),
            user_id: Some(user_id.to_string()),
            total_cents: plan.total_cents,
            paid_cents: 0,
            num_installments: plan.num_installments as i64,
            term_days: plan.term_days,
            deadline: plan.deadline,
            status: AgreementStatus::Active,
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO agreements \
             (id, customer_id, sale_id, van_id, user_id, total_cents, paid_cents, \
              num_installments, term_days, deadline, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, 'active', ?10)",
        )
        .bind(&agreement.id)
        .bind(&agreement.customer_id)
        .bind(&agreement.sale_id)
        .bind(&agreement.van_id)
        .bind(&agreement.user_id)
        .bind(agreement.total_cents)
        .bind(agreement.num_installments)
        .bind(agreement.term_days)
        .bind(agreement.deadline)
        .bind(agreement.created_at)
        .execute(&mut *tx)
        .await?;

        for planned in &plan.installments {
            sqlx::query(
                "INSERT INTO installments \
                 (id, agreement_id, sequence, amount_cents, paid_cents, due_date, status) \
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, 'pending')",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&agreement.id)
            .bind(planned.sequence as i64)
            .bind(planned.amount_cents)
            .bind(planned.due_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            agreement_id = %agreement.id,
            customer_id,
            total_cents = plan.total_cents,
            installments = plan.num_installments,
            "Created payment agreement"
        );

        Ok(agreement)
    }

    /// Loads an agreement by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Agreement>> {
        let agreement: Option<Agreement> = sqlx::query_as(
            "SELECT id, customer_id, sale_id, van_id, user_id, total_cents, paid_cents, \
             num_installments, term_days, deadline, status, created_at \
             FROM agreements WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(agreement)
    }

    /// Outstanding installments for a customer's active agreements,
    /// FIFO-ordered by due date.
    pub async fn installments_outstanding(&self, customer_id: &str) -> DbResult<Vec<Installment>> {
        let sql = format!(
            "SELECT {INSTALLMENT_COLUMNS} FROM installments i \
             JOIN agreements a ON a.id = i.agreement_id \
             WHERE a.customer_id = ?1 AND a.status = 'active' AND i.status != 'paid' \
             ORDER BY i.due_date, i.sequence"
        );
        let installments: Vec<Installment> = sqlx::query_as(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(installments)
    }

    /// Applies a manual payment FIFO across the customer's outstanding
    /// installments, rolling paid totals up to the parent agreements and
    /// completing them when fully paid. One transaction.
    pub async fn apply_payment(
        &self,
        customer_id: &str,
        amount_cents: i64,
    ) -> DbResult<PaymentApplication> {
        debug!(customer_id, amount_cents, "Applying manual payment");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {INSTALLMENT_COLUMNS} FROM installments i \
             JOIN agreements a ON a.id = i.agreement_id \
             WHERE a.customer_id = ?1 AND a.status = 'active' AND i.status != 'paid' \
             ORDER BY i.due_date, i.sequence"
        );
        let outstanding: Vec<Installment> = sqlx::query_as(&sql)
            .bind(customer_id)
            .fetch_all(&mut *tx)
            .await?;

        let mut remaining = amount_cents.max(0);
        let mut applied = 0i64;

        for installment in &outstanding {
            if remaining <= 0 {
                break;
            }

            let pending = (installment.amount_cents - installment.paid_cents).max(0);
            let pay = pending.min(remaining);
            if pay == 0 {
                continue;
            }

            let new_paid = installment.paid_cents + pay;
            let fully_paid = new_paid >= installment.amount_cents;

            sqlx::query(
                "UPDATE installments SET \
                 paid_cents = ?2, \
                 status = ?3, \
                 paid_at = CASE WHEN ?4 THEN ?5 ELSE paid_at END \
                 WHERE id = ?1",
            )
            .bind(&installment.id)
            .bind(new_paid)
            .bind(if fully_paid {
                InstallmentStatus::Paid
            } else {
                InstallmentStatus::Partial
            })
            .bind(fully_paid)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE agreements SET paid_cents = paid_cents + ?2 WHERE id = ?1")
                .bind(&installment.agreement_id)
                .bind(pay)
                .execute(&mut *tx)
                .await?;

            remaining -= pay;
            applied += pay;
        }

        // Agreements whose rolled-up total is now covered flip to completed.
        sqlx::query(
            "UPDATE agreements SET status = 'completed' \
             WHERE customer_id = ?1 AND status = 'active' AND paid_cents >= total_cents",
        )
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(customer_id, applied, remaining, "Payment applied");

        Ok(PaymentApplication {
            applied_cents: applied,
            remaining_cents: remaining,
        })
    }

    /// Flips pending/partial installments whose due date (plus the grace
    /// period) has passed to overdue, recording how late each one is.
    /// Returns the number of rows flipped.
    ///
    /// Only installments under active agreements are touched; broken and
    /// completed agreements are settled history.
    pub async fn mark_overdue(&self, today: NaiveDate) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE installments SET \
             status = 'overdue', \
             days_late = CAST(julianday(?1) - julianday(due_date) AS INTEGER) \
             WHERE status IN ('pending', 'partial') \
             AND julianday(?1) - julianday(due_date) > ?2 \
             AND agreement_id IN (SELECT id FROM agreements WHERE status = 'active')",
        )
        .bind(today)
        .bind(OVERDUE_GRACE_DAYS)
        .execute(&self.pool)
        .await?;

        let flipped = result.rows_affected();
        if flipped > 0 {
            info!(flipped, "Installments marked overdue");
        }
        Ok(flipped)
    }

    /// Days since the customer's earliest unpaid due date, 0 when nothing
    /// is outstanding or nothing is past due yet.
    pub async fn oldest_debt_days(&self, customer_id: &str, today: NaiveDate) -> DbResult<i64> {
        let earliest: Option<NaiveDate> = sqlx::query_scalar(
            "SELECT MIN(i.due_date) FROM installments i \
             JOIN agreements a ON a.id = i.agreement_id \
             WHERE a.customer_id = ?1 AND a.status = 'active' AND i.status != 'paid'",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(earliest
            .map(|due| (today - due).num_days().max(0))
            .unwrap_or(0))
    }

    /// Aggregate view of a customer's agreements for the credit rules
    /// engine. Empty history returns the zeroed default, not an error.
    pub async fn agreement_summary(&self, customer_id: &str) -> DbResult<AgreementSummary> {
        let (total, active, broken, completed, debt): (u32, u32, u32, u32, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*), \
                 COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0), \
                 COALESCE(SUM(CASE WHEN status = 'broken' THEN 1 ELSE 0 END), 0), \
                 COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0), \
                 COALESCE(SUM(CASE WHEN status = 'active' \
                     THEN MAX(total_cents - paid_cents, 0) ELSE 0 END), 0) \
             FROM agreements WHERE customer_id = ?1",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        let (overdue, max_days_late): (u32, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(MAX(i.days_late), 0) \
             FROM installments i \
             JOIN agreements a ON a.id = i.agreement_id \
             WHERE a.customer_id = ?1 AND a.status = 'active' AND i.status = 'overdue'",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        let next_due: Option<(NaiveDate, i64)> = sqlx::query_as(
            "SELECT i.due_date, i.amount_cents - i.paid_cents \
             FROM installments i \
             JOIN agreements a ON a.id = i.agreement_id \
             WHERE a.customer_id = ?1 AND a.status = 'active' AND i.status != 'paid' \
             ORDER BY i.due_date, i.sequence LIMIT 1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(AgreementSummary {
            total_agreements: total,
            active_agreements: active,
            broken_agreements: broken,
            completed_agreements: completed,
            debt_in_agreements_cents: debt,
            overdue_installments: overdue,
            max_days_late,
            next_due_date: next_due.map(|(date, _)| date),
            next_due_amount_cents: next_due.map(|(_, amount)| amount),
        })
    }

    /// Marks an agreement broken (customer defaulted). Feeds the credit
    /// rules' limit penalties and freeze.
    pub async fn mark_broken(&self, agreement_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE agreements SET status = 'broken' WHERE id = ?1 AND status = 'active'",
        )
        .bind(agreement_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::DbError::not_found(
                "Agreement (active)",
                agreement_id,
            ));
        }

        info!(agreement_id, "Agreement marked broken");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use ruta_core::credit::{generate_payment_plan, CreditPolicy};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    async fn seed_agreement(db: &Database, customer: &str, total_cents: i64) -> Agreement {
        let plan = generate_payment_plan(total_cents, today(), Some(3), &CreditPolicy::default());
        db.agreements()
            .create_agreement(customer, None, "van-1", "user-1", &plan)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_agreement_with_installments() {
        let db = test_db().await;
        let agreement = seed_agreement(&db, "cust-1", 9_000).await;

        assert_eq!(agreement.total_cents, 9_000);
        assert_eq!(agreement.num_installments, 3);

        let outstanding = db
            .agreements()
            .installments_outstanding("cust-1")
            .await
            .unwrap();
        assert_eq!(outstanding.len(), 3);
        assert_eq!(outstanding.iter().map(|i| i.amount_cents).sum::<i64>(), 9_000);
        // FIFO order
        assert!(outstanding.windows(2).all(|w| w[0].due_date <= w[1].due_date));
    }

    #[tokio::test]
    async fn test_apply_payment_fifo() {
        let db = test_db().await;
        seed_agreement(&db, "cust-1", 9_000).await;
        let repo = db.agreements();

        // 3 installments of 3000. Pay 4000: first fully paid, second partial.
        let application = repo.apply_payment("cust-1", 4_000).await.unwrap();
        assert_eq!(application.applied_cents, 4_000);
        assert_eq!(application.remaining_cents, 0);

        let outstanding = repo.installments_outstanding("cust-1").await.unwrap();
        assert_eq!(outstanding.len(), 2);
        assert_eq!(outstanding[0].status, InstallmentStatus::Partial);
        assert_eq!(outstanding[0].paid_cents, 1_000);
        assert_eq!(outstanding[1].status, InstallmentStatus::Pending);

        // Rollup reached the parent
        let summary = repo.agreement_summary("cust-1").await.unwrap();
        assert_eq!(summary.debt_in_agreements_cents, 5_000);
    }

    #[tokio::test]
    async fn test_full_payment_completes_agreement() {
        let db = test_db().await;
        let agreement = seed_agreement(&db, "cust-1", 9_000).await;
        let repo = db.agreements();

        let application = repo.apply_payment("cust-1", 10_000).await.unwrap();
        assert_eq!(application.applied_cents, 9_000);
        assert_eq!(application.remaining_cents, 1_000);

        let reloaded = repo.get_by_id(&agreement.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, AgreementStatus::Completed);
        assert_eq!(reloaded.paid_cents, 9_000);

        let summary = repo.agreement_summary("cust-1").await.unwrap();
        assert_eq!(summary.active_agreements, 0);
        assert_eq!(summary.completed_agreements, 1);
        assert_eq!(summary.debt_in_agreements_cents, 0);
    }

    #[tokio::test]
    async fn test_mark_overdue_respects_grace_period() {
        let db = test_db().await;
        seed_agreement(&db, "cust-1", 9_000).await;
        let repo = db.agreements();

        let plan = generate_payment_plan(9_000, today(), Some(3), &CreditPolicy::default());
        let first_due = plan.installments[0].due_date;

        // On the due date: nothing flips
        assert_eq!(repo.mark_overdue(first_due).await.unwrap(), 0);
        // Within grace: still nothing
        assert_eq!(
            repo.mark_overdue(first_due + Duration::days(2)).await.unwrap(),
            0
        );
        // Past grace: the first installment flips
        assert_eq!(
            repo.mark_overdue(first_due + Duration::days(3)).await.unwrap(),
            1
        );

        let outstanding = repo.installments_outstanding("cust-1").await.unwrap();
        assert_eq!(outstanding[0].status, InstallmentStatus::Overdue);
        assert_eq!(outstanding[0].days_late, 3);

        let summary = repo.agreement_summary("cust-1").await.unwrap();
        assert_eq!(summary.overdue_installments, 1);
        assert_eq!(summary.max_days_late, 3);
    }

    #[tokio::test]
    async fn test_mark_overdue_skips_broken_agreements() {
        let db = test_db().await;
        let broken = seed_agreement(&db, "cust-1", 9_000).await;
        seed_agreement(&db, "cust-2", 9_000).await;
        let repo = db.agreements();

        repo.mark_broken(&broken.id).await.unwrap();

        // Far past every due date: only the active agreement's 3 flip
        let flipped = repo
            .mark_overdue(today() + Duration::days(365))
            .await
            .unwrap();
        assert_eq!(flipped, 3);

        // The broken agreement's installments are settled history
        let (pending, max_late): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(MAX(days_late), 0) FROM installments \
             WHERE agreement_id = ?1 AND status = 'pending'",
        )
        .bind(&broken.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(pending, 3);
        assert_eq!(max_late, 0);
    }

    #[tokio::test]
    async fn test_summary_for_unknown_customer_is_zeroed() {
        let db = test_db().await;
        let summary = db
            .agreements()
            .agreement_summary("nobody")
            .await
            .unwrap();

        assert_eq!(summary, AgreementSummary::default());
    }

    #[tokio::test]
    async fn test_broken_agreement_counted_not_owed() {
        let db = test_db().await;
        let agreement = seed_agreement(&db, "cust-1", 9_000).await;
        let repo = db.agreements();

        repo.mark_broken(&agreement.id).await.unwrap();

        let summary = repo.agreement_summary("cust-1").await.unwrap();
        assert_eq!(summary.broken_agreements, 1);
        assert_eq!(summary.active_agreements, 0);
        // Debt-in-agreements tracks active agreements only; the broken
        // balance is handled by the credit rules' freeze logic.
        assert_eq!(summary.debt_in_agreements_cents, 0);

        // Broken agreements no longer accept FIFO payments
        let outstanding = repo.installments_outstanding("cust-1").await.unwrap();
        assert!(outstanding.is_empty());
    }

    #[tokio::test]
    async fn test_frozen_customer_cannot_open_agreement() {
        let db = test_db().await;
        let repo = db.agreements();

        // Two broken agreements hit the freeze threshold
        for _ in 0..2 {
            let agreement = seed_agreement(&db, "cust-1", 5_000).await;
            repo.mark_broken(&agreement.id).await.unwrap();
        }

        let plan = generate_payment_plan(5_000, today(), Some(2), &CreditPolicy::default());
        let err = repo
            .create_agreement("cust-1", None, "van-1", "user-1", &plan)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::DbError::Core(CoreError::CreditFrozen {
                broken_agreements: 2,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_oldest_debt_days() {
        let db = test_db().await;
        seed_agreement(&db, "cust-1", 9_000).await;
        let repo = db.agreements();

        let plan = generate_payment_plan(9_000, today(), Some(3), &CreditPolicy::default());
        let first_due = plan.installments[0].due_date;

        // Before anything is due
        assert_eq!(repo.oldest_debt_days("cust-1", today()).await.unwrap(), 0);
        // 15 days past the first due date
        assert_eq!(
            repo.oldest_debt_days("cust-1", first_due + Duration::days(15))
                .await
                .unwrap(),
            15
        );
        // No history at all
        assert_eq!(repo.oldest_debt_days("nobody", today()).await.unwrap(), 0);
    }
}
