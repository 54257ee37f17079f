//! # Commission Repository
//!
//! Persistence for commission configuration and commission runs.
//!
//! ## Config Versioning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Insert-and-Deactivate (never update-in-place)              │
//! │                                                                         │
//! │  save_config(new)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE commission_configs SET is_active = 0                           │
//! │   WHERE van_id = ? AND seller_id = ?        ← retire old versions      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT new row with is_active = 1          ← new version              │
//! │                                                                         │
//! │  Old versions stay queryable: an approved run from March still         │
//! │  references the rates that were active in March.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Run Lifecycle
//! The calculator (ruta-core) produces a [`CommissionResult`]; this
//! repository persists it as a pending row and owns the one-way
//! `pending → approved` transition. Approving an unpersisted result first
//! persists it, then approves — two separate statements, so a failure
//! between them leaves a retryable pending row rather than a lost run.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ruta_core::commission::{CommissionConfig, CommissionResult};
use ruta_core::validation::validate_percent;
use ruta_core::{ApprovalStatus, CoreError, SalesBatch, SalesRecord};

/// Repository for commission configs and runs.
#[derive(Debug, Clone)]
pub struct CommissionRepository {
    pool: SqlitePool,
}

impl CommissionRepository {
    /// Creates a new CommissionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CommissionRepository { pool }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Returns the active config for a (van, seller) pair, provisioning the
    /// default config on first use.
    pub async fn active_config(
        &self,
        van_id: &str,
        seller_id: &str,
    ) -> DbResult<CommissionConfig> {
        let payload: Option<String> = sqlx::query_scalar(
            "SELECT payload FROM commission_configs \
             WHERE van_id = ?1 AND seller_id = ?2 AND is_active = 1 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(van_id)
        .bind(seller_id)
        .fetch_optional(&self.pool)
        .await?;

        match payload {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => {
                debug!(van_id, seller_id, "No active config; provisioning default");
                let config = CommissionConfig::default_for(van_id, seller_id);
                self.save_config(&config).await?;
                Ok(config)
            }
        }
    }

    /// Saves a new config version: deactivates existing versions for the
    /// (van, seller) pair, then inserts the new row as active.
    pub async fn save_config(&self, config: &CommissionConfig) -> DbResult<()> {
        for method_config in config.per_method.values() {
            validate_percent(method_config.percentage.percent()).map_err(CoreError::from)?;
        }

        let payload = serde_json::to_string(config)?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE commission_configs SET is_active = 0 \
             WHERE van_id = ?1 AND seller_id = ?2 AND is_active = 1",
        )
        .bind(&config.van_id)
        .bind(&config.seller_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO commission_configs (id, van_id, seller_id, payload, is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
        )
        .bind(&id)
        .bind(&config.van_id)
        .bind(&config.seller_id)
        .bind(&payload)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(van_id = %config.van_id, seller_id = %config.seller_id, "Saved new config version");
        Ok(())
    }

    /// Counts stored config versions for a (van, seller) pair, active or not.
    pub async fn config_version_count(&self, van_id: &str, seller_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM commission_configs WHERE van_id = ?1 AND seller_id = ?2",
        )
        .bind(van_id)
        .bind(seller_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // =========================================================================
    // Sales Records (calculator input)
    // =========================================================================

    /// Records one sale's contribution to commission math.
    pub async fn record_sale(&self, record: &SalesRecord) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO sales_records (id, seller_id, van_id, method, amount_cents, sold_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&record.id)
        .bind(&record.seller_id)
        .bind(&record.van_id)
        .bind(record.method)
        .bind(record.amount_cents)
        .bind(record.sold_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the sales a commission run covers, inclusive on both dates.
    ///
    /// `new_customers` is a side-channel count (bonus-rule input) the caller
    /// already has; it is carried through into the batch.
    pub async fn sales_for_range(
        &self,
        seller_id: &str,
        van_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        new_customers: u32,
    ) -> DbResult<SalesBatch> {
        let records: Vec<SalesRecord> = sqlx::query_as(
            "SELECT id, seller_id, van_id, method, amount_cents, sold_at \
             FROM sales_records \
             WHERE seller_id = ?1 AND van_id = ?2 \
             AND date(sold_at) BETWEEN ?3 AND ?4 \
             ORDER BY sold_at",
        )
        .bind(seller_id)
        .bind(van_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        debug!(seller_id, van_id, count = records.len(), "Loaded sales for range");

        Ok(SalesBatch {
            seller_id: seller_id.to_string(),
            van_id: van_id.to_string(),
            from,
            to,
            records,
            new_customers,
        })
    }

    // =========================================================================
    // Commission Runs
    // =========================================================================

    /// Persists a commission run as a pending row, returning its id.
    ///
    /// The full result (breakdown, line items, applied rules) goes into the
    /// JSON payload; scalar columns repeat only what queries filter on.
    pub async fn save_result(&self, result: &CommissionResult) -> DbResult<String> {
        let id = result
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Utc::now();

        let mut stored = result.clone();
        stored.id = Some(id.clone());
        stored.status = ApprovalStatus::Pending;
        let payload = serde_json::to_string(&stored)?;

        sqlx::query(
            "INSERT INTO commission_results \
             (id, seller_id, van_id, from_date, to_date, status, \
              total_sales_cents, commission_total_cents, total_payable_cents, \
              payload, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&id)
        .bind(&result.seller_id)
        .bind(&result.van_id)
        .bind(result.from)
        .bind(result.to)
        .bind(result.total_sales_cents)
        .bind(result.commission_total_cents)
        .bind(result.total_payable_cents)
        .bind(&payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(id = %id, seller_id = %result.seller_id, "Saved pending commission run");
        Ok(id)
    }

    /// Loads a commission run by id. Status comes from the column, which is
    /// authoritative over whatever the payload was saved with.
    pub async fn get_result(&self, id: &str) -> DbResult<Option<CommissionResult>> {
        let row: Option<(String, ApprovalStatus)> =
            sqlx::query_as("SELECT payload, status FROM commission_results WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((payload, status)) => {
                let mut result: CommissionResult = serde_json::from_str(&payload)?;
                result.id = Some(id.to_string());
                result.status = status;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    /// Approves a pending commission run. One-way: there is no un-approve.
    ///
    /// ## Errors
    /// * `DbError::Core(AlreadyApproved)` - the run is already approved
    /// * `DbError::NotFound` - no run with this id
    pub async fn approve(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE commission_results \
             SET status = 'approved', approved_at = ?2 \
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<String> =
                sqlx::query_scalar("SELECT status FROM commission_results WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;

            return match exists {
                Some(_) => Err(CoreError::AlreadyApproved(id.to_string()).into()),
                None => Err(DbError::not_found("Commission run", id)),
            };
        }

        info!(id = %id, "Commission run approved");
        Ok(())
    }

    /// Approves a run, persisting it first if it was never saved.
    ///
    /// Two separate steps: if the approve fails after the save, the pending
    /// row survives and the call can simply be retried.
    pub async fn approve_result(&self, result: &CommissionResult) -> DbResult<String> {
        let id = match &result.id {
            Some(id) if self.get_result(id).await?.is_some() => id.clone(),
            _ => self.save_result(result).await?,
        };

        self.approve(&id).await?;
        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use ruta_core::commission::{CommissionCalculator, ManualAdjustments};
    use ruta_core::PaymentMethod;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sale(method: PaymentMethod, amount_cents: i64) -> SalesRecord {
        SalesRecord {
            id: Uuid::new_v4().to_string(),
            method,
            amount_cents,
            sold_at: Utc::now(),
            seller_id: "seller-1".to_string(),
            van_id: "van-1".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn sample_result(db: &Database) -> CommissionResult {
        let config = db
            .commissions()
            .active_config("van-1", "seller-1")
            .await
            .unwrap();
        let batch = SalesBatch {
            seller_id: "seller-1".to_string(),
            van_id: "van-1".to_string(),
            from: date("2025-03-01"),
            to: date("2025-03-15"),
            records: vec![sale(PaymentMethod::Cash, 10_000)],
            new_customers: 0,
        };
        CommissionCalculator::new(&config).calculate(&batch, &ManualAdjustments::default())
    }

    #[tokio::test]
    async fn test_default_config_provisioned_on_first_use() {
        let db = test_db().await;
        let repo = db.commissions();

        let config = repo.active_config("van-1", "seller-1").await.unwrap();
        assert_eq!(config.base_salary_cents, 50_000);

        // Provisioning persisted it: second read doesn't create another row
        let again = repo.active_config("van-1", "seller-1").await.unwrap();
        assert_eq!(again, config);
        assert_eq!(repo.config_version_count("van-1", "seller-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_config_versions_instead_of_overwriting() {
        let db = test_db().await;
        let repo = db.commissions();

        let mut config = repo.active_config("van-1", "seller-1").await.unwrap();
        config.base_salary_cents = 60_000;
        repo.save_config(&config).await.unwrap();

        // Both versions stored; the active one is the latest
        assert_eq!(repo.config_version_count("van-1", "seller-1").await.unwrap(), 2);
        let active = repo.active_config("van-1", "seller-1").await.unwrap();
        assert_eq!(active.base_salary_cents, 60_000);
    }

    #[tokio::test]
    async fn test_sales_for_range_filters_by_seller_and_dates() {
        let db = test_db().await;
        let repo = db.commissions();

        repo.record_sale(&sale(PaymentMethod::Cash, 10_000)).await.unwrap();
        repo.record_sale(&sale(PaymentMethod::Card, 5_000)).await.unwrap();

        let mut other = sale(PaymentMethod::Cash, 99_999);
        other.seller_id = "someone-else".to_string();
        repo.record_sale(&other).await.unwrap();

        let today = Utc::now().date_naive();
        let batch = repo
            .sales_for_range("seller-1", "van-1", today, today, 2)
            .await
            .unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.new_customers, 2);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let db = test_db().await;
        let repo = db.commissions();

        let result = sample_result(&db).await;
        let id = repo.save_result(&result).await.unwrap();

        let loaded = repo.get_result(&id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ApprovalStatus::Pending);
        assert_eq!(loaded.total_payable_cents, result.total_payable_cents);
        assert_eq!(loaded.line_items, result.line_items);
    }

    #[tokio::test]
    async fn test_approve_is_one_way() {
        let db = test_db().await;
        let repo = db.commissions();

        let id = repo.save_result(&sample_result(&db).await).await.unwrap();
        repo.approve(&id).await.unwrap();

        let loaded = repo.get_result(&id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ApprovalStatus::Approved);

        let err = repo.approve(&id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::AlreadyApproved(_))));
    }

    #[tokio::test]
    async fn test_approve_unknown_run_is_not_found() {
        let db = test_db().await;
        let err = db.commissions().approve("no-such-id").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_approve_result_persists_unpersisted_run() {
        let db = test_db().await;
        let repo = db.commissions();

        // Fresh calculator output: id is None, never saved
        let result = sample_result(&db).await;
        assert!(result.id.is_none());

        let id = repo.approve_result(&result).await.unwrap();
        let loaded = repo.get_result(&id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ApprovalStatus::Approved);
    }
}
