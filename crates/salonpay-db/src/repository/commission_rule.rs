//! # Commission Rule Repository
//!
//! Reads for the rate cascade and administrative writes.
//!
//! ## Lookup
//! [`find_active`](SqliteCommissionRuleRepository::find_active) uses one
//! statement for every tier: an unset filter column binds `NULL` and drops
//! out of the `WHERE` clause. Results come back oldest first, which is the
//! tie-break order the cascade relies on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salonpay_core::validation::validate_commission_rule;
use salonpay_core::{CommissionRule, CoreError, Rate, RuleType};
use salonpay_engine::{CommissionRuleRepository, EngineResult, RuleFilter};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::timestamp;
use crate::error::{DbError, DbResult};

const SELECT_COLUMNS: &str = r#"
    SELECT id, rule_type, service_id, professional_id, commission_rate,
           is_active, created_at, updated_at
    FROM commission_rules
"#;

/// Row shape of `commission_rules`.
#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    id: String,
    rule_type: String,
    service_id: Option<String>,
    professional_id: Option<String>,
    commission_rate: f64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RuleRow> for CommissionRule {
    type Error = CoreError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        Ok(CommissionRule {
            rule_type: row.rule_type.parse::<RuleType>()?,
            commission_rate: Rate::parse_fraction("commission_rate", row.commission_rate)?,
            id: row.id,
            service_id: row.service_id,
            professional_id: row.professional_id,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_rules(rows: Vec<RuleRow>) -> DbResult<Vec<CommissionRule>> {
    rows.into_iter()
        .map(|row| CommissionRule::try_from(row).map_err(DbError::from))
        .collect()
}

/// Blank ids are stored as NULL.
fn normalized(id: Option<&str>) -> Option<&str> {
    id.map(str::trim).filter(|id| !id.is_empty())
}

/// Repository for commission rule database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.commission_rules();
///
/// let rule = CommissionRule::new(RuleType::Service, Some(service_id), None, Rate::from_ppm(450_000));
/// repo.insert(&rule).await?;
/// repo.deactivate(&rule.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCommissionRuleRepository {
    pool: SqlitePool,
}

impl SqliteCommissionRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCommissionRuleRepository { pool }
    }

    /// Active rules matching `filter`, ordered by `created_at`, then `id`.
    pub async fn find_active(&self, filter: &RuleFilter) -> DbResult<Vec<CommissionRule>> {
        let sql = format!(
            r#"{SELECT_COLUMNS}
            WHERE is_active = 1
              AND (?1 IS NULL OR rule_type = ?1)
              AND (?2 IS NULL OR service_id = ?2)
              AND (?3 IS NULL OR professional_id = ?3)
              AND (?4 = 0 OR (service_id IS NULL AND professional_id IS NULL))
            ORDER BY created_at, id
            "#
        );

        let rows = sqlx::query_as::<_, RuleRow>(&sql)
            .bind(filter.rule_type.map(|t| t.as_str()))
            .bind(filter.service_id.as_deref())
            .bind(filter.professional_id.as_deref())
            .bind(filter.unscoped)
            .fetch_all(&self.pool)
            .await?;

        debug!(?filter, count = rows.len(), "Active commission rules fetched");
        into_rules(rows)
    }

    /// Gets a rule by its ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CommissionRule>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");

        let row = sqlx::query_as::<_, RuleRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CommissionRule::try_from)
            .transpose()
            .map_err(DbError::from)
    }

    /// Every rule, active or not, in precedence order.
    pub async fn list_all(&self) -> DbResult<Vec<CommissionRule>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at, id");

        let rows = sqlx::query_as::<_, RuleRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        into_rules(rows)
    }

    /// Inserts a new rule after validating its shape.
    ///
    /// ## Errors
    /// - `Domain(InvalidCommissionRule)` for a rule missing its scope id
    /// - `UniqueViolation` if the id is taken
    pub async fn insert(&self, rule: &CommissionRule) -> DbResult<()> {
        validate_commission_rule(rule)?;

        sqlx::query(
            r#"
            INSERT INTO commission_rules (
                id, rule_type, service_id, professional_id, commission_rate,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&rule.id)
        .bind(rule.rule_type.as_str())
        .bind(normalized(rule.service_id.as_deref()))
        .bind(normalized(rule.professional_id.as_deref()))
        .bind(rule.commission_rate.fraction())
        .bind(rule.is_active)
        .bind(timestamp(rule.created_at))
        .bind(timestamp(rule.updated_at))
        .execute(&self.pool)
        .await?;

        info!(id = %rule.id, rule_type = %rule.rule_type, rate = %rule.commission_rate, "Commission rule created");
        Ok(())
    }

    /// Replaces scope, rate and active flag of an existing rule.
    ///
    /// `created_at` is kept, so editing a rule never changes its precedence.
    pub async fn update(&self, rule: &CommissionRule) -> DbResult<()> {
        validate_commission_rule(rule)?;

        let result = sqlx::query(
            r#"
            UPDATE commission_rules SET
                rule_type = ?2,
                service_id = ?3,
                professional_id = ?4,
                commission_rate = ?5,
                is_active = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&rule.id)
        .bind(rule.rule_type.as_str())
        .bind(normalized(rule.service_id.as_deref()))
        .bind(normalized(rule.professional_id.as_deref()))
        .bind(rule.commission_rate.fraction())
        .bind(rule.is_active)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CommissionRule", &rule.id));
        }

        debug!(id = %rule.id, "Commission rule updated");
        Ok(())
    }

    /// Takes a rule out of the cascade without deleting it.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE commission_rules SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CommissionRule", id));
        }

        info!(id = %id, "Commission rule deactivated");
        Ok(())
    }
}

#[async_trait]
impl CommissionRuleRepository for SqliteCommissionRuleRepository {
    async fn find_active(&self, filter: &RuleFilter) -> EngineResult<Vec<CommissionRule>> {
        Ok(SqliteCommissionRuleRepository::find_active(self, filter).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
