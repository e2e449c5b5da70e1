//! # Company Settings Repository
//!
//! The `company_settings` table holds at most one row: its primary key is
//! constrained to `id = 1`, so a second insert fails with a unique
//! violation no matter how many processes race to create it.
//!
//! ## Bootstrap
//! ```text
//! get_or_create_default()
//!      │
//!      ├── SELECT ... WHERE id = 1 ──── found ──► return it
//!      │
//!      └── INSERT defaults
//!            ├── ok ───────────────────────────► return defaults
//!            └── UNIQUE constraint failed ─────► SELECT again, return winner
//! ```

use async_trait::async_trait;
use chrono::Utc;
use salonpay_core::{CompanySettings, CoreError, Rate, TaxRegime};
use salonpay_engine::{EngineResult, SettingsRepository};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::timestamp;
use crate::error::{DbError, DbResult};

/// Row shape of `company_settings`.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    tax_regime: String,
    is_partner_salon: bool,
    tax_rate: f64,
    payment_gateway_fee: f64,
    default_commission_rate: f64,
}

impl TryFrom<SettingsRow> for CompanySettings {
    type Error = CoreError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        Ok(CompanySettings {
            tax_regime: row.tax_regime.parse::<TaxRegime>()?,
            is_partner_salon: row.is_partner_salon,
            tax_rate: Rate::parse_fraction("tax_rate", row.tax_rate)?,
            payment_gateway_fee: Rate::parse_fraction("payment_gateway_fee", row.payment_gateway_fee)?,
            default_commission_rate: Rate::parse_fraction(
                "default_commission_rate",
                row.default_commission_rate,
            )?,
        })
    }
}

/// Repository for the singleton settings row.
#[derive(Debug, Clone)]
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSettingsRepository { pool }
    }

    /// Returns the settings row, if it exists.
    ///
    /// ## Errors
    /// `Domain(UnsupportedTaxRegime)` if the stored regime is not known.
    pub async fn get_singleton(&self) -> DbResult<Option<CompanySettings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT tax_regime, is_partner_salon, tax_rate,
                   payment_gateway_fee, default_commission_rate
            FROM company_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(CompanySettings::try_from)
            .transpose()
            .map_err(DbError::from)
    }

    /// Inserts the settings row. Fails with `UniqueViolation` if it exists.
    pub async fn create(&self, settings: &CompanySettings) -> DbResult<CompanySettings> {
        let now = timestamp(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO company_settings (
                id, tax_regime, is_partner_salon, tax_rate,
                payment_gateway_fee, default_commission_rate, created_at, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(settings.tax_regime.as_str())
        .bind(settings.is_partner_salon)
        .bind(settings.tax_rate.fraction())
        .bind(settings.payment_gateway_fee.fraction())
        .bind(settings.default_commission_rate.fraction())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(regime = %settings.tax_regime, partner = settings.is_partner_salon, "Company settings created");
        Ok(settings.clone())
    }

    /// Inserts the row unless one exists. Returns whether it was inserted.
    pub async fn seed(&self, settings: &CompanySettings) -> DbResult<bool> {
        let now = timestamp(Utc::now());

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO company_settings (
                id, tax_regime, is_partner_salon, tax_rate,
                payment_gateway_fee, default_commission_rate, created_at, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(settings.tax_regime.as_str())
        .bind(settings.is_partner_salon)
        .bind(settings.tax_rate.fraction())
        .bind(settings.payment_gateway_fee.fraction())
        .bind(settings.default_commission_rate.fraction())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Writes the settings row, creating it if missing.
    pub async fn update(&self, settings: &CompanySettings) -> DbResult<CompanySettings> {
        let now = timestamp(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO company_settings (
                id, tax_regime, is_partner_salon, tax_rate,
                payment_gateway_fee, default_commission_rate, created_at, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT (id) DO UPDATE SET
                tax_regime = excluded.tax_regime,
                is_partner_salon = excluded.is_partner_salon,
                tax_rate = excluded.tax_rate,
                payment_gateway_fee = excluded.payment_gateway_fee,
                default_commission_rate = excluded.default_commission_rate,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(settings.tax_regime.as_str())
        .bind(settings.is_partner_salon)
        .bind(settings.tax_rate.fraction())
        .bind(settings.payment_gateway_fee.fraction())
        .bind(settings.default_commission_rate.fraction())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(regime = %settings.tax_regime, "Company settings updated");
        Ok(settings.clone())
    }

    /// Returns the settings row, creating it with the defaults on first use.
    ///
    /// Losing the creation race is not an error: the winner's row is read
    /// back and returned.
    pub async fn get_or_create_default(&self) -> DbResult<CompanySettings> {
        if let Some(settings) = self.get_singleton().await? {
            return Ok(settings);
        }

        match self.create(&CompanySettings::default()).await {
            Ok(created) => Ok(created),
            Err(err) if err.is_unique_violation() => {
                warn!("Settings created concurrently, using existing row");
                self.get_singleton()
                    .await?
                    .ok_or_else(|| DbError::not_found("CompanySettings", "1"))
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn get_singleton(&self) -> EngineResult<Option<CompanySettings>> {
        Ok(SqliteSettingsRepository::get_singleton(self).await?)
    }

    async fn create(&self, defaults: &CompanySettings) -> EngineResult<CompanySettings> {
        Ok(SqliteSettingsRepository::create(self, defaults).await?)
    }

    async fn update(&self, settings: &CompanySettings) -> EngineResult<CompanySettings> {
        Ok(SqliteSettingsRepository::update(self, settings).await?)
    }

    async fn get_or_create_default(&self) -> EngineResult<CompanySettings> {
        Ok(SqliteSettingsRepository::get_or_create_default(self).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
