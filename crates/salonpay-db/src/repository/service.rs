//! # Service Repository
//!
//! Only the commission override matters to the split; the other columns are
//! kept so administrators can tell services apart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salonpay_core::validation::validate_service;
use salonpay_core::{CoreError, Rate, Service};
use salonpay_engine::{EngineResult, ServiceRepository};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::timestamp;
use crate::error::{DbError, DbResult};

/// Row shape of `services`.
#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: String,
    name: String,
    price_cents: i64,
    commission_rate: Option<f64>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ServiceRow> for Service {
    type Error = CoreError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let commission_rate = row
            .commission_rate
            .map(|rate| Rate::parse_fraction("commission_rate", rate))
            .transpose()?;

        Ok(Service {
            id: row.id,
            name: row.name,
            price_cents: row.price_cents,
            commission_rate,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for service database operations.
#[derive(Debug, Clone)]
pub struct SqliteServiceRepository {
    pool: SqlitePool,
}

impl SqliteServiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteServiceRepository { pool }
    }

    /// Gets a service by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Service))` - Service found
    /// * `Ok(None)` - Service not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT id, name, price_cents, commission_rate, is_active, created_at, updated_at
            FROM services
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(service_id = %id, found = row.is_some(), "Service lookup");

        row.map(Service::try_from)
            .transpose()
            .map_err(DbError::from)
    }

    /// Inserts a new service.
    pub async fn insert(&self, service: &Service) -> DbResult<()> {
        validate_service(service)?;

        sqlx::query(
            r#"
            INSERT INTO services (
                id, name, price_cents, commission_rate, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&service.id)
        .bind(service.name.trim())
        .bind(service.price_cents)
        .bind(service.commission_rate.map(|rate| rate.fraction()))
        .bind(service.is_active)
        .bind(timestamp(service.created_at))
        .bind(timestamp(service.updated_at))
        .execute(&self.pool)
        .await?;

        info!(id = %service.id, name = %service.name, "Service created");
        Ok(())
    }

    /// Sets or clears the service-level commission override.
    pub async fn set_commission_rate(&self, id: &str, rate: Option<Rate>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE services SET commission_rate = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(rate.map(|rate| rate.fraction()))
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
        }

        info!(id = %id, rate = ?rate.map(|r| r.fraction()), "Service commission override set");
        Ok(())
    }
}

#[async_trait]
impl ServiceRepository for SqliteServiceRepository {
    async fn get_by_id(&self, service_id: &str) -> EngineResult<Option<Service>> {
        Ok(SqliteServiceRepository::get_by_id(self, service_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
