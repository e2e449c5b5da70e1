//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new(path)            pool sizes, timeouts, seed settings     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                            │
//! │       ├── open SqlitePool (WAL, foreign keys)                           │
//! │       ├── run embedded migrations          (if run_migrations)         │
//! │       └── INSERT OR IGNORE settings row    (if seed_settings)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.split_engine()  ──►  SplitEngine over the three SQLite stores       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! Readers don't block writers and writers don't block readers, so split
//! calculations keep reading while an administrator edits rules.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use salonpay_core::CompanySettings;
use salonpay_engine::SplitEngine;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::commission_rule::SqliteCommissionRuleRepository;
use crate::repository::service::SqliteServiceRepository;
use crate::repository::settings::SqliteSettingsRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/salonpay/salonpay.db")
///     .max_connections(5)
///     .seed_settings(CompanySettings::default());
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Settings row written on connect if none exists yet.
    /// Default: None (created lazily on the first split)
    pub seed_settings: Option<CompanySettings>,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            seed_settings: None,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Seeds the settings row on connect.
    pub fn seed_settings(mut self, settings: CompanySettings) -> Self {
        self.seed_settings = Some(settings);
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            seed_settings: None,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cheap to clone; every clone shares one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL mode, NORMAL synchronous, foreign keys
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    /// 5. Seeds the settings row (if configured)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        if let Some(settings) = &config.seed_settings {
            let inserted = db.settings().seed(settings).await?;
            info!(inserted, regime = %settings.tax_regime, "Company settings seeded");
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the company settings repository.
    pub fn settings(&self) -> SqliteSettingsRepository {
        SqliteSettingsRepository::new(self.pool.clone())
    }

    /// Returns the commission rule repository.
    pub fn commission_rules(&self) -> SqliteCommissionRuleRepository {
        SqliteCommissionRuleRepository::new(self.pool.clone())
    }

    /// Returns the service repository.
    pub fn services(&self) -> SqliteServiceRepository {
        SqliteServiceRepository::new(self.pool.clone())
    }

    /// Builds a split engine reading from this database.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let result = db
    ///     .split_engine()
    ///     .calculate_service_split(&SplitRequest::new(10_000))
    ///     .await?;
    /// ```
    pub fn split_engine(&self) -> SplitEngine {
        SplitEngine::new(
            Arc::new(self.settings()),
            Arc::new(self.commission_rules()),
            Arc::new(self.services()),
        )
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use salonpay_core::{CommissionRule, CommissionSource, Rate, RuleType, SplitRequest, TaxRegime};

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .seed_settings(CompanySettings::default());

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(config.seed_settings.is_some());
    }

    #[tokio::test]
    async fn test_seed_settings_on_connect() {
        let seeded = CompanySettings {
            tax_regime: TaxRegime::LucroPresumido,
            is_partner_salon: true,
            ..CompanySettings::default()
        };
        let db = Database::new(DbConfig::in_memory().seed_settings(seeded.clone()))
            .await
            .unwrap();

        assert_eq!(db.settings().get_singleton().await.unwrap(), Some(seeded));
    }

    #[tokio::test]
    async fn test_split_engine_over_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let result = db
            .split_engine()
            .calculate_service_split(&SplitRequest::new(10_000))
            .await
            .unwrap();

        assert_eq!(result.salon_net_amount_cents, 4268);
        assert_eq!(
            db.settings().get_singleton().await.unwrap(),
            Some(CompanySettings::default())
        );
    }

    #[tokio::test]
    async fn test_pinned_general_rule_over_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pinned = CommissionRule::new(
            RuleType::General,
            Some("svc-1".to_string()),
            Some("pro-1".to_string()),
            Rate::from_ppm(650_000),
        );
        db.commission_rules().insert(&pinned).await.unwrap();
        let engine = db.split_engine();

        let request = SplitRequest::new(10_000)
            .with_service("svc-2")
            .with_professional("pro-2");
        let result = engine.calculate_service_split(&request).await.unwrap();
        assert_eq!(result.metadata.commission_source, CommissionSource::CompanyDefault);
        assert_eq!(result.salon_net_amount_cents, 4268);

        let request = SplitRequest::new(10_000)
            .with_service("svc-1")
            .with_professional("pro-1");
        let result = engine.calculate_service_split(&request).await.unwrap();
        assert_eq!(result.metadata.commission_source, CommissionSource::SpecificRule);
        assert_eq!(result.metadata.commission_rule_id, Some(pinned.id));
    }
}
