//! # salonpay-db: SQLite Storage for SalonPay
//!
//! Implements the split engine's collaborator traits on SQLite with sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SalonPay Data Flow                               │
//! │                                                                         │
//! │  Checkout / billing caller                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SplitEngine (salonpay-engine)                                          │
//! │       │  SettingsRepository / CommissionRuleRepository /               │
//! │       │  ServiceRepository                                              │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   salonpay-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐ │   │
//! │  │   │   Database    │    │    Repositories    │  │ Migrations │ │   │
//! │  │   │   (pool.rs)   │◄───│ settings           │  │ (embedded) │ │   │
//! │  │   │  SqlitePool   │    │ commission_rule    │  │ 001_init   │ │   │
//! │  │   │               │    │ service            │  │            │ │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool and [`Database`] handle
//! - [`migrations`] - Embedded schema migrations
//! - [`config`] - Environment bootstrap configuration
//! - [`error`] - Database error types
//! - [`repository`] - Settings, commission rule and service stores
//!
//! ## Usage
//!
//! ```rust,ignore
//! use salonpay_core::SplitRequest;
//! use salonpay_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./salonpay.db")).await?;
//! let engine = db.split_engine();
//!
//! let result = engine
//!     .calculate_service_split(&SplitRequest::new(10_000).with_service(&service_id))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{BootstrapConfig, ConfigError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::commission_rule::SqliteCommissionRuleRepository;
pub use repository::service::SqliteServiceRepository;
pub use repository::settings::SqliteSettingsRepository;
