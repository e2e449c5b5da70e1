//! Bootstrap configuration.
//!
//! Loaded from environment variables with fallback to defaults. The settings
//! overrides only matter when the settings row is seeded; a row that already
//! exists is never touched.

use std::env;
use std::path::PathBuf;

use salonpay_core::{CompanySettings, Rate, TaxRegime};

use crate::pool::DbConfig;

pub const DATABASE_PATH_VAR: &str = "SALONPAY_DATABASE_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "SALONPAY_MAX_CONNECTIONS";
pub const TAX_REGIME_VAR: &str = "SALONPAY_TAX_REGIME";
pub const PARTNER_SALON_VAR: &str = "SALONPAY_PARTNER_SALON";
pub const TAX_RATE_VAR: &str = "SALONPAY_TAX_RATE";
pub const GATEWAY_FEE_VAR: &str = "SALONPAY_GATEWAY_FEE";
pub const DEFAULT_COMMISSION_VAR: &str = "SALONPAY_DEFAULT_COMMISSION";

/// Configuration for opening a database and seeding its settings row.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapConfig {
    /// SQLite file path
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Settings written on first start
    pub settings: CompanySettings,
}

impl BootstrapConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CompanySettings::default();

        let database_path = lookup(DATABASE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./salonpay.db"));

        let max_connections = parse_or(&lookup, MAX_CONNECTIONS_VAR, 5, |v| {
            v.parse::<u32>().ok().filter(|n| *n > 0)
        })?;

        let tax_regime = parse_or(&lookup, TAX_REGIME_VAR, defaults.tax_regime, |v| {
            v.trim().parse::<TaxRegime>().ok()
        })?;

        let is_partner_salon = parse_or(&lookup, PARTNER_SALON_VAR, defaults.is_partner_salon, |v| {
            v.trim().parse::<bool>().ok()
        })?;

        let tax_rate = parse_or(&lookup, TAX_RATE_VAR, defaults.tax_rate, parse_rate)?;
        let payment_gateway_fee =
            parse_or(&lookup, GATEWAY_FEE_VAR, defaults.payment_gateway_fee, parse_rate)?;
        let default_commission_rate = parse_or(
            &lookup,
            DEFAULT_COMMISSION_VAR,
            defaults.default_commission_rate,
            parse_rate,
        )?;

        Ok(BootstrapConfig {
            database_path,
            max_connections,
            settings: CompanySettings {
                tax_regime,
                is_partner_salon,
                tax_rate,
                payment_gateway_fee,
                default_commission_rate,
            },
        })
    }

    /// Database configuration that seeds `settings` on connect.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .seed_settings(self.settings.clone())
    }
}

fn parse_or<F, T, P>(lookup: &F, key: &str, default: T, parse: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => parse(&raw).ok_or_else(|| ConfigError::InvalidValue(key.to_string())),
    }
}

fn parse_rate(raw: &str) -> Option<Rate> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|v| Rate::from_fraction(v).ok())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
