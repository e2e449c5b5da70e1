//! # Domain Types
//!
//! Core domain types used throughout SalonPay.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUTS (owned by the back-office)          OUTPUT (owned by caller)   │
//! │  ┌──────────────────┐  ┌────────────────┐   ┌──────────────────────┐   │
//! │  │ CompanySettings  │  │ CommissionRule │   │     SplitResult      │   │
//! │  │ ──────────────── │  │ ────────────── │   │ ──────────────────── │   │
//! │  │ tax_regime       │  │ rule_type      │   │ gross / after fee    │   │
//! │  │ is_partner_salon │  │ service_id?    │   │ salon share / net    │   │
//! │  │ tax_rate         │  │ professional_id│   │ commission / net     │   │
//! │  │ gateway_fee      │  │ commission_rate│   │ taxes{}              │   │
//! │  │ default_commiss. │  │ is_active      │   │ operational_costs{}  │   │
//! │  └──────────────────┘  └────────────────┘   │ metadata{}           │   │
//! │  ┌──────────────────┐  ┌────────────────┐   └──────────────────────┘   │
//! │  │     Service      │  │  SplitRequest  │                              │
//! │  │ commission_rate? │  │ gross, ids,    │                              │
//! │  └──────────────────┘  │ product_cost   │                              │
//! │                        └────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary fields are `i64` cents with a `_cents` suffix; rates are [`Rate`]
//! internally and plain float fractions on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::commission::CommissionSource;
use crate::error::{CoreError, ValidationError};
use crate::money::{Money, Rate};
use crate::{DEFAULT_COMMISSION_RATE, DEFAULT_GATEWAY_FEE, DEFAULT_TAX_RATE, DEFAULT_TAX_REGIME};

// =============================================================================
// Tax Regime
// =============================================================================

/// Brazilian company tax regime configured for the business.
///
/// Stored and exchanged by its identifier (`MEI`, `SIMPLES_NACIONAL`, ...).
/// Parsing an unknown identifier fails with
/// [`CoreError::UnsupportedTaxRegime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxRegime {
    /// Microempreendedor Individual.
    Mei,
    /// Simples Nacional.
    SimplesNacional,
    /// Lucro Presumido.
    LucroPresumido,
    /// Lucro Real.
    LucroReal,
}

impl TaxRegime {
    /// Every supported regime, in declaration order.
    pub const ALL: [TaxRegime; 4] = [
        TaxRegime::Mei,
        TaxRegime::SimplesNacional,
        TaxRegime::LucroPresumido,
        TaxRegime::LucroReal,
    ];

    /// Returns the storage identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TaxRegime::Mei => "MEI",
            TaxRegime::SimplesNacional => "SIMPLES_NACIONAL",
            TaxRegime::LucroPresumido => "LUCRO_PRESUMIDO",
            TaxRegime::LucroReal => "LUCRO_REAL",
        }
    }
}

impl Default for TaxRegime {
    fn default() -> Self {
        DEFAULT_TAX_REGIME
    }
}

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxRegime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaxRegime::ALL
            .into_iter()
            .find(|regime| regime.as_str() == s)
            .ok_or_else(|| CoreError::UnsupportedTaxRegime(s.to_string()))
    }
}

// =============================================================================
// Company Settings
// =============================================================================

/// The business-wide split configuration. Exactly one exists per deployment.
///
/// ## Defaults (used when the row is first created)
/// | field                     | value  |
/// |---------------------------|--------|
/// | `tax_regime`              | MEI    |
/// | `is_partner_salon`        | false  |
/// | `tax_rate`                | 0.06   |
/// | `payment_gateway_fee`     | 0.0299 |
/// | `default_commission_rate` | 0.50   |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySettings {
    pub tax_regime: TaxRegime,

    /// Partner-salon regime: only the salon's share is taxed.
    pub is_partner_salon: bool,

    pub tax_rate: Rate,

    /// Percentage withheld by the payment processor.
    pub payment_gateway_fee: Rate,

    /// Commission used when no service override or rule applies.
    pub default_commission_rate: Rate,
}

impl Default for CompanySettings {
    fn default() -> Self {
        CompanySettings {
            tax_regime: DEFAULT_TAX_REGIME,
            is_partner_salon: false,
            tax_rate: DEFAULT_TAX_RATE,
            payment_gateway_fee: DEFAULT_GATEWAY_FEE,
            default_commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

// =============================================================================
// Commission Rule
// =============================================================================

/// Scope of a commission rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// Applies to every service and professional.
    General,
    /// Applies to one service.
    Service,
    /// Applies to one professional.
    Professional,
}

impl RuleType {
    /// Returns the storage identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RuleType::General => "GENERAL",
            RuleType::Service => "SERVICE",
            RuleType::Professional => "PROFESSIONAL",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERAL" => Ok(RuleType::General),
            "SERVICE" => Ok(RuleType::Service),
            "PROFESSIONAL" => Ok(RuleType::Professional),
            other => Err(ValidationError::InvalidFormat {
                field: "rule_type".to_string(),
                reason: format!("unknown rule type '{}'", other),
            }),
        }
    }
}

/// An administrator-defined override of the default commission.
///
/// A rule carrying both `service_id` and `professional_id` is a "specific"
/// rule and outranks every single-scope rule, whatever its `rule_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRule {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub rule_type: RuleType,
    pub service_id: Option<String>,
    pub professional_id: Option<String>,
    pub commission_rate: Rate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommissionRule {
    /// Creates an active rule with a fresh UUID v4.
    pub fn new(
        rule_type: RuleType,
        service_id: Option<String>,
        professional_id: Option<String>,
        commission_rate: Rate,
    ) -> Self {
        let now = Utc::now();
        CommissionRule {
            id: uuid::Uuid::new_v4().to_string(),
            rule_type,
            service_id,
            professional_id,
            commission_rate,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the rule is pinned to this exact service and professional.
    pub fn matches_pair(&self, service_id: &str, professional_id: &str) -> bool {
        self.service_id.as_deref() == Some(service_id)
            && self.professional_id.as_deref() == Some(professional_id)
    }

    /// True if the rule names neither a service nor a professional.
    ///
    /// Only such rules take part in the `GENERAL` tier; a `GENERAL` rule
    /// pinned to ids applies to its pair alone.
    pub fn is_unscoped(&self) -> bool {
        non_blank(self.service_id.as_deref()).is_none()
            && non_blank(self.professional_id.as_deref()).is_none()
    }

    /// Key used to order competing rules: oldest first, then lowest id.
    pub fn precedence_key(&self) -> (DateTime<Utc>, &str) {
        (self.created_at, self.id.as_str())
    }
}

// =============================================================================
// Service
// =============================================================================

/// A bookable service, as far as the split engine cares about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,

    /// List price in cents (informational; the split uses the charged gross).
    pub price_cents: i64,

    /// Direct commission override. Wins over every commission rule.
    pub commission_rate: Option<Rate>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Creates an active service without a commission override.
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        let now = Utc::now();
        Service {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            price_cents,
            commission_rate: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_commission_rate(mut self, rate: Rate) -> Self {
        self.commission_rate = Some(rate);
        self
    }
}

// =============================================================================
// Split Request
// =============================================================================

/// Input to a split calculation.
///
/// ## Example
/// ```rust
/// use salonpay_core::SplitRequest;
///
/// let request = SplitRequest::new(10_000)
///     .with_service("svc-1")
///     .with_professional("pro-1")
///     .with_product_cost(350);
/// assert_eq!(request.product_cost_cents, 350);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitRequest {
    /// Total charged to the client, in cents. Must be positive.
    pub gross_amount_cents: i64,

    /// Used only for commission rule lookup.
    #[serde(default)]
    pub service_id: Option<String>,

    /// Used only for commission rule lookup.
    #[serde(default)]
    pub professional_id: Option<String>,

    /// Cost of products consumed by the service, borne by the salon.
    #[serde(default)]
    pub product_cost_cents: i64,
}

impl SplitRequest {
    /// Creates a request with no identifiers and zero product cost.
    pub fn new(gross_amount_cents: i64) -> Self {
        SplitRequest {
            gross_amount_cents,
            service_id: None,
            professional_id: None,
            product_cost_cents: 0,
        }
    }

    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn with_professional(mut self, professional_id: impl Into<String>) -> Self {
        self.professional_id = Some(professional_id.into());
        self
    }

    pub fn with_product_cost(mut self, product_cost_cents: i64) -> Self {
        self.product_cost_cents = product_cost_cents;
        self
    }

    /// Service id, with blank strings treated as absent.
    pub fn service_key(&self) -> Option<&str> {
        non_blank(self.service_id.as_deref())
    }

    /// Professional id, with blank strings treated as absent.
    pub fn professional_key(&self) -> Option<&str> {
        non_blank(self.professional_id.as_deref())
    }

    #[inline]
    pub fn gross_amount(&self) -> Money {
        Money::from_cents(self.gross_amount_cents)
    }

    #[inline]
    pub fn product_cost(&self) -> Money {
        Money::from_cents(self.product_cost_cents)
    }
}

fn non_blank(id: Option<&str>) -> Option<&str> {
    id.map(str::trim).filter(|id| !id.is_empty())
}

// =============================================================================
// Split Result
// =============================================================================

/// Fully itemized breakdown of one service's gross amount.
///
/// Every `_cents` field is final: no rounding is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitResult {
    pub gross_amount_cents: i64,
    pub amount_after_gateway_fee_cents: i64,
    pub salon_share_cents: i64,
    pub professional_commission_cents: i64,
    pub salon_net_amount_cents: i64,
    pub professional_net_amount_cents: i64,
    pub taxes: TaxBreakdown,
    pub operational_costs: OperationalCosts,
    pub metadata: SplitMetadata,
}

/// Tax owed on a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxBreakdown {
    pub salon_tax_cents: i64,
    pub professional_tax_cents: i64,
    pub total_tax_cents: i64,
    pub regime: TaxRegime,
    pub is_partner_salon: bool,
}

/// Costs deducted before anyone is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OperationalCosts {
    pub gateway_fee_cents: i64,
    pub product_cost_cents: i64,
    /// gateway fee + product cost + total tax
    pub total_cents: i64,
}

/// The rates that were actually used, for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitMetadata {
    pub commission_rate: f64,
    pub gateway_fee_rate: f64,
    pub tax_rate: f64,
    /// Which tier of the commission cascade produced `commission_rate`.
    pub commission_source: CommissionSource,
    /// Id of the winning commission rule, when a rule won.
    pub commission_rule_id: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
