//! # salonpay-core: Pure Business Logic for SalonPay
//!
//! This crate holds the payment split engine's rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SalonPay Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Back-office (scheduling, billing, checkout)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SplitRequest                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 salonpay-engine (SplitEngine)                   │   │
//! │  │    loads settings, fetches rule candidates in parallel          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ salonpay-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │commission │  │    tax    │  │   split   │  │   │
//! │  │   │   Money   │  │ cascade   │  │ TaxRegime │  │ calculate │  │   │
//! │  │   │   Rate    │  │ resolver  │  │  match    │  │  _split   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CompanySettings, CommissionRule, Service, SplitResult)
//! - [`money`] - Money and Rate with integer arithmetic
//! - [`commission`] - Commission rate priority cascade
//! - [`tax`] - Per-regime tax computation
//! - [`split`] - The split calculation itself
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, bit for bit
//! 2. **No I/O**: settings and rules are passed in by the caller
//! 3. **Integer Money**: all monetary values are cents (i64); rates are ppm
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use salonpay_core::{calculate_split, CompanySettings, ResolvedRate, SplitRequest};
//!
//! let mut settings = CompanySettings::default();
//! settings.is_partner_salon = true;
//!
//! let request = SplitRequest::new(10_000);
//! let rate = ResolvedRate::company_default(settings.default_commission_rate);
//! let result = calculate_split(&request, &settings, &rate).unwrap();
//!
//! assert_eq!(result.operational_costs.gateway_fee_cents, 299);
//! assert_eq!(result.professional_commission_cents, 4851);
//! assert_eq!(result.salon_net_amount_cents, 4559);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod error;
pub mod money;
pub mod split;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use commission::{resolve_rate, CommissionSource, RateCandidates, ResolvedRate};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use split::{calculate_split, SplitSummary};
pub use tax::{TaxInput, TaxOutcome};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax regime used when the settings row is first created.
pub const DEFAULT_TAX_REGIME: TaxRegime = TaxRegime::Mei;

/// Tax rate used when the settings row is first created (6%).
pub const DEFAULT_TAX_RATE: Rate = Rate::from_ppm(60_000);

/// Payment gateway fee used when the settings row is first created (2.99%).
pub const DEFAULT_GATEWAY_FEE: Rate = Rate::from_ppm(29_900);

/// Commission rate used when the settings row is first created (50%).
pub const DEFAULT_COMMISSION_RATE: Rate = Rate::from_ppm(500_000);
