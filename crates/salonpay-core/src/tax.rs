//! # Tax Module
//!
//! Computes the tax owed on a split for each [`TaxRegime`].
//!
//! ## Current Rule (identical for all four regimes)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  is_partner_salon = true                                               │
//! │    salon_tax        = round(salon_share × tax_rate)                    │
//! │    professional_tax = 0                                                │
//! │    total_tax        = salon_tax                                        │
//! │                                                                         │
//! │  is_partner_salon = false                                              │
//! │    salon_tax        = round(amount_after_gateway_fee × tax_rate)       │
//! │    professional_tax = 0                                                │
//! │    total_tax        = salon_tax                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The regimes are kept as separate match arms so a regime can diverge
//! without touching the others.

use crate::money::{Money, Rate};
use crate::types::TaxRegime;

/// Everything a regime needs to compute tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxInput {
    pub amount_after_gateway_fee: Money,
    pub salon_share: Money,
    pub professional_commission: Money,
    pub is_partner_salon: bool,
    pub tax_rate: Rate,
}

/// Tax owed by each party.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxOutcome {
    pub salon_tax: Money,
    pub professional_tax: Money,
    pub total_tax: Money,
}

impl TaxRegime {
    /// Computes the tax for this regime.
    ///
    /// ## Example
    /// ```rust
    /// use salonpay_core::{Money, Rate, TaxInput, TaxRegime};
    ///
    /// let outcome = TaxRegime::Mei.compute_tax(&TaxInput {
    ///     amount_after_gateway_fee: Money::from_cents(9701),
    ///     salon_share: Money::from_cents(4850),
    ///     professional_commission: Money::from_cents(4851),
    ///     is_partner_salon: true,
    ///     tax_rate: Rate::from_ppm(60_000),
    /// });
    /// assert_eq!(outcome.salon_tax.cents(), 291);
    /// assert_eq!(outcome.professional_tax.cents(), 0);
    /// ```
    pub fn compute_tax(&self, input: &TaxInput) -> TaxOutcome {
        match self {
            TaxRegime::Mei => salon_bears_tax(input),
            TaxRegime::SimplesNacional => salon_bears_tax(input),
            TaxRegime::LucroPresumido => salon_bears_tax(input),
            TaxRegime::LucroReal => salon_bears_tax(input),
        }
    }
}

/// Partner salons pay tax on their share only; otherwise the salon pays on
/// the whole post-fee amount. The professional never pays here.
fn salon_bears_tax(input: &TaxInput) -> TaxOutcome {
    let taxable = if input.is_partner_salon {
        input.salon_share
    } else {
        input.amount_after_gateway_fee
    };

    let salon_tax = taxable.apply_rate(input.tax_rate);
    let professional_tax = Money::zero();

    TaxOutcome {
        salon_tax,
        professional_tax,
        total_tax: salon_tax + professional_tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input(is_partner_salon: bool) -> TaxInput {
        TaxInput {
            amount_after_gateway_fee: Money::from_cents(9701),
            salon_share: Money::from_cents(4850),
            professional_commission: Money::from_cents(4851),
            is_partner_salon,
            tax_rate: Rate::from_ppm(60_000),
        }
    }

    #[test]
    fn test_partner_salon_taxes_salon_share_only() {
        let outcome = TaxRegime::Mei.compute_tax(&input(true));

        assert_eq!(outcome.salon_tax.cents(), 291);
        assert_eq!(outcome.professional_tax.cents(), 0);
        assert_eq!(outcome.total_tax.cents(), 291);
    }

    #[test]
    fn test_non_partner_taxes_whole_amount() {
        let outcome = TaxRegime::Mei.compute_tax(&input(false));

        assert_eq!(outcome.salon_tax.cents(), 582);
        assert_eq!(outcome.professional_tax.cents(), 0);
        assert_eq!(outcome.total_tax.cents(), 582);
    }

    #[test]
    fn test_all_regimes_compute_identically() {
        for partner in [true, false] {
            let expected = TaxRegime::Mei.compute_tax(&input(partner));
            for regime in TaxRegime::ALL {
                assert_eq!(regime.compute_tax(&input(partner)), expected, "{regime}");
            }
        }
    }

    #[test]
    fn test_partner_professional_tax_always_zero() {
        for regime in TaxRegime::ALL {
            for cents in [1, 99, 10_000, 1_234_567] {
                let outcome = regime.compute_tax(&TaxInput {
                    amount_after_gateway_fee: Money::from_cents(cents),
                    salon_share: Money::from_cents(cents / 2),
                    professional_commission: Money::from_cents(cents - cents / 2),
                    is_partner_salon: true,
                    tax_rate: Rate::from_ppm(155_000),
                });
                assert!(outcome.professional_tax.is_zero());
            }
        }
    }

    #[test]
    fn test_zero_rate_means_zero_tax() {
        let mut zero = input(false);
        zero.tax_rate = Rate::zero();
        assert!(TaxRegime::LucroReal.compute_tax(&zero).total_tax.is_zero());
    }
}
