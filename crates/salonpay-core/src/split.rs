//! # Split Module
//!
//! Partitions a service's gross amount between the salon, the professional,
//! the payment gateway and the tax authority.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gross (10000)                                                          │
//! │    │  − gateway_fee = round(gross × gateway_fee_rate)           (299)  │
//! │    ▼                                                                    │
//! │  after_fee (9701)                                                       │
//! │    ├── professional_commission = round(after_fee × rate)       (4851)  │
//! │    └── salon_share = after_fee − professional_commission       (4850)  │
//! │                                                                         │
//! │  taxes = regime.compute_tax(...)                 (partner: 291 / 0)    │
//! │                                                                         │
//! │  salon_net        = salon_share − salon_tax − product_cost     (4559)  │
//! │  professional_net = professional_commission − professional_tax (4851)  │
//! │  operational      = gateway_fee + product_cost + total_tax      (590)  │
//! │                                                                         │
//! │  salon_net + professional_net + operational == gross  (always)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each multiplication is rounded to a whole cent before it is subtracted
//! from anything, so the three parts always add back up to the gross.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::commission::ResolvedRate;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tax::TaxInput;
use crate::types::{
    CompanySettings, OperationalCosts, SplitMetadata, SplitRequest, SplitResult, TaxBreakdown,
};
use crate::validation::validate_split_request;

/// Computes the split for one service.
///
/// `settings` and `commission` are supplied by the caller; this function
/// never looks anything up.
///
/// ## Errors
/// - [`CoreError::InvalidAmount`] when the gross amount is not positive, or
///   the product cost is negative or too large to subtract from the salon share
pub fn calculate_split(
    request: &SplitRequest,
    settings: &CompanySettings,
    commission: &ResolvedRate,
) -> CoreResult<SplitResult> {
    validate_split_request(request)?;

    let gross = request.gross_amount();
    let product_cost = request.product_cost();

    let gateway_fee = gross.apply_rate(settings.payment_gateway_fee);
    let amount_after_gateway_fee = gross - gateway_fee;

    let professional_commission = amount_after_gateway_fee.apply_rate(commission.rate);
    let salon_share = amount_after_gateway_fee - professional_commission;

    let tax = settings.tax_regime.compute_tax(&TaxInput {
        amount_after_gateway_fee,
        salon_share,
        professional_commission,
        is_partner_salon: settings.is_partner_salon,
        tax_rate: settings.tax_rate,
    });

    // Product cost is the only input not bounded by gross
    let product_cost_overflow =
        || CoreError::invalid_amount("product_cost_cents", product_cost.cents());
    let salon_net_amount = (salon_share - tax.salon_tax)
        .checked_sub(product_cost)
        .ok_or_else(product_cost_overflow)?;
    let professional_net_amount = professional_commission - tax.professional_tax;
    let operational_total = (gateway_fee + tax.total_tax)
        .checked_add(product_cost)
        .ok_or_else(product_cost_overflow)?;

    Ok(SplitResult {
        gross_amount_cents: gross.cents(),
        amount_after_gateway_fee_cents: amount_after_gateway_fee.cents(),
        salon_share_cents: salon_share.cents(),
        professional_commission_cents: professional_commission.cents(),
        salon_net_amount_cents: salon_net_amount.cents(),
        professional_net_amount_cents: professional_net_amount.cents(),
        taxes: TaxBreakdown {
            salon_tax_cents: tax.salon_tax.cents(),
            professional_tax_cents: tax.professional_tax.cents(),
            total_tax_cents: tax.total_tax.cents(),
            regime: settings.tax_regime,
            is_partner_salon: settings.is_partner_salon,
        },
        operational_costs: OperationalCosts {
            gateway_fee_cents: gateway_fee.cents(),
            product_cost_cents: product_cost.cents(),
            total_cents: operational_total.cents(),
        },
        metadata: SplitMetadata {
            commission_rate: commission.rate.fraction(),
            gateway_fee_rate: settings.payment_gateway_fee.fraction(),
            tax_rate: settings.tax_rate.fraction(),
            commission_source: commission.source,
            commission_rule_id: commission.rule_id.clone(),
        },
    })
}

// =============================================================================
// Checkout Summary
// =============================================================================

/// Totals of several splits belonging to one checkout.
///
/// Plain sums of already-rounded cents; nothing is re-rounded.
///
/// A total that would overflow is reported as `InvalidAmount` on that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitSummary {
    pub service_count: usize,
    pub gross_amount_cents: i64,
    pub gateway_fee_cents: i64,
    pub product_cost_cents: i64,
    pub total_tax_cents: i64,
    pub salon_net_amount_cents: i64,
    pub professional_net_amount_cents: i64,
}

impl SplitSummary {
    /// Sums a checkout's splits.
    pub fn from_results(results: &[SplitResult]) -> CoreResult<Self> {
        let sum = |field: &str, f: fn(&SplitResult) -> i64| -> CoreResult<i64> {
            results
                .iter()
                .try_fold(Money::zero(), |total, r| {
                    total
                        .checked_add(Money::from_cents(f(r)))
                        .ok_or_else(|| CoreError::invalid_amount(field, f(r)))
                })
                .map(|total| total.cents())
        };

        Ok(SplitSummary {
            service_count: results.len(),
            gross_amount_cents: sum("gross_amount_cents", |r| r.gross_amount_cents)?,
            gateway_fee_cents: sum("gateway_fee_cents", |r| r.operational_costs.gateway_fee_cents)?,
            product_cost_cents: sum("product_cost_cents", |r| r.operational_costs.product_cost_cents)?,
            total_tax_cents: sum("total_tax_cents", |r| r.taxes.total_tax_cents)?,
            salon_net_amount_cents: sum("salon_net_amount_cents", |r| r.salon_net_amount_cents)?,
            professional_net_amount_cents: sum("professional_net_amount_cents", |r| {
                r.professional_net_amount_cents
            })?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::CommissionSource;
    use crate::money::Rate;
    use crate::types::TaxRegime;

    fn settings(is_partner_salon: bool) -> CompanySettings {
        CompanySettings {
            is_partner_salon,
            ..CompanySettings::default()
        }
    }

    fn default_rate(settings: &CompanySettings) -> ResolvedRate {
        ResolvedRate::company_default(settings.default_commission_rate)
    }

    fn assert_conserves(result: &SplitResult) {
        assert_eq!(
            result.salon_share_cents + result.professional_commission_cents,
            result.amount_after_gateway_fee_cents
        );
        assert_eq!(
            result.salon_net_amount_cents
                + result.professional_net_amount_cents
                + result.operational_costs.total_cents,
            result.gross_amount_cents
        );
    }

    #[test]
    fn test_partner_salon_reference_split() {
        let settings = settings(true);
        let result =
            calculate_split(&SplitRequest::new(10_000), &settings, &default_rate(&settings))
                .unwrap();

        assert_eq!(result.operational_costs.gateway_fee_cents, 299);
        assert_eq!(result.amount_after_gateway_fee_cents, 9701);
        assert_eq!(result.professional_commission_cents, 4851);
        assert_eq!(result.salon_share_cents, 4850);
        assert_eq!(result.taxes.salon_tax_cents, 291);
        assert_eq!(result.taxes.professional_tax_cents, 0);
        assert_eq!(result.taxes.total_tax_cents, 291);
        assert_eq!(result.salon_net_amount_cents, 4559);
        assert_eq!(result.professional_net_amount_cents, 4851);
        assert_eq!(result.operational_costs.product_cost_cents, 0);
        assert_eq!(result.operational_costs.total_cents, 590);
        assert_conserves(&result);
    }

    #[test]
    fn test_non_partner_reference_split() {
        let settings = settings(false);
        let result =
            calculate_split(&SplitRequest::new(10_000), &settings, &default_rate(&settings))
                .unwrap();

        assert_eq!(result.taxes.salon_tax_cents, 582);
        assert_eq!(result.taxes.total_tax_cents, 582);
        assert_eq!(result.salon_net_amount_cents, 4268);
        assert_eq!(result.professional_net_amount_cents, 4851);
        assert_eq!(result.operational_costs.total_cents, 299 + 582);
        assert_conserves(&result);
    }

    #[test]
    fn test_metadata_reports_rates_used() {
        let settings = settings(true);
        let commission = ResolvedRate {
            rate: Rate::from_ppm(350_000),
            source: CommissionSource::ServiceRule,
            rule_id: Some("rule-7".to_string()),
        };
        let result = calculate_split(&SplitRequest::new(10_000), &settings, &commission).unwrap();

        assert_eq!(result.metadata.commission_rate, 0.35);
        assert_eq!(result.metadata.gateway_fee_rate, 0.0299);
        assert_eq!(result.metadata.tax_rate, 0.06);
        assert_eq!(result.metadata.commission_source, CommissionSource::ServiceRule);
        assert_eq!(result.metadata.commission_rule_id.as_deref(), Some("rule-7"));
        assert_eq!(result.taxes.regime, TaxRegime::Mei);
        assert!(result.taxes.is_partner_salon);
    }

    #[test]
    fn test_product_cost_reduces_salon_net_only() {
        let settings = settings(true);
        let rate = default_rate(&settings);
        let base = calculate_split(&SplitRequest::new(10_000), &settings, &rate).unwrap();
        let with_cost = calculate_split(
            &SplitRequest::new(10_000).with_product_cost(1200),
            &settings,
            &rate,
        )
        .unwrap();

        assert_eq!(with_cost.salon_net_amount_cents, base.salon_net_amount_cents - 1200);
        assert_eq!(with_cost.professional_net_amount_cents, base.professional_net_amount_cents);
        assert_eq!(with_cost.operational_costs.total_cents, base.operational_costs.total_cents + 1200);
        assert_conserves(&with_cost);
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        let settings = settings(false);
        let rate = default_rate(&settings);

        for gross in [0, -1, -10_000] {
            let err = calculate_split(&SplitRequest::new(gross), &settings, &rate).unwrap_err();
            assert!(matches!(err, CoreError::InvalidAmount { .. }));
        }

        let err = calculate_split(&SplitRequest::new(100).with_product_cost(-1), &settings, &rate)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { ref field, .. } if field == "product_cost_cents"));
    }

    #[test]
    fn test_huge_product_cost_is_invalid_amount() {
        let settings = CompanySettings::default();
        let rate = default_rate(&settings);
        let request = SplitRequest::new(10_000).with_product_cost(i64::MAX);

        let err = calculate_split(&request, &settings, &rate).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidAmount { ref field, value } if field == "product_cost_cents" && value == i64::MAX
        ));
    }

    #[test]
    fn test_product_cost_above_salon_share_goes_negative() {
        let settings = settings(false);
        let rate = default_rate(&settings);
        let request = SplitRequest::new(10_000).with_product_cost(1_000_000);

        let result = calculate_split(&request, &settings, &rate).unwrap();
        assert_eq!(result.salon_net_amount_cents, 4268 - 1_000_000);
        assert_conserves(&result);
    }

    #[test]
    fn test_one_cent_never_goes_negative() {
        for partner in [true, false] {
            let settings = settings(partner);
            let result =
                calculate_split(&SplitRequest::new(1), &settings, &default_rate(&settings))
                    .unwrap();

            assert!(result.salon_net_amount_cents >= 0);
            assert!(result.professional_net_amount_cents >= 0);
            assert_conserves(&result);
        }
    }

    #[test]
    fn test_conservation_across_amounts_and_rates() {
        let rates = [0, 1, 333_333, 500_000, 999_999, 1_000_000];
        for regime in TaxRegime::ALL {
            for partner in [true, false] {
                for fee_ppm in [0, 29_900, 49_999] {
                    for commission_ppm in rates {
                        let settings = CompanySettings {
                            tax_regime: regime,
                            is_partner_salon: partner,
                            tax_rate: Rate::from_ppm(113_300),
                            payment_gateway_fee: Rate::from_ppm(fee_ppm),
                            default_commission_rate: Rate::from_ppm(commission_ppm),
                        };
                        let rate = default_rate(&settings);
                        for gross in [1, 2, 3, 99, 101, 9_999, 123_457] {
                            let request = SplitRequest::new(gross).with_product_cost(gross / 10);
                            let result = calculate_split(&request, &settings, &rate).unwrap();
                            assert_conserves(&result);
                            if partner {
                                assert_eq!(result.taxes.professional_tax_cents, 0);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let settings = settings(false);
        let rate = default_rate(&settings);
        let request = SplitRequest::new(87_654).with_service("svc").with_product_cost(321);

        let first = calculate_split(&request, &settings, &rate).unwrap();
        let second = calculate_split(&request, &settings, &rate).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_result_json_shape() {
        let settings = settings(true);
        let result =
            calculate_split(&SplitRequest::new(10_000), &settings, &default_rate(&settings))
                .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["taxes"]["regime"], "MEI");
        assert_eq!(json["operational_costs"]["total_cents"], 590);
        assert_eq!(json["metadata"]["commission_source"], "company_default");
    }

    #[test]
    fn test_summary_totals() {
        let settings = settings(true);
        let rate = default_rate(&settings);
        let results: Vec<SplitResult> = [10_000, 5_000, 2_500]
            .into_iter()
            .map(|gross| calculate_split(&SplitRequest::new(gross), &settings, &rate).unwrap())
            .collect();

        let summary = SplitSummary::from_results(&results).unwrap();
        assert_eq!(summary.service_count, 3);
        assert_eq!(summary.gross_amount_cents, 17_500);
        assert_eq!(
            summary.salon_net_amount_cents
                + summary.professional_net_amount_cents
                + summary.gateway_fee_cents
                + summary.product_cost_cents
                + summary.total_tax_cents,
            summary.gross_amount_cents
        );
    }

    #[test]
    fn test_summary_overflow_is_invalid_amount() {
        let settings = settings(true);
        let rate = default_rate(&settings);
        let big = calculate_split(&SplitRequest::new(i64::MAX), &settings, &rate).unwrap();

        let err = SplitSummary::from_results(&[big.clone(), big]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { ref field, .. } if field == "gross_amount_cents"));
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        assert_eq!(SplitSummary::from_results(&[]).unwrap(), SplitSummary::default());
    }
}
