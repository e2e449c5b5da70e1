//! # Commission Module
//!
//! Picks the commission rate for a (service, professional) pair.
//!
//! ## Priority Cascade (first match wins, no merging)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Service.commission_rate override          (service exists + set)   │
//! │  2. active rule with service_id AND professional_id   (any rule_type)  │
//! │  3. active SERVICE rule for service_id                                 │
//! │  4. active PROFESSIONAL rule for professional_id                       │
//! │  5. active GENERAL rule                                                │
//! │  6. CompanySettings.default_commission_rate                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! When several rules compete inside one tier, the oldest (`created_at`)
//! wins and ties go to the lowest id. Tiers that need an id the caller did
//! not supply are skipped.
//!
//! Two ways in:
//! - [`resolve_rate`] filters a full rule slice in memory.
//! - [`RateCandidates`] is filled from independent repository point reads
//!   (one per tier) and then resolved.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Rate;
use crate::types::{CommissionRule, RuleType, Service};

/// Which tier of the cascade produced the commission rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CommissionSource {
    ServiceOverride,
    SpecificRule,
    ServiceRule,
    ProfessionalRule,
    GeneralRule,
    CompanyDefault,
}

/// A commission rate together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRate {
    pub rate: Rate,
    pub source: CommissionSource,
    /// Set when a commission rule won.
    pub rule_id: Option<String>,
}

impl ResolvedRate {
    /// The fallback tier.
    pub fn company_default(rate: Rate) -> Self {
        ResolvedRate {
            rate,
            source: CommissionSource::CompanyDefault,
            rule_id: None,
        }
    }

    fn from_rule(rule: &CommissionRule, source: CommissionSource) -> Self {
        ResolvedRate {
            rate: rule.commission_rate,
            source,
            rule_id: Some(rule.id.clone()),
        }
    }
}

/// The winner of each tier, as fetched by the caller.
///
/// ## Usage
/// ```rust
/// use salonpay_core::{CommissionSource, Rate, RateCandidates};
///
/// let candidates = RateCandidates {
///     service_override: Some(Rate::from_ppm(400_000)),
///     ..RateCandidates::default()
/// };
/// let resolved = candidates.resolve(Rate::from_ppm(500_000));
/// assert_eq!(resolved.source, CommissionSource::ServiceOverride);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateCandidates {
    pub service_override: Option<Rate>,
    pub specific_rule: Option<CommissionRule>,
    pub service_rule: Option<CommissionRule>,
    pub professional_rule: Option<CommissionRule>,
    pub general_rule: Option<CommissionRule>,
}

impl RateCandidates {
    /// Walks the cascade; `default_rate` terminates it.
    pub fn resolve(&self, default_rate: Rate) -> ResolvedRate {
        if let Some(rate) = self.service_override {
            return ResolvedRate {
                rate,
                source: CommissionSource::ServiceOverride,
                rule_id: None,
            };
        }

        let tiers = [
            (&self.specific_rule, CommissionSource::SpecificRule),
            (&self.service_rule, CommissionSource::ServiceRule),
            (&self.professional_rule, CommissionSource::ProfessionalRule),
            (&self.general_rule, CommissionSource::GeneralRule),
        ];

        tiers
            .into_iter()
            .find_map(|(rule, source)| {
                rule.as_ref()
                    .map(|rule| ResolvedRate::from_rule(rule, source))
            })
            .unwrap_or_else(|| ResolvedRate::company_default(default_rate))
    }
}

/// Picks the winning rule among candidates of the same tier.
pub fn first_by_precedence<'a, I>(rules: I) -> Option<&'a CommissionRule>
where
    I: IntoIterator<Item = &'a CommissionRule>,
{
    rules.into_iter().min_by(|a, b| a.precedence_key().cmp(&b.precedence_key()))
}

/// Resolves the commission rate against an in-memory rule set.
///
/// `service` is the looked-up service (if it exists). Inactive rules are
/// ignored.
///
/// ## Example
/// ```rust
/// use salonpay_core::{resolve_rate, CommissionSource, Rate};
///
/// let resolved = resolve_rate(None, &[], Some("svc-1"), None, Rate::from_ppm(500_000));
/// assert_eq!(resolved.source, CommissionSource::CompanyDefault);
/// assert_eq!(resolved.rate.ppm(), 500_000);
/// ```
pub fn resolve_rate(
    service: Option<&Service>,
    rules: &[CommissionRule],
    service_id: Option<&str>,
    professional_id: Option<&str>,
    default_rate: Rate,
) -> ResolvedRate {
    let active = || rules.iter().filter(|rule| rule.is_active);

    let specific_rule = match (service_id, professional_id) {
        (Some(sid), Some(pid)) => first_by_precedence(active().filter(|r| r.matches_pair(sid, pid))),
        _ => None,
    };

    let service_rule = service_id.and_then(|sid| {
        first_by_precedence(active().filter(|r| {
            r.rule_type == RuleType::Service && r.service_id.as_deref() == Some(sid)
        }))
    });

    let professional_rule = professional_id.and_then(|pid| {
        first_by_precedence(active().filter(|r| {
            r.rule_type == RuleType::Professional && r.professional_id.as_deref() == Some(pid)
        }))
    });

    let general_rule = first_by_precedence(
        active().filter(|r| r.rule_type == RuleType::General && r.is_unscoped()),
    );

    RateCandidates {
        service_override: service.and_then(|s| s.commission_rate),
        specific_rule: specific_rule.cloned(),
        service_rule: service_rule.cloned(),
        professional_rule: professional_rule.cloned(),
        general_rule: general_rule.cloned(),
    }
    .resolve(default_rate)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    const DEFAULT: Rate = Rate::from_ppm(500_000);

    fn rule(
        id: &str,
        rule_type: RuleType,
        service_id: Option<&str>,
        professional_id: Option<&str>,
        ppm: u32,
    ) -> CommissionRule {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        CommissionRule {
            id: id.to_string(),
            rule_type,
            service_id: service_id.map(str::to_string),
            professional_id: professional_id.map(str::to_string),
            commission_rate: Rate::from_ppm(ppm),
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }

    fn service(id: &str, commission_ppm: Option<u32>) -> Service {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Service {
            id: id.to_string(),
            name: "Corte".to_string(),
            price_cents: 8000,
            commission_rate: commission_ppm.map(Rate::from_ppm),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn all_tiers() -> Vec<CommissionRule> {
        vec![
            rule("g", RuleType::General, None, None, 100_000),
            rule("p", RuleType::Professional, None, Some("pro-1"), 200_000),
            rule("s", RuleType::Service, Some("svc-1"), None, 300_000),
            rule("sp", RuleType::Service, Some("svc-1"), Some("pro-1"), 400_000),
        ]
    }

    #[test]
    fn test_falls_back_to_company_default() {
        let resolved = resolve_rate(None, &[], Some("svc-1"), Some("pro-1"), DEFAULT);
        assert_eq!(resolved, ResolvedRate::company_default(DEFAULT));
    }

    #[test]
    fn test_service_override_beats_every_rule() {
        let svc = service("svc-1", Some(700_000));
        let resolved = resolve_rate(Some(&svc), &all_tiers(), Some("svc-1"), Some("pro-1"), DEFAULT);

        assert_eq!(resolved.source, CommissionSource::ServiceOverride);
        assert_eq!(resolved.rate.ppm(), 700_000);
        assert_eq!(resolved.rule_id, None);
    }

    #[test]
    fn test_service_without_override_falls_through() {
        let svc = service("svc-1", None);
        let resolved = resolve_rate(Some(&svc), &all_tiers(), Some("svc-1"), Some("pro-1"), DEFAULT);
        assert_eq!(resolved.source, CommissionSource::SpecificRule);
    }

    #[test]
    fn test_cascade_order() {
        let rules = all_tiers();

        let resolved = resolve_rate(None, &rules, Some("svc-1"), Some("pro-1"), DEFAULT);
        assert_eq!(resolved.source, CommissionSource::SpecificRule);
        assert_eq!(resolved.rule_id.as_deref(), Some("sp"));

        let resolved = resolve_rate(None, &rules, Some("svc-1"), Some("pro-2"), DEFAULT);
        assert_eq!(resolved.source, CommissionSource::ServiceRule);
        assert_eq!(resolved.rate.ppm(), 300_000);

        let resolved = resolve_rate(None, &rules, Some("svc-9"), Some("pro-1"), DEFAULT);
        assert_eq!(resolved.source, CommissionSource::ProfessionalRule);
        assert_eq!(resolved.rate.ppm(), 200_000);

        let resolved = resolve_rate(None, &rules, None, None, DEFAULT);
        assert_eq!(resolved.source, CommissionSource::GeneralRule);
        assert_eq!(resolved.rate.ppm(), 100_000);
    }

    #[test]
    fn test_specific_tier_ignores_rule_type() {
        // A GENERAL-tagged rule pinned to both ids still wins tier 2
        let rules = vec![
            rule("s", RuleType::Service, Some("svc-1"), None, 300_000),
            rule("odd", RuleType::General, Some("svc-1"), Some("pro-1"), 450_000),
        ];

        let resolved = resolve_rate(None, &rules, Some("svc-1"), Some("pro-1"), DEFAULT);
        assert_eq!(resolved.source, CommissionSource::SpecificRule);
        assert_eq!(resolved.rule_id.as_deref(), Some("odd"));
    }

    #[test]
    fn test_pinned_general_rule_is_not_a_global_fallback() {
        let rules = vec![rule("pinned", RuleType::General, Some("svc-1"), Some("pro-1"), 650_000)];

        let resolved = resolve_rate(None, &rules, Some("svc-2"), Some("pro-2"), DEFAULT);
        assert_eq!(resolved.source, CommissionSource::CompanyDefault);
        assert_eq!(resolved.rate, DEFAULT);
        assert_eq!(resolved.rule_id, None);

        let resolved = resolve_rate(None, &rules, None, None, DEFAULT);
        assert_eq!(resolved.source, CommissionSource::CompanyDefault);

        // Its own pair still gets it through tier 2
        let resolved = resolve_rate(None, &rules, Some("svc-1"), Some("pro-1"), DEFAULT);
        assert_eq!(resolved.source, CommissionSource::SpecificRule);
        assert_eq!(resolved.rule_id.as_deref(), Some("pinned"));
    }

    #[test]
    fn test_specific_rule_requires_both_ids() {
        let rules = vec![rule("sp", RuleType::Service, Some("svc-1"), Some("pro-1"), 400_000)];

        // Without a professional the pinned rule still counts as a SERVICE rule
        let resolved = resolve_rate(None, &rules, Some("svc-1"), None, DEFAULT);
        assert_eq!(resolved.source, CommissionSource::ServiceRule);
        assert_eq!(resolved.rule_id.as_deref(), Some("sp"));
    }

    #[test]
    fn test_inactive_rules_are_ignored() {
        let mut rules = all_tiers();
        for r in rules.iter_mut() {
            r.is_active = false;
        }

        let resolved = resolve_rate(None, &rules, Some("svc-1"), Some("pro-1"), DEFAULT);
        assert_eq!(resolved.source, CommissionSource::CompanyDefault);
    }

    #[test]
    fn test_multiple_general_rules_pick_oldest_then_lowest_id() {
        let mut newer = rule("a-newer", RuleType::General, None, None, 150_000);
        newer.created_at += Duration::days(1);
        let older_b = rule("b-older", RuleType::General, None, None, 250_000);
        let older_c = rule("c-older", RuleType::General, None, None, 350_000);

        let rules = vec![older_c, newer, older_b];
        let resolved = resolve_rate(None, &rules, None, None, DEFAULT);

        assert_eq!(resolved.rule_id.as_deref(), Some("b-older"));
        assert_eq!(resolved.rate.ppm(), 250_000);
    }

    #[test]
    fn test_candidates_resolve_matches_slice_resolver() {
        let rules = all_tiers();
        let candidates = RateCandidates {
            service_override: None,
            specific_rule: None,
            service_rule: Some(rules[2].clone()),
            professional_rule: Some(rules[1].clone()),
            general_rule: Some(rules[0].clone()),
        };

        let from_candidates = candidates.resolve(DEFAULT);
        let from_slice = resolve_rate(None, &rules, Some("svc-1"), Some("pro-9"), DEFAULT);
        assert_eq!(from_candidates, from_slice);
    }
}
