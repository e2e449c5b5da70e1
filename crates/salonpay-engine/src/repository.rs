//! # Collaborator Traits
//!
//! The three stores the engine reads from. `salonpay-db` implements them on
//! SQLite; [`InMemoryStore`](crate::InMemoryStore) implements them on
//! in-process collections.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SettingsRepository        get_singleton / create / update             │
//! │                            get_or_create_default (bootstrap)           │
//! │  CommissionRuleRepository  find_active(RuleFilter)                     │
//! │  ServiceRepository         get_by_id                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use salonpay_core::{CommissionRule, CompanySettings, RuleType, Service};
use tracing::warn;

use crate::error::EngineResult;

// =============================================================================
// Settings
// =============================================================================

/// Access to the singleton [`CompanySettings`] record.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns the settings record, if it has been created.
    async fn get_singleton(&self) -> EngineResult<Option<CompanySettings>>;

    /// Creates the settings record. Fails if one already exists.
    async fn create(&self, defaults: &CompanySettings) -> EngineResult<CompanySettings>;

    /// Replaces the settings record (administrative).
    async fn update(&self, settings: &CompanySettings) -> EngineResult<CompanySettings>;

    /// Returns the settings record, creating it with the fixed defaults on
    /// first use.
    ///
    /// Two callers may both see "missing" and both try to create. The loser's
    /// `create` fails; it then re-reads and returns the winner's row. The
    /// original error is returned only if the re-read still finds nothing.
    async fn get_or_create_default(&self) -> EngineResult<CompanySettings> {
        if let Some(settings) = self.get_singleton().await? {
            return Ok(settings);
        }

        match self.create(&CompanySettings::default()).await {
            Ok(created) => Ok(created),
            Err(err) => match self.get_singleton().await? {
                Some(existing) => {
                    warn!(error = %err, "Settings created concurrently, using existing row");
                    Ok(existing)
                }
                None => Err(err),
            },
        }
    }
}

// =============================================================================
// Commission Rules
// =============================================================================

/// Filter for [`CommissionRuleRepository::find_active`].
///
/// `None` leaves a column unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub rule_type: Option<RuleType>,
    pub service_id: Option<String>,
    pub professional_id: Option<String>,
    /// Only rules whose `service_id` and `professional_id` are both unset.
    pub unscoped: bool,
}

impl RuleFilter {
    /// Rules pinned to a service and a professional, any `rule_type`.
    pub fn specific(service_id: &str, professional_id: &str) -> Self {
        RuleFilter {
            rule_type: None,
            service_id: Some(service_id.to_string()),
            professional_id: Some(professional_id.to_string()),
            unscoped: false,
        }
    }

    /// `SERVICE` rules for one service.
    pub fn service(service_id: &str) -> Self {
        RuleFilter {
            rule_type: Some(RuleType::Service),
            service_id: Some(service_id.to_string()),
            professional_id: None,
            unscoped: false,
        }
    }

    /// `PROFESSIONAL` rules for one professional.
    pub fn professional(professional_id: &str) -> Self {
        RuleFilter {
            rule_type: Some(RuleType::Professional),
            service_id: None,
            professional_id: Some(professional_id.to_string()),
            unscoped: false,
        }
    }

    /// `GENERAL` rules scoped to neither a service nor a professional.
    pub fn general() -> Self {
        RuleFilter {
            rule_type: Some(RuleType::General),
            service_id: None,
            professional_id: None,
            unscoped: true,
        }
    }

    /// True if `rule` is active and satisfies every constrained column.
    pub fn matches(&self, rule: &CommissionRule) -> bool {
        rule.is_active
            && self.rule_type.map_or(true, |t| rule.rule_type == t)
            && self
                .service_id
                .as_deref()
                .map_or(true, |id| rule.service_id.as_deref() == Some(id))
            && self
                .professional_id
                .as_deref()
                .map_or(true, |id| rule.professional_id.as_deref() == Some(id))
            && (!self.unscoped || rule.is_unscoped())
    }
}

/// Read access to commission rules.
#[async_trait]
pub trait CommissionRuleRepository: Send + Sync {
    /// Active rules matching `filter`, oldest first (`created_at`, then `id`).
    async fn find_active(&self, filter: &RuleFilter) -> EngineResult<Vec<CommissionRule>>;
}

// =============================================================================
// Services
// =============================================================================

/// Read access to services.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn get_by_id(&self, service_id: &str) -> EngineResult<Option<Service>>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use salonpay_core::Rate;

    fn rule(rule_type: RuleType, service_id: Option<&str>, professional_id: Option<&str>) -> CommissionRule {
        let now = Utc::now();
        CommissionRule {
            id: "r".to_string(),
            rule_type,
            service_id: service_id.map(str::to_string),
            professional_id: professional_id.map(str::to_string),
            commission_rate: Rate::from_ppm(400_000),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_filter_specific_ignores_type() {
        let filter = RuleFilter::specific("svc", "pro");
        assert!(filter.matches(&rule(RuleType::General, Some("svc"), Some("pro"))));
        assert!(!filter.matches(&rule(RuleType::Service, Some("svc"), None)));
    }

    #[test]
    fn test_filter_service_leaves_professional_open() {
        let filter = RuleFilter::service("svc");
        assert!(filter.matches(&rule(RuleType::Service, Some("svc"), None)));
        assert!(filter.matches(&rule(RuleType::Service, Some("svc"), Some("pro"))));
        assert!(!filter.matches(&rule(RuleType::Professional, Some("svc"), Some("pro"))));
    }

    #[test]
    fn test_filter_general_requires_no_ids() {
        let filter = RuleFilter::general();
        assert!(filter.matches(&rule(RuleType::General, None, None)));
        assert!(filter.matches(&rule(RuleType::General, Some("  "), None)));
        assert!(!filter.matches(&rule(RuleType::General, Some("svc-1"), Some("pro-1"))));
        assert!(!filter.matches(&rule(RuleType::General, None, Some("pro-1"))));
    }

    #[test]
    fn test_filter_skips_inactive() {
        let mut inactive = rule(RuleType::General, None, None);
        inactive.is_active = false;
        assert!(!RuleFilter::general().matches(&inactive));
    }
}
