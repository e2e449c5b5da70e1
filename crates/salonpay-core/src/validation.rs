//! # Validation Module
//!
//! Input validation for split requests and administrative writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization                                              │
//! │  └── Rate fractions outside [0,1] never become a `Rate`                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Split requests: positive gross, non-negative product cost         │
//! │  └── Commission rules: ids required by their rule_type                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on rates and rule types                         │
//! │  └── Singleton settings row (CHECK id = 1)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CommissionRule, RuleType, Service, SplitRequest};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Split Request
// =============================================================================

/// Validates the gross amount of a split.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## Example
/// ```rust
/// use salonpay_core::validation::validate_gross_amount;
///
/// assert!(validate_gross_amount(1).is_ok());
/// assert!(validate_gross_amount(0).is_err());
/// assert!(validate_gross_amount(-100).is_err());
/// ```
pub fn validate_gross_amount(cents: i64) -> CoreResult<()> {
    if cents <= 0 {
        return Err(CoreError::invalid_amount("gross_amount_cents", cents));
    }
    Ok(())
}

/// Validates the product cost of a split. Zero is allowed.
pub fn validate_product_cost(cents: i64) -> CoreResult<()> {
    if cents < 0 {
        return Err(CoreError::invalid_amount("product_cost_cents", cents));
    }
    Ok(())
}

/// Validates every monetary input of a split request.
///
/// Identifiers are not validated: they only narrow which commission tiers
/// can match.
pub fn validate_split_request(request: &SplitRequest) -> CoreResult<()> {
    validate_gross_amount(request.gross_amount_cents)?;
    validate_product_cost(request.product_cost_cents)?;
    Ok(())
}

// =============================================================================
// Commission Rule
// =============================================================================

/// Validates the shape of a commission rule before it is stored.
///
/// ## Rules
/// - `id` must be a UUID
/// - `SERVICE` rules need a `service_id`
/// - `PROFESSIONAL` rules need a `professional_id`
/// - `GENERAL` rules carry no single id; a rule with both ids is a
///   service+professional rule and is accepted with any type
pub fn validate_commission_rule(rule: &CommissionRule) -> CoreResult<()> {
    validate_uuid(&rule.id)?;

    let has_service = has_id(rule.service_id.as_deref());
    let has_professional = has_id(rule.professional_id.as_deref());

    let reason = match rule.rule_type {
        RuleType::Service if !has_service => Some("SERVICE rule requires service_id"),
        RuleType::Professional if !has_professional => {
            Some("PROFESSIONAL rule requires professional_id")
        }
        RuleType::General if has_service != has_professional => {
            Some("GENERAL rule must carry both ids or neither")
        }
        _ => None,
    };

    match reason {
        Some(reason) => Err(CoreError::InvalidCommissionRule {
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn has_id(id: Option<&str>) -> bool {
    id.is_some_and(|id| !id.trim().is_empty())
}

// =============================================================================
// Service
// =============================================================================

/// Validates a service before it is stored.
pub fn validate_service(service: &Service) -> CoreResult<()> {
    validate_uuid(&service.id)?;

    if service.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        }
        .into());
    }

    if service.price_cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price_cents".to_string(),
        }
        .into());
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use salonpay_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Rate;
    use chrono::Utc;

    fn rule(rule_type: RuleType, service_id: Option<&str>, professional_id: Option<&str>) -> CommissionRule {
        let now = Utc::now();
        CommissionRule {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
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
    fn test_validate_service() {
        let service = Service::new("Corte feminino", 8_000);
        assert!(validate_service(&service).is_ok());

        let mut unnamed = service.clone();
        unnamed.name = "  ".to_string();
        assert!(matches!(
            validate_service(&unnamed),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let mut negative = service;
        negative.price_cents = -1;
        assert!(validate_service(&negative).is_err());
    }

    #[test]
    fn test_new_rule_passes_validation() {
        let rule = CommissionRule::new(RuleType::Service, Some("svc".into()), None, Rate::from_ppm(1));
        assert!(validate_commission_rule(&rule).is_ok());
        assert!(rule.is_active);
    }

    #[test]
    fn test_validate_gross_amount() {
        assert!(validate_gross_amount(1).is_ok());
        assert!(validate_gross_amount(10_000).is_ok());

        let err = validate_gross_amount(0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { value: 0, .. }));
        assert!(validate_gross_amount(-1).is_err());
    }

    #[test]
    fn test_validate_product_cost() {
        assert!(validate_product_cost(0).is_ok());
        assert!(validate_product_cost(1500).is_ok());
        assert!(validate_product_cost(-1).is_err());
    }

    #[test]
    fn test_validate_split_request() {
        assert!(validate_split_request(&SplitRequest::new(100)).is_ok());
        assert!(validate_split_request(&SplitRequest::new(100).with_product_cost(-5)).is_err());
    }

    #[test]
    fn test_validate_commission_rule_shapes() {
        assert!(validate_commission_rule(&rule(RuleType::General, None, None)).is_ok());
        assert!(validate_commission_rule(&rule(RuleType::Service, Some("svc"), None)).is_ok());
        assert!(validate_commission_rule(&rule(RuleType::Professional, None, Some("pro"))).is_ok());
        assert!(validate_commission_rule(&rule(RuleType::General, Some("svc"), Some("pro"))).is_ok());

        assert!(validate_commission_rule(&rule(RuleType::Service, None, Some("pro"))).is_err());
        assert!(validate_commission_rule(&rule(RuleType::Professional, Some("svc"), None)).is_err());
        assert!(validate_commission_rule(&rule(RuleType::General, Some("svc"), None)).is_err());
        assert!(validate_commission_rule(&rule(RuleType::Service, Some("  "), None)).is_err());
    }

    #[test]
    fn test_validate_commission_rule_id() {
        let mut bad = rule(RuleType::General, None, None);
        bad.id = "rule-1".to_string();
        assert!(matches!(
            validate_commission_rule(&bad),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
