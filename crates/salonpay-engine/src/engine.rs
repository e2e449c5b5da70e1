//! # Split Engine
//!
//! The single entry point billing and checkout callers use.
//!
//! ## Concurrency
//! The engine holds no mutable state; one instance is shared by every
//! request. The five commission reads of a calculation are independent and
//! run concurrently; the arithmetic after them is strictly sequential.

use std::sync::Arc;

use salonpay_core::commission::first_by_precedence;
use salonpay_core::validation::validate_split_request;
use salonpay_core::{
    calculate_split, CommissionRule, CompanySettings, Rate, RateCandidates, ResolvedRate,
    SplitRequest, SplitResult, SplitSummary,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineResult;
use crate::repository::{
    CommissionRuleRepository, RuleFilter, ServiceRepository, SettingsRepository,
};

/// Splits of every service in one checkout, plus their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSplit {
    pub splits: Vec<SplitResult>,
    pub summary: SplitSummary,
}

/// Orchestrates settings, commission resolution and the split calculation.
///
/// ## Usage
/// ```rust,ignore
/// let engine = db.split_engine();
/// let result = engine
///     .calculate_service_split(&SplitRequest::new(10_000).with_service(&service_id))
///     .await?;
/// ```
#[derive(Clone)]
pub struct SplitEngine {
    settings: Arc<dyn SettingsRepository>,
    rules: Arc<dyn CommissionRuleRepository>,
    services: Arc<dyn ServiceRepository>,
}

impl SplitEngine {
    /// Creates an engine over three collaborator stores.
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        rules: Arc<dyn CommissionRuleRepository>,
        services: Arc<dyn ServiceRepository>,
    ) -> Self {
        SplitEngine {
            settings,
            rules,
            services,
        }
    }

    /// Creates an engine over one store that implements all three traits.
    pub fn from_store<T>(store: Arc<T>) -> Self
    where
        T: SettingsRepository + CommissionRuleRepository + ServiceRepository + 'static,
    {
        SplitEngine {
            settings: store.clone(),
            rules: store.clone(),
            services: store,
        }
    }

    /// Computes the split of one rendered service.
    ///
    /// ## Steps
    /// 1. Reject a non-positive gross or negative product cost (no lookups)
    /// 2. Load the settings, creating the default row on first use
    /// 3. Resolve the commission rate
    /// 4. Run the pure calculation
    ///
    /// ## Errors
    /// - `Core(InvalidAmount)` for bad amounts
    /// - `Core(UnsupportedTaxRegime)` if the stored regime is unknown
    /// - `Repository(..)` for any store failure, unchanged
    pub async fn calculate_service_split(&self, request: &SplitRequest) -> EngineResult<SplitResult> {
        validate_split_request(request)?;

        let settings = self.settings.get_or_create_default().await?;
        self.calculate_with_settings(request, &settings).await
    }

    /// Same as [`calculate_service_split`](Self::calculate_service_split) with
    /// settings the caller already loaded.
    pub async fn calculate_with_settings(
        &self,
        request: &SplitRequest,
        settings: &CompanySettings,
    ) -> EngineResult<SplitResult> {
        validate_split_request(request)?;

        let commission = self
            .resolve_rate(
                request.service_key(),
                request.professional_key(),
                settings.default_commission_rate,
            )
            .await?;

        let result = calculate_split(request, settings, &commission)?;

        debug!(
            gross_cents = result.gross_amount_cents,
            salon_net_cents = result.salon_net_amount_cents,
            professional_net_cents = result.professional_net_amount_cents,
            source = ?commission.source,
            "Split calculated"
        );

        Ok(result)
    }

    /// Splits every service of a checkout against one settings read.
    ///
    /// All requests are validated before anything is read.
    pub async fn calculate_checkout(&self, requests: &[SplitRequest]) -> EngineResult<CheckoutSplit> {
        for request in requests {
            validate_split_request(request)?;
        }

        let settings = self.settings.get_or_create_default().await?;

        let mut splits = Vec::with_capacity(requests.len());
        for request in requests {
            splits.push(self.calculate_with_settings(request, &settings).await?);
        }

        let summary = SplitSummary::from_results(&splits)?;
        Ok(CheckoutSplit { splits, summary })
    }

    /// Resolves the commission rate for a service/professional pair.
    pub async fn resolve_rate(
        &self,
        service_id: Option<&str>,
        professional_id: Option<&str>,
        default_rate: Rate,
    ) -> EngineResult<ResolvedRate> {
        let candidates = self.fetch_candidates(service_id, professional_id).await?;
        let resolved = candidates.resolve(default_rate);

        debug!(
            service_id = ?service_id,
            professional_id = ?professional_id,
            source = ?resolved.source,
            rate_ppm = resolved.rate.ppm(),
            "Commission rate resolved"
        );

        Ok(resolved)
    }

    /// Reads the winner of every cascade tier concurrently.
    async fn fetch_candidates(
        &self,
        service_id: Option<&str>,
        professional_id: Option<&str>,
    ) -> EngineResult<RateCandidates> {
        let service = async {
            match service_id {
                Some(id) => self.services.get_by_id(id).await,
                None => Ok(None),
            }
        };

        let specific_rule = async {
            match (service_id, professional_id) {
                (Some(sid), Some(pid)) => self.first_active(RuleFilter::specific(sid, pid)).await,
                _ => Ok(None),
            }
        };

        let service_rule = async {
            match service_id {
                Some(id) => self.first_active(RuleFilter::service(id)).await,
                None => Ok(None),
            }
        };

        let professional_rule = async {
            match professional_id {
                Some(id) => self.first_active(RuleFilter::professional(id)).await,
                None => Ok(None),
            }
        };

        let general_rule = self.first_active(RuleFilter::general());

        let (service, specific_rule, service_rule, professional_rule, general_rule) = tokio::try_join!(
            service,
            specific_rule,
            service_rule,
            professional_rule,
            general_rule
        )?;

        Ok(RateCandidates {
            service_override: service.and_then(|s| s.commission_rate),
            specific_rule,
            service_rule,
            professional_rule,
            general_rule,
        })
    }

    async fn first_active(&self, filter: RuleFilter) -> EngineResult<Option<CommissionRule>> {
        let rules = self.rules.find_active(&filter).await?;
        Ok(first_by_precedence(&rules).cloned())
    }
}

impl std::fmt::Debug for SplitEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitEngine").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
