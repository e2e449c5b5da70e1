//! In-process implementation of every collaborator trait.
//!
//! Used by tests and by callers that keep their catalog in memory. The
//! settings slot sits behind a mutex so concurrent first calls create the
//! record exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use salonpay_core::{CommissionRule, CompanySettings, Service};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::repository::{
    CommissionRuleRepository, RuleFilter, ServiceRepository, SettingsRepository,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    settings: Mutex<Option<CompanySettings>>,
    rules: RwLock<Vec<CommissionRule>>,
    services: RwLock<HashMap<String, Service>>,
    settings_creations: AtomicUsize,
}

impl InMemoryStore {
    /// Empty store; settings are created on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with settings already present.
    pub fn with_settings(settings: CompanySettings) -> Self {
        InMemoryStore {
            settings: Mutex::new(Some(settings)),
            ..Self::default()
        }
    }

    pub async fn insert_rule(&self, rule: CommissionRule) {
        self.rules.write().await.push(rule);
    }

    pub async fn insert_service(&self, service: Service) {
        self.services.write().await.insert(service.id.clone(), service);
    }

    /// How many times the settings record has been created.
    pub fn settings_creations(&self) -> usize {
        self.settings_creations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsRepository for InMemoryStore {
    async fn get_singleton(&self) -> EngineResult<Option<CompanySettings>> {
        Ok(self.settings.lock().await.clone())
    }

    async fn create(&self, defaults: &CompanySettings) -> EngineResult<CompanySettings> {
        let mut slot = self.settings.lock().await;
        if slot.is_some() {
            return Err(EngineError::repository("company settings already exist"));
        }
        *slot = Some(defaults.clone());
        self.settings_creations.fetch_add(1, Ordering::SeqCst);
        Ok(defaults.clone())
    }

    async fn update(&self, settings: &CompanySettings) -> EngineResult<CompanySettings> {
        let mut slot = self.settings.lock().await;
        if slot.is_none() {
            self.settings_creations.fetch_add(1, Ordering::SeqCst);
        }
        *slot = Some(settings.clone());
        Ok(settings.clone())
    }

    async fn get_or_create_default(&self) -> EngineResult<CompanySettings> {
        let mut slot = self.settings.lock().await;
        if let Some(settings) = slot.as_ref() {
            return Ok(settings.clone());
        }

        let defaults = CompanySettings::default();
        *slot = Some(defaults.clone());
        self.settings_creations.fetch_add(1, Ordering::SeqCst);
        debug!(regime = %defaults.tax_regime, "Created default company settings");
        Ok(defaults)
    }
}

#[async_trait]
impl CommissionRuleRepository for InMemoryStore {
    async fn find_active(&self, filter: &RuleFilter) -> EngineResult<Vec<CommissionRule>> {
        let rules = self.rules.read().await;
        let mut matched: Vec<CommissionRule> =
            rules.iter().filter(|r| filter.matches(r)).cloned().collect();
        matched.sort_by(|a, b| a.precedence_key().cmp(&b.precedence_key()));
        Ok(matched)
    }
}

#[async_trait]
impl ServiceRepository for InMemoryStore {
    async fn get_by_id(&self, service_id: &str) -> EngineResult<Option<Service>> {
        Ok(self.services.read().await.get(service_id).cloned())
    }
}
