//! # salonpay-engine: Split Orchestrator for SalonPay
//!
//! Runs a split calculation end to end: settings bootstrap, commission
//! candidate reads, then the pure calculation in `salonpay-core`.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SplitEngine::calculate_service_split(request)                          │
//! │       │                                                                 │
//! │       ├── validate amounts              (InvalidAmount, no lookups)    │
//! │       │                                                                 │
//! │       ├── SettingsRepository::get_or_create_default()                  │
//! │       │                                                                 │
//! │       ├── try_join! ┬─ ServiceRepository::get_by_id                    │
//! │       │             ├─ find_active(service + professional)             │
//! │       │             ├─ find_active(SERVICE)                            │
//! │       │             ├─ find_active(PROFESSIONAL)                       │
//! │       │             └─ find_active(GENERAL)                            │
//! │       │                                                                 │
//! │       └── salonpay_core::calculate_split(request, settings, rate)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`repository`] - Collaborator traits and [`RuleFilter`]
//! - [`engine`] - [`SplitEngine`]
//! - [`memory`] - [`InMemoryStore`], an implementation of every trait
//! - [`error`] - [`EngineError`]
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use salonpay_core::SplitRequest;
//! use salonpay_engine::{InMemoryStore, SplitEngine};
//!
//! # tokio_test_block_on(async {
//! let engine = SplitEngine::from_store(Arc::new(InMemoryStore::new()));
//! let result = engine
//!     .calculate_service_split(&SplitRequest::new(10_000))
//!     .await
//!     .unwrap();
//! assert_eq!(result.operational_costs.gateway_fee_cents, 299);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod memory;
pub mod repository;

pub use engine::{CheckoutSplit, SplitEngine};
pub use error::{EngineError, EngineResult};
pub use memory::InMemoryStore;
pub use repository::{CommissionRuleRepository, RuleFilter, ServiceRepository, SettingsRepository};
