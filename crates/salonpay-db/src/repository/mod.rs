//! # Repository Module
//!
//! SQLite implementations of the split engine's collaborator traits, plus
//! the administrative writes the engine itself never performs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SplitEngine                                                            │
//! │       │ trait calls (EngineResult)                                      │
//! │       ▼                                                                 │
//! │  SqliteSettingsRepository        get_singleton / create / update       │
//! │                                  get_or_create_default / seed          │
//! │  SqliteCommissionRuleRepository  find_active                           │
//! │                                  insert / update / deactivate          │
//! │                                  get_by_id / list_all                  │
//! │  SqliteServiceRepository         get_by_id                             │
//! │                                  insert / set_commission_rate          │
//! │       │ SQL (DbResult)                                                  │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read into `*Row` records and converted to domain types; a stored
//! value that fails domain validation surfaces as [`DbError::Domain`].
//!
//! [`DbError::Domain`]: crate::DbError::Domain

use chrono::{DateTime, SecondsFormat, Utc};

pub mod commission_rule;
pub mod service;
pub mod settings;

/// Fixed-width RFC 3339 so text order matches time order.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(timestamp(whole), "2024-05-01T12:00:00.000000Z");
        assert!(timestamp(whole) < timestamp(whole + chrono::Duration::microseconds(1)));
    }
}
