//! Lending policy configuration.
//!
//! Values come from the environment (`LIBRIS_*` variables) or from any serde
//! source a host application already uses for its settings.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use libris_core::{DomainError, DomainResult};

pub const LOAN_PERIOD_DAYS_VAR: &str = "LIBRIS_LOAN_PERIOD_DAYS";
pub const MAX_LOANS_VAR: &str = "LIBRIS_MAX_LOANS_PER_BORROWER";

const MAX_LOAN_PERIOD_DAYS: i64 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingConfig {
    /// Days between lending a copy and its due date.
    pub loan_period_days: i64,
    /// Copies one borrower may hold at once.
    pub max_loans_per_borrower: usize,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            max_loans_per_borrower: 5,
        }
    }
}

impl LendingConfig {
    /// `None` when `loan_period_days` does not fit a [`Duration`].
    pub fn loan_period(&self) -> Option<Duration> {
        Duration::try_days(self.loan_period_days)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !(1..=MAX_LOAN_PERIOD_DAYS).contains(&self.loan_period_days) {
            return Err(DomainError::validation(format!(
                "loan_period_days must be between 1 and {MAX_LOAN_PERIOD_DAYS} (got {})",
                self.loan_period_days
            )));
        }
        if self.max_loans_per_borrower == 0 {
            return Err(DomainError::validation(
                "max_loans_per_borrower must be at least 1",
            ));
        }
        Ok(())
    }

    /// Read the policy from process environment variables.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the policy through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(LOAN_PERIOD_DAYS_VAR) {
            config.loan_period_days = parse_var(LOAN_PERIOD_DAYS_VAR, &raw)?;
        } else {
            tracing::debug!(
                var = LOAN_PERIOD_DAYS_VAR,
                default = config.loan_period_days,
                "using default loan period"
            );
        }

        if let Some(raw) = lookup(MAX_LOANS_VAR) {
            config.max_loans_per_borrower = parse_var(MAX_LOANS_VAR, &raw)?;
        } else {
            tracing::debug!(
                var = MAX_LOANS_VAR,
                default = config.max_loans_per_borrower,
                "using default holding limit"
            );
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> DomainResult<T>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| DomainError::validation(format!("{key}={raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = LendingConfig::default();
        assert_eq!(config.loan_period_days, 14);
        assert_eq!(config.max_loans_per_borrower, 5);
        assert_eq!(config.loan_period(), Some(Duration::days(14)));
        config.validate().unwrap();
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let config = LendingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LendingConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = LendingConfig::from_lookup(lookup(&[
            (LOAN_PERIOD_DAYS_VAR, " 21 "),
            (MAX_LOANS_VAR, "2"),
        ]))
        .unwrap();
        assert_eq!(config.loan_period_days, 21);
        assert_eq!(config.max_loans_per_borrower, 2);
    }

    #[test]
    fn unparsable_value_is_rejected() {
        let err = LendingConfig::from_lookup(lookup(&[(MAX_LOANS_VAR, "many")])).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains(MAX_LOANS_VAR)),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(LendingConfig::from_lookup(lookup(&[(LOAN_PERIOD_DAYS_VAR, "0")])).is_err());
        assert!(LendingConfig::from_lookup(lookup(&[(LOAN_PERIOD_DAYS_VAR, "99999")])).is_err());
        assert!(LendingConfig::from_lookup(lookup(&[(MAX_LOANS_VAR, "0")])).is_err());
    }

    #[test]
    fn loan_period_outside_duration_range_is_none() {
        let config = LendingConfig {
            loan_period_days: i64::MAX,
            ..LendingConfig::default()
        };
        assert_eq!(config.loan_period(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn max_loans_fallback_keeps_default_when_only_period_is_set() {
        let config = LendingConfig::from_lookup(lookup(&[(LOAN_PERIOD_DAYS_VAR, "7")])).unwrap();
        assert_eq!(config.loan_period_days, 7);
        assert_eq!(config.max_loans_per_borrower, 5);
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let config: LendingConfig = serde_json::from_str(r#"{"loan_period_days": 7}"#).unwrap();
        assert_eq!(config.loan_period_days, 7);
        assert_eq!(config.max_loans_per_borrower, 5);
    }
}
