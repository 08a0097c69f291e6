use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Result, StoreError};

pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// NewsData.io free tier: 200 requests per day.
pub const NEWS_API_LIMIT: u32 = 200;
/// SMMRY free tier: 100 requests per day.
pub const SUMMARY_API_LIMIT: u32 = 100;

/// Call budget for one tracked API identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ApiBudget {
    pub limit: u32,
    pub window_ms: u64,
}

/// Per-identity budgets. Budgets are configuration, not business logic:
/// any named identity may be registered with its own limit and window.
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    budgets: HashMap<String, ApiBudget>,
}

#[derive(Deserialize)]
struct QuotaConfigFile {
    #[serde(default)]
    budgets: HashMap<String, ApiBudget>,
}

impl Default for QuotaConfig {
    /// The two identities this application meters out of the box.
    fn default() -> Self {
        let mut budgets = HashMap::new();
        budgets.insert(
            "news".to_string(),
            ApiBudget {
                limit: NEWS_API_LIMIT,
                window_ms: DAY_MS,
            },
        );
        budgets.insert(
            "summary".to_string(),
            ApiBudget {
                limit: SUMMARY_API_LIMIT,
                window_ms: DAY_MS,
            },
        );
        Self { budgets }
    }
}

impl QuotaConfig {
    /// An empty config with no identities registered.
    pub fn empty() -> Self {
        Self {
            budgets: HashMap::new(),
        }
    }

    /// Parse TOML budget overrides and merge them over the defaults.
    ///
    /// ```toml
    /// [budgets.news]
    /// limit = 500
    /// window_ms = 86400000
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: QuotaConfigFile =
            toml::from_str(content).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let mut config = Self::default();
        config.budgets.extend(file.budgets);
        Ok(config)
    }

    pub fn register(&mut self, identity: &str, budget: ApiBudget) {
        self.budgets.insert(identity.to_string(), budget);
    }

    pub fn budget(&self, identity: &str) -> Option<&ApiBudget> {
        self.budgets.get(identity)
    }

    /// Configured identity names, sorted for stable output.
    pub fn identities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.budgets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budgets() {
        let config = QuotaConfig::default();
        assert_eq!(
            config.budget("news"),
            Some(&ApiBudget {
                limit: 200,
                window_ms: DAY_MS
            })
        );
        assert_eq!(
            config.budget("summary"),
            Some(&ApiBudget {
                limit: 100,
                window_ms: DAY_MS
            })
        );
        assert!(config.budget("unknown").is_none());
    }

    #[test]
    fn test_identities_sorted() {
        assert_eq!(QuotaConfig::default().identities(), vec!["news", "summary"]);
    }

    #[test]
    fn test_toml_overrides_merge_over_defaults() {
        let config = QuotaConfig::from_toml_str(
            r#"
            [budgets.news]
            limit = 500
            window_ms = 3600000

            [budgets.archive]
            limit = 50
            window_ms = 86400000
            "#,
        )
        .unwrap();

        assert_eq!(config.budget("news").unwrap().limit, 500);
        assert_eq!(config.budget("news").unwrap().window_ms, 3_600_000);
        // Untouched default survives
        assert_eq!(config.budget("summary").unwrap().limit, 100);
        // New identity registered
        assert_eq!(config.budget("archive").unwrap().limit, 50);
    }

    #[test]
    fn test_toml_empty_is_defaults() {
        let config = QuotaConfig::from_toml_str("").unwrap();
        assert_eq!(config.identities(), vec!["news", "summary"]);
    }

    #[test]
    fn test_toml_garbage_rejected() {
        assert!(QuotaConfig::from_toml_str("not [valid toml").is_err());
    }

    #[test]
    fn test_register_arbitrary_identity() {
        let mut config = QuotaConfig::empty();
        config.register(
            "weather",
            ApiBudget {
                limit: 10,
                window_ms: 1000,
            },
        );
        assert_eq!(config.budget("weather").unwrap().limit, 10);
    }
}
