//! Server configuration from the environment

use measura::{SyncOptions, DEFAULT_CATEGORY};
use measura_core::{DEFAULT_MAX_DECIMALS, MAX_DECIMALS};
use tracing::warn;

pub const ENV_DEFAULT_CATEGORY: &str = "MEASURA_DEFAULT_CATEGORY";
pub const ENV_MAX_DECIMALS: &str = "MEASURA_MAX_DECIMALS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub default_category: String,
    pub max_decimals: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or invalid values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_category = lookup(ENV_DEFAULT_CATEGORY)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let max_decimals = match lookup(ENV_MAX_DECIMALS) {
            None => DEFAULT_MAX_DECIMALS,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n <= MAX_DECIMALS => n,
                _ => {
                    warn!(value = %raw, default = DEFAULT_MAX_DECIMALS,
                        "invalid {}, using default", ENV_MAX_DECIMALS);
                    DEFAULT_MAX_DECIMALS
                }
            },
        };

        Config { default_category, max_decimals }
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions::new()
            .with_default_category(self.default_category.clone())
            .with_max_decimals(self.max_decimals)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
