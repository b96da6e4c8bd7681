//! Configuration management

use serde::{Deserialize, Serialize};
use tracing::info;

/// Default monthly character count limit
pub const DEFAULT_CHARACTER_COUNT_LIMIT: f64 = 490000.0;

/// Default metric holding per-request character counts
pub const DEFAULT_METRIC_NAME: &str = "CharacterCount";

/// Configuration for the proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Invocations are refused once monthly usage reaches this value
    pub character_count_limit: f64,
    /// CloudWatch metric summed to obtain the usage
    pub metric_name: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            character_count_limit: DEFAULT_CHARACTER_COUNT_LIMIT,
            metric_name: DEFAULT_METRIC_NAME.to_string(),
        }
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let character_count_limit = match lookup("CHARACTER_COUNT_SUM_LIMIT") {
            Some(raw) => raw.trim().parse::<f64>().map_err(|e| {
                anyhow::anyhow!("CHARACTER_COUNT_SUM_LIMIT must be a number, got {:?}: {}", raw, e)
            })?,
            None => DEFAULT_CHARACTER_COUNT_LIMIT,
        };

        let metric_name = lookup("CHARACTER_COUNT_METRIC_NAME")
            .unwrap_or_else(|| DEFAULT_METRIC_NAME.to_string());

        let config = Self {
            character_count_limit,
            metric_name,
        };
        config.validate()?;

        info!(
            "Loaded config: limit={}, metric={}",
            config.character_count_limit, config.metric_name
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.character_count_limit.is_finite() || self.character_count_limit < 0.0 {
            return Err(anyhow::anyhow!(
                "character_count_limit must be a non-negative number"
            ));
        }

        if self.metric_name.is_empty() {
            return Err(anyhow::anyhow!("metric_name is required"));
        }

        if self.metric_name.contains('"') {
            return Err(anyhow::anyhow!("metric_name must not contain '\"'"));
        }

        Ok(())
    }
}
