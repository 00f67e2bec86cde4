#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;

use crate::utils::error::ConfigError;
use crate::utils::validation::{require_all, validate_url, Validate};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

pub const API_URL: &str = "API_URL";
pub const S3_BUCKET: &str = "S3_BUCKET";
pub const S3_KEY: &str = "S3_KEY";
pub const SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";

pub const REQUIRED_VARS: [&str; 4] = [API_URL, S3_BUCKET, S3_KEY, SNS_TOPIC_ARN];

/// Raw values of the required keys, captured once at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    values: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        let values = REQUIRED_VARS
            .iter()
            .filter_map(|key| env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self { values }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value for `key`, treating an empty string as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn topic_arn(&self) -> Option<&str> {
        self.get(SNS_TOPIC_ARN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub api_url: String,
    pub s3_bucket: String,
    pub s3_key: String,
    pub sns_topic_arn: String,
}

impl PipelineConfig {
    pub fn resolve(snapshot: &EnvSnapshot) -> Result<Self, ConfigError> {
        let resolved = require_all(&REQUIRED_VARS, |key| snapshot.get(key).map(str::to_string))?;
        let mut values: HashMap<&str, String> = resolved.into_iter().collect();
        let mut take = |key: &str| values.remove(key).unwrap_or_default();

        let config = Self {
            api_url: take(API_URL),
            s3_bucket: take(S3_BUCKET),
            s3_key: take(S3_KEY),
            sns_topic_arn: take(SNS_TOPIC_ARN),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(&EnvSnapshot::from_process())
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_url(API_URL, &self.api_url)?;
        tracing::debug!("✅ Pipeline configuration validation passed");
        Ok(())
    }
}

/// Fetch retry policy: exponential backoff, transient 5xx only.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_multiplier: u32,
    pub retry_statuses: Vec<u16>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            backoff_multiplier: 2,
            retry_statuses: vec![500, 502, 503, 504],
        }
    }
}

impl FetchPolicy {
    /// Wait before retry number `retry` (1-based): base, base*m, base*m^2, ...
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .saturating_pow(retry.saturating_sub(1));
        self.backoff_base.saturating_mul(factor)
    }

    pub fn is_transient(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }
}

/// Upload retry policy: fixed delay between attempts.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub content_type: String,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
            content_type: "text/plain".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterPolicy {
    pub field: String,
    pub threshold: f64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            field: "price".to_string(),
            threshold: 50.0,
        }
    }
}

/// Policy constants for one run.
#[derive(Debug, Clone, Default)]
pub struct PipelinePolicy {
    pub fetch: FetchPolicy,
    pub upload: UploadPolicy,
    pub filter: FilterPolicy,
}
