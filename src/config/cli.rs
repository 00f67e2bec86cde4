use crate::config::{EnvSnapshot, API_URL, S3_BUCKET, S3_KEY, SNS_TOPIC_ARN};
use crate::core::{NotificationChannel, ObjectStore};
use crate::utils::error::{NotifyError, StorageError};
use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;

/// Local runner. Each value falls back to the same-named environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "data-pipeline")]
#[command(about = "Fetch JSON from an API, filter it and store it as tab-separated text")]
pub struct CliConfig {
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "S3_BUCKET")]
    pub s3_bucket: Option<String>,

    #[arg(long, env = "S3_KEY")]
    pub s3_key: Option<String>,

    #[arg(long, env = "SNS_TOPIC_ARN")]
    pub sns_topic_arn: Option<String>,

    /// Directory standing in for object storage: objects land in <output-dir>/<bucket>/<key>
    #[arg(long, default_value = "./output")]
    pub output_dir: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn snapshot(&self) -> EnvSnapshot {
        let pairs = [
            (API_URL, &self.api_url),
            (S3_BUCKET, &self.s3_bucket),
            (S3_KEY, &self.s3_key),
            (SNS_TOPIC_ARN, &self.sns_topic_arn),
        ];
        EnvSnapshot::from_pairs(
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.clone().map(|v| (key, v))),
        )
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Keys are relative to the bucket directory, even when written with a leading '/'.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.base_path.join(bucket).join(key.trim_start_matches('/'))
    }
}

impl ObjectStore for LocalStorage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let full_path = self.object_path(bucket, key);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Service {
                    message: format!("Failed to create {}: {}", parent.display(), e),
                })?;
        }

        tokio::fs::write(&full_path, body)
            .await
            .map_err(|e| StorageError::Service {
                message: format!("Failed to write {}: {}", full_path.display(), e),
            })
    }
}

/// Prints notifications instead of publishing them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleChannel;

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<String, NotifyError> {
        println!("📣 [{}] {}: {}", topic, subject, body);
        Ok(format!("console-{}", topic))
    }
}
