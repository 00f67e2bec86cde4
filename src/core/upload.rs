use crate::config::UploadPolicy;
use crate::domain::model::{FilteredPayload, UploadStatus};
use crate::domain::ports::ObjectStore;

/// Puts the payload into object storage with a fixed-delay retry.
/// Never returns an error: the outcome is carried by [`UploadStatus`].
pub struct Uploader<S: ObjectStore> {
    store: S,
    policy: UploadPolicy,
}

impl<S: ObjectStore> Uploader<S> {
    pub fn new(store: S, policy: UploadPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn upload(&self, payload: &FilteredPayload, bucket: &str, key: &str) -> UploadStatus {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            // 每次重試都重送完整內容
            let result = self
                .store
                .put_object(bucket, key, payload.as_bytes(), &self.policy.content_type)
                .await;

            match result {
                Ok(()) => {
                    tracing::info!(
                        "✅ File successfully uploaded to S3: s3://{}/{} ({} bytes)",
                        bucket,
                        key,
                        payload.len()
                    );
                    return UploadStatus::Successful;
                }
                Err(e) if !e.is_retryable() => {
                    tracing::warn!("Upload attempt {} failed with a non-retryable error: {}", attempt, e);
                    return UploadStatus::Failed {
                        reason: e.to_string(),
                    };
                }
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        "🔄 Upload attempt {} failed: {}. Retrying in {:?}...",
                        attempt,
                        e,
                        self.policy.delay
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(e) => {
                    tracing::warn!("All {} upload attempts failed. Giving up.", max_attempts);
                    return UploadStatus::Failed {
                        reason: e.to_string(),
                    };
                }
            }
        }

        UploadStatus::Failed {
            reason: "no upload attempt was made".to_string(),
        }
    }
}
