use crate::domain::model::Stage;
use crate::utils::error::{FetchError, NotifyError, StorageError};
use async_trait::async_trait;

/// Upstream API. Returns the parsed JSON body; shape checks belong to the transform stage.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> Result<serde_json::Value, FetchError>;
}

pub trait ObjectStore: Send + Sync {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

/// Outbound notification channel. Returns the channel's message id.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn publish(&self, topic: &str, subject: &str, body: &str)
        -> Result<String, NotifyError>;
}

/// Receives lifecycle events from the engine.
pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, stage: Stage);
    fn stage_completed(&self, stage: Stage, detail: &str);
    fn stage_failed(&self, stage: Stage, message: &str);
    fn run_finished(&self, status_code: u16, body: &str);
}
