use crate::config::{EnvSnapshot, PipelineConfig};
use crate::core::notify::Notifier;
use crate::core::transform::Transformer;
use crate::core::upload::Uploader;
use crate::domain::model::{RunOutcome, RunReport, Stage, UploadStatus};
use crate::domain::ports::{NotificationChannel, ObjectStore, PipelineObserver, RecordSource};
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::TracingObserver;
use std::sync::Arc;

/// Runs validate → fetch → transform → upload, stopping at the first failure,
/// then sends exactly one notification for the run.
pub struct EtlEngine<F, S, N>
where
    F: RecordSource,
    S: ObjectStore,
    N: NotificationChannel,
{
    source: F,
    transformer: Transformer,
    uploader: Uploader<S>,
    notifier: Notifier<N>,
    observer: Arc<dyn PipelineObserver>,
}

impl<F, S, N> EtlEngine<F, S, N>
where
    F: RecordSource,
    S: ObjectStore,
    N: NotificationChannel,
{
    pub fn new(source: F, transformer: Transformer, uploader: Uploader<S>, notifier: Notifier<N>) -> Self {
        Self {
            source,
            transformer,
            uploader,
            notifier,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub async fn run(&self, env: &EnvSnapshot) -> RunReport {
        tracing::info!("🚀 Starting the data pipeline...");

        let outcome = match self.run_stages(env).await {
            Ok(()) => RunOutcome::Success,
            Err(e) => {
                let stage = e.stage();
                let outcome = outcome_for(e);
                self.observer.stage_failed(stage, &outcome.message());
                outcome
            }
        };

        // 任何路徑都只通知一次
        self.observer.stage_started(Stage::Notifying);
        self.notifier.notify(env.topic_arn(), &outcome).await;

        let report = RunReport::from(outcome);
        self.observer.run_finished(report.status_code, &report.body);
        report
    }

    async fn run_stages(&self, env: &EnvSnapshot) -> Result<()> {
        self.observer.stage_started(Stage::Validating);
        let config = PipelineConfig::resolve(env)?;
        self.observer
            .stage_completed(Stage::Validating, "all required environment variables present");

        self.observer.stage_started(Stage::Fetching);
        let raw = self.source.fetch(&config.api_url).await?;
        self.observer.stage_completed(Stage::Fetching, "response parsed as JSON");

        self.observer.stage_started(Stage::Transforming);
        let payload = self.transformer.transform(&raw)?;
        self.observer.stage_completed(
            Stage::Transforming,
            &format!("{} rows kept", payload.row_count),
        );

        self.observer.stage_started(Stage::Uploading);
        match self
            .uploader
            .upload(&payload, &config.s3_bucket, &config.s3_key)
            .await
        {
            UploadStatus::Successful => {
                self.observer.stage_completed(
                    Stage::Uploading,
                    &format!("s3://{}/{}", config.s3_bucket, config.s3_key),
                );
                Ok(())
            }
            UploadStatus::Failed { reason } => Err(EtlError::Upload { reason }),
        }
    }
}

fn outcome_for(err: EtlError) -> RunOutcome {
    let detail = err.user_friendly_message();
    match err {
        EtlError::Config(e) => RunOutcome::ConfigurationFailed(e),
        EtlError::Fetch(_) => RunOutcome::FetchFailed(detail),
        EtlError::Transform(_) => RunOutcome::TransformFailed(detail),
        EtlError::Upload { .. } => RunOutcome::UploadFailed(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        FetchPolicy, FilterPolicy, UploadPolicy, API_URL, S3_BUCKET, S3_KEY, SNS_TOPIC_ARN,
    };
    use crate::core::fetch::HttpFetcher;
    use crate::domain::model::FAILURE_SUBJECT;
    use crate::utils::error::{FetchError, NotifyError, StorageError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct StubSource {
        response: std::result::Result<serde_json::Value, u16>,
        calls: Arc<AtomicUsize>,
    }

    impl StubSource {
        fn returning(value: serde_json::Value) -> Self {
            Self {
                response: Ok(value),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                response: Err(status),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl RecordSource for StubSource {
        async fn fetch(&self, _endpoint: &str) -> std::result::Result<serde_json::Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err(status) => Err(FetchError::Http {
                    status: *status,
                    body: "stub".to_string(),
                }),
            }
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        fail: bool,
        objects: Arc<Mutex<Vec<(String, String, Vec<u8>)>>>,
    }

    impl ObjectStore for MemoryStore {
        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            body: &[u8],
            _content_type: &str,
        ) -> std::result::Result<(), StorageError> {
            self.objects
                .lock()
                .await
                .push((bucket.to_string(), key.to_string(), body.to_vec()));
            if self.fail {
                return Err(StorageError::Service {
                    message: "InternalError".to_string(),
                });
            }
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingChannel {
        fail: bool,
        published: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn publish(
            &self,
            _topic: &str,
            subject: &str,
            body: &str,
        ) -> std::result::Result<String, NotifyError> {
            self.published
                .lock()
                .await
                .push((subject.to_string(), body.to_string()));
            if self.fail {
                return Err(NotifyError::Publish {
                    message: "AuthorizationError".to_string(),
                });
            }
            Ok("id".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: StdMutex<Vec<String>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn stage_started(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {:?}", stage));
        }

        fn stage_completed(&self, stage: Stage, _detail: &str) {
            self.events.lock().unwrap().push(format!("done {:?}", stage));
        }

        fn stage_failed(&self, stage: Stage, _message: &str) {
            self.events.lock().unwrap().push(format!("fail {:?}", stage));
        }

        fn run_finished(&self, status_code: u16, _body: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("finish {}", status_code));
        }
    }

    fn env() -> EnvSnapshot {
        EnvSnapshot::from_pairs([
            (API_URL, "https://api.example.com/products"),
            (S3_BUCKET, "bucket"),
            (S3_KEY, "out/products.txt"),
            (SNS_TOPIC_ARN, "arn:aws:sns:us-east-1:1:pipeline"),
        ])
    }

    fn engine(
        source: StubSource,
        store: MemoryStore,
        channel: RecordingChannel,
    ) -> EtlEngine<StubSource, MemoryStore, RecordingChannel> {
        let upload_policy = UploadPolicy {
            delay: Duration::from_millis(1),
            ..UploadPolicy::default()
        };
        EtlEngine::new(
            source,
            Transformer::new(FilterPolicy::default()),
            Uploader::new(store, upload_policy),
            Notifier::new(channel),
        )
    }

    #[tokio::test]
    async fn test_full_success() {
        let source = StubSource::returning(serde_json::json!([{"price": 100}, {"price": 10}]));
        let store = MemoryStore::default();
        let channel = RecordingChannel::default();
        let observer = Arc::new(RecordingObserver::default());
        let engine = engine(source.clone(), store.clone(), channel.clone())
            .with_observer(observer.clone());

        let report = engine.run(&env()).await;

        assert_eq!(report.status_code, 200);
        assert_eq!(report.body, "Pipeline completed successfully.");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let objects = store.objects.lock().await;
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].0, "bucket");
        assert_eq!(objects[0].1, "out/products.txt");
        assert_eq!(objects[0].2, b"price\n100\n".to_vec());

        assert_eq!(channel.published.lock().await.len(), 1);
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec![
                "start Validating",
                "done Validating",
                "start Fetching",
                "done Fetching",
                "start Transforming",
                "done Transforming",
                "start Uploading",
                "done Uploading",
                "start Notifying",
                "finish 200",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_config_fails_before_fetch() {
        let source = StubSource::returning(serde_json::json!([{"price": 100}]));
        let store = MemoryStore::default();
        let channel = RecordingChannel::default();
        let engine = engine(source.clone(), store.clone(), channel.clone());

        let env = EnvSnapshot::from_pairs([
            (S3_BUCKET, "bucket"),
            (S3_KEY, "key"),
            (SNS_TOPIC_ARN, "arn:topic"),
        ]);
        let report = engine.run(&env).await;

        assert_eq!(report.status_code, 500);
        assert_eq!(report.body, "Missing required environment variables.");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(store.objects.lock().await.is_empty());

        let published = channel.published.lock().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, FAILURE_SUBJECT);
        assert_eq!(published[0].1, "Missing required environment variables: API_URL");
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_remaining_stages() {
        let source = StubSource::failing(404);
        let store = MemoryStore::default();
        let channel = RecordingChannel::default();
        let observer = Arc::new(RecordingObserver::default());
        let engine = engine(source, store.clone(), channel.clone()).with_observer(observer.clone());

        let report = engine.run(&env()).await;

        assert_eq!(report.status_code, 500);
        assert_eq!(report.body, "Data fetch failed.");
        assert!(matches!(report.outcome, RunOutcome::FetchFailed(_)));
        assert!(store.objects.lock().await.is_empty());
        assert_eq!(channel.published.lock().await.len(), 1);

        let events = observer.events.lock().unwrap();
        assert_eq!(events.iter().filter(|e| e.starts_with("fail")).count(), 1);
        assert!(!events.iter().any(|e| e.contains("Transforming")));
    }

    #[tokio::test]
    async fn test_transform_failure_on_empty_response() {
        let store = MemoryStore::default();
        let channel = RecordingChannel::default();
        let engine = engine(
            StubSource::returning(serde_json::json!([])),
            store.clone(),
            channel.clone(),
        );

        let report = engine.run(&env()).await;

        assert_eq!(report.status_code, 500);
        assert_eq!(report.body, "Data processing failed.");
        assert!(store.objects.lock().await.is_empty());
        assert_eq!(channel.published.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_reports_once() {
        let store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };
        let channel = RecordingChannel::default();
        let engine = engine(
            StubSource::returning(serde_json::json!([{"price": 75}])),
            store.clone(),
            channel.clone(),
        );

        let report = engine.run(&env()).await;

        assert_eq!(report.status_code, 500);
        assert_eq!(report.body, "S3 upload failed.");
        assert_eq!(store.objects.lock().await.len(), 3);

        let published = channel.published.lock().await;
        assert_eq!(published.len(), 1);
        assert!(published[0].1.starts_with("Data pipeline failed at the S3 Upload stage"));
    }

    #[tokio::test]
    async fn test_config_failure_without_topic_still_returns() {
        let channel = RecordingChannel::default();
        let engine = engine(
            StubSource::returning(serde_json::json!([])),
            MemoryStore::default(),
            channel.clone(),
        );

        let report = engine.run(&EnvSnapshot::default()).await;

        assert_eq!(report.status_code, 500);
        assert!(channel.published.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_publish_error_does_not_fail_successful_run() {
        let channel = RecordingChannel {
            fail: true,
            ..RecordingChannel::default()
        };
        let store = MemoryStore::default();
        let engine = engine(
            StubSource::returning(serde_json::json!([{"price": 100}])),
            store.clone(),
            channel.clone(),
        );

        let report = engine.run(&env()).await;

        assert_eq!(report.status_code, 200);
        assert_eq!(report.body, "Pipeline completed successfully.");
        assert_eq!(store.objects.lock().await.len(), 1);
        assert_eq!(channel.published.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_broken_http_client_still_validates_config_first() {
        let channel = RecordingChannel::default();
        let engine = EtlEngine::new(
            HttpFetcher::without_client(FetchPolicy::default(), "no TLS backend"),
            Transformer::new(FilterPolicy::default()),
            Uploader::new(MemoryStore::default(), UploadPolicy::default()),
            Notifier::new(channel.clone()),
        );

        let env = EnvSnapshot::from_pairs([(S3_BUCKET, "bucket"), (SNS_TOPIC_ARN, "arn:topic")]);
        let report = engine.run(&env).await;

        assert_eq!(report.status_code, 500);
        assert_eq!(report.body, "Missing required environment variables.");
        let published = channel.published.lock().await;
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].1,
            "Missing required environment variables: API_URL, S3_KEY"
        );
    }

    #[tokio::test]
    async fn test_broken_http_client_reports_fetch_failure() {
        let channel = RecordingChannel::default();
        let engine = EtlEngine::new(
            HttpFetcher::without_client(FetchPolicy::default(), "no TLS backend"),
            Transformer::new(FilterPolicy::default()),
            Uploader::new(MemoryStore::default(), UploadPolicy::default()),
            Notifier::new(channel.clone()),
        );

        let report = engine.run(&env()).await;

        assert_eq!(report.body, "Data fetch failed.");
        let published = channel.published.lock().await;
        assert_eq!(published.len(), 1);
        assert!(published[0]
            .1
            .starts_with("Data pipeline failed at the Fetch Data stage: Unexpected error"));
    }
}
