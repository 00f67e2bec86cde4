use crate::core::{NotificationChannel, ObjectStore};
use crate::utils::error::{NotifyError, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sns::Client as SnsClient;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
}

impl S3Storage {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

impl ObjectStore for S3Storage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let result = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .content_type(content_type)
            .send()
            .await;

        match result {
            Ok(_output) => Ok(()),
            // 請求本身無法建立，重試無意義
            Err(err @ SdkError::ConstructionFailure(_)) => Err(StorageError::Other {
                message: DisplayErrorContext(&err).to_string(),
            }),
            Err(err) => Err(StorageError::Service {
                message: DisplayErrorContext(&err).to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnsChannel {
    client: SnsClient,
}

impl SnsChannel {
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationChannel for SnsChannel {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<String, NotifyError> {
        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|e| NotifyError::Publish {
                message: aws_sdk_sns::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output.message_id().unwrap_or("unknown").to_string())
    }
}
