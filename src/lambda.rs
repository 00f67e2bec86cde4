use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sns::Client as SnsClient;
use data_pipeline::utils::logger;
use data_pipeline::{
    EnvSnapshot, EtlEngine, HttpFetcher, Notifier, PipelinePolicy, RunReport, S3Storage,
    SnsChannel, Transformer, Uploader,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

/// The event payload is ignored; all configuration comes from the environment.
async fn function_handler(_event: LambdaEvent<serde_json::Value>) -> Result<RunReport, Error> {
    tracing::info!("Starting data pipeline Lambda function");

    let env = EnvSnapshot::from_process();
    let policy = PipelinePolicy::default();

    // 創建AWS客戶端
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let storage = S3Storage::new(S3Client::new(&aws_config));
    let notifier = Notifier::new(SnsChannel::new(SnsClient::new(&aws_config)));

    let engine = EtlEngine::new(
        HttpFetcher::new(policy.fetch.clone()),
        Transformer::new(policy.filter.clone()),
        Uploader::new(storage, policy.upload.clone()),
        notifier,
    );

    let report = engine.run(&env).await;
    tracing::info!(status_code = report.status_code, "Lambda function finished");
    Ok(report)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
