use clap::Parser;
use data_pipeline::utils::logger;
use data_pipeline::{
    CliConfig, ConsoleChannel, EtlEngine, HttpFetcher, LocalStorage, Notifier, PipelinePolicy,
    Transformer, Uploader,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting data-pipeline CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let policy = PipelinePolicy::default();
    let fetcher = HttpFetcher::new(policy.fetch.clone());
    let storage = LocalStorage::new(config.output_dir.clone());
    let engine = EtlEngine::new(
        fetcher,
        Transformer::new(policy.filter.clone()),
        Uploader::new(storage, policy.upload.clone()),
        Notifier::new(ConsoleChannel),
    );

    let report = engine.run(&config.snapshot()).await;

    if report.status_code == 200 {
        println!("✅ {}", report.body);
        Ok(())
    } else {
        eprintln!("❌ {} (status {})", report.body, report.status_code);
        std::process::exit(1);
    }
}
