use crate::domain::model::Stage;
use crate::domain::ports::PipelineObserver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("data_pipeline=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("data_pipeline=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_lambda_logger() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("data_pipeline=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .without_time() // Lambda 平台自帶時間戳
                .json(),
        )
        .init();
}

/// Default observer: turns engine events into log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn stage_started(&self, stage: Stage) {
        tracing::info!(stage = ?stage, "▶️ {}", stage);
    }

    fn stage_completed(&self, stage: Stage, detail: &str) {
        tracing::info!(stage = ?stage, "✅ {}: {}", stage, detail);
    }

    fn stage_failed(&self, stage: Stage, message: &str) {
        tracing::error!(stage = ?stage, "❌ {}", message);
    }

    fn run_finished(&self, status_code: u16, body: &str) {
        if status_code == 200 {
            tracing::info!(status_code, "🏁 {}", body);
        } else {
            tracing::info!(status_code, "🏁 Run finished: {}", body);
        }
    }
}
