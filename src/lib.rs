pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliConfig, ConsoleChannel, LocalStorage};

#[cfg(feature = "lambda")]
pub use crate::config::lambda::{S3Storage, SnsChannel};

pub use crate::config::{EnvSnapshot, PipelineConfig, PipelinePolicy};
pub use crate::core::{
    etl::EtlEngine, fetch::HttpFetcher, notify::Notifier, transform::Transformer,
    upload::Uploader,
};
pub use crate::domain::model::{RunOutcome, RunReport};
pub use crate::utils::error::{EtlError, Result};
