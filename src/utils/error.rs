use crate::domain::model::Stage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", keys.join(", "))]
    MissingConfiguration { keys: Vec<String> },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Could not connect to the API: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("API response is not valid JSON: {0}")]
    InvalidResponseFormat(String),

    #[error("Unexpected error while fetching: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else {
            FetchError::Unexpected(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("No data provided for processing")]
    EmptyInput,

    #[error("Input is not tabular: {reason}")]
    MalformedInput { reason: String },

    #[error("Failed to serialize filtered data: {0}")]
    Serialization(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    /// Raised by the storage client or its transport.
    #[error("Storage service error: {message}")]
    Service { message: String },

    #[error("Storage error: {message}")]
    Other { message: String },
}

impl StorageError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Service { .. })
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to publish notification: {message}")]
    Publish { message: String },
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Upload error: {reason}")]
    Upload { reason: String },
}

impl EtlError {
    /// The pipeline stage an error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            EtlError::Config(_) => Stage::Validating,
            EtlError::Fetch(_) => Stage::Fetching,
            EtlError::Transform(_) => Stage::Transforming,
            EtlError::Upload { .. } => Stage::Uploading,
        }
    }

    /// Detail for operators, without the stage prefix used by `Display`.
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::Config(e) => e.to_string(),
            EtlError::Fetch(e) => e.to_string(),
            EtlError::Transform(e) => e.to_string(),
            EtlError::Upload { reason } => reason.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
