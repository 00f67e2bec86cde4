pub mod etl;
pub mod fetch;
pub mod notify;
pub mod transform;
pub mod upload;

pub use crate::domain::model::{FilteredPayload, Record, RecordBatch, RunOutcome, RunReport};
pub use crate::domain::ports::{NotificationChannel, ObjectStore, PipelineObserver, RecordSource};
pub use crate::utils::error::Result;
