use crate::config::FilterPolicy;
use crate::domain::model::{FilteredPayload, Record, RecordBatch};
use crate::utils::error::TransformError;
use serde_json::Value;

/// Filters records on a numeric field and writes the survivors as TSV.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    policy: FilterPolicy,
}

impl Transformer {
    pub fn new(policy: FilterPolicy) -> Self {
        Self { policy }
    }

    /// Converts the fetched JSON value into a batch. `null` and `[]` are empty input.
    pub fn to_batch(&self, raw: &Value) -> Result<RecordBatch, TransformError> {
        let items = match raw {
            Value::Null => return Err(TransformError::EmptyInput),
            Value::Array(items) if items.is_empty() => return Err(TransformError::EmptyInput),
            Value::Array(items) => items,
            other => {
                return Err(TransformError::MalformedInput {
                    reason: format!("expected a JSON array of objects, got {}", type_name(other)),
                })
            }
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(obj) => Ok(Record { data: obj.clone() }),
                other => Err(TransformError::MalformedInput {
                    reason: format!("item {} is {}, not an object", index, type_name(other)),
                }),
            })
            .collect()
    }

    pub fn transform(&self, raw: &Value) -> Result<FilteredPayload, TransformError> {
        let batch = self.to_batch(raw)?;
        self.transform_batch(&batch)
    }

    pub fn transform_batch(&self, batch: &[Record]) -> Result<FilteredPayload, TransformError> {
        if batch.is_empty() {
            return Err(TransformError::EmptyInput);
        }

        let columns = column_order(batch);
        tracing::info!(
            "🔄 Processing {} records with {} columns",
            batch.len(),
            columns.len()
        );

        let filtered: Vec<&Record> = batch.iter().filter(|r| self.passes(r)).collect();
        tracing::info!(
            "🔄 Filtered data ({} > {}): {} of {} records kept",
            self.policy.field,
            self.policy.threshold,
            filtered.len(),
            batch.len()
        );

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(&columns)?;
        for record in &filtered {
            writer.write_record(columns.iter().map(|c| render_cell(record.data.get(c))))?;
        }
        let body = writer
            .into_inner()
            .map_err(|e| TransformError::Serialization(e.into_error().into()))?;

        tracing::info!("✅ Data processed and saved to TXT format!");
        Ok(FilteredPayload::new(columns, filtered.len(), body))
    }

    /// Missing, null and non-numeric values fail the filter.
    fn passes(&self, record: &Record) -> bool {
        match record.data.get(&self.policy.field).and_then(Value::as_f64) {
            Some(value) => value > self.policy.threshold,
            None => {
                tracing::debug!(
                    "Record excluded: field '{}' missing or not numeric",
                    self.policy.field
                );
                false
            }
        }
    }
}

/// Union of keys across the batch, in first-seen order.
fn column_order(batch: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in batch {
        for key in record.data.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
