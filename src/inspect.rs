use crate::{
    error::ProbeError,
    probe::{ProbeResult, ProbeSuccess},
};
use serde_json::Value;

/// How many records of the list field are copied into a result.
pub const SAMPLE_LIMIT: usize = 2;

/// Summarise a decoded document. A missing list field, or one that is not an
/// array, yields no samples rather than an error.
pub fn inspect(http_status: u16, doc: &Value, list_field: Option<&str>) -> ProbeSuccess {
    let top_level_keys = match doc {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };

    let list = list_field
        .filter(|f| !f.is_empty())
        .and_then(|f| doc.get(f))
        .and_then(Value::as_array);

    let (sample_count, samples) = match list {
        Some(items) => (
            items.len(),
            items.iter().take(SAMPLE_LIMIT).cloned().collect(),
        ),
        None => (0, Vec::new()),
    };

    ProbeSuccess {
        http_status,
        top_level_keys,
        sample_count,
        samples,
    }
}

pub fn decode_body(http_status: u16, body: &[u8], list_field: Option<&str>) -> ProbeResult {
    match serde_json::from_slice::<Value>(body) {
        Ok(doc) => ProbeResult::Success(inspect(http_status, &doc, list_field)),
        Err(e) => ProbeError::from(e).into(),
    }
}

/// Field names of an object sample, in document order.
pub fn sample_fields(sample: &Value) -> Vec<String> {
    match sample {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

pub fn has_any_field(sample: &Value, fields: &[String]) -> bool {
    match sample {
        Value::Object(map) => fields.iter().any(|f| map.contains_key(f)),
        _ => false,
    }
}
