use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::category::UNKNOWN_CATEGORY;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("json parse error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("record {0} is not a JSON object")]
    NotObject(usize),
}

/// Keys the normalizer reads from each raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub date: String,
    pub category: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self { date: "incident_date".into(), category: "incident_category".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub date: String,
    pub category: String,
}

/// Extract `(date, category)` from one raw record.
///
/// The date keeps only what precedes the first `T`. A missing category key
/// becomes `"Unknown"`; a present but empty-ish value (`null`, `""`, `false`,
/// `0`, `[]`, `{}`) drops the record. Other non-string values keep their
/// JSON text.
pub fn normalize(record: &Value, fields: &FieldNames) -> Option<NormalizedRecord> {
    let date = match record.get(&fields.date) {
        Some(Value::String(s)) => s.split('T').next().unwrap_or_default(),
        _ => return None,
    };
    if date.is_empty() { return None; }

    let category = match record.get(&fields.category) {
        None => UNKNOWN_CATEGORY.to_string(),
        Some(v) if is_blank(v) => return None,
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Some(NormalizedRecord { date: date.to_string(), category })
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Parse an export of source records: either one JSON array of objects or
/// JSON lines with one object per line.
pub fn parse_records(text: &str) -> Result<Vec<Value>, ParseError> {
    let trimmed = text.trim_start();
    let values: Vec<Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|source| ParseError::Json { line: source.line(), source })?
    } else {
        let mut out = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() { continue; }
            let v = serde_json::from_str::<Value>(line)
                .map_err(|source| ParseError::Json { line: i + 1, source })?;
            out.push(v);
        }
        out
    };
    if let Some(idx) = values.iter().position(|v| !v.is_object()) {
        return Err(ParseError::NotObject(idx));
    }
    Ok(values)
}
