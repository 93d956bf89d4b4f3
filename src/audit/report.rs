//! Audit report wrapper.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured result of one audit, shaped `{ "lhr": { ... } }`.
///
/// The contents are owned by the auditing engine; only the fields needed
/// to classify and summarize a run are read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditReport(Value);

/// Semantic failure recorded inside an otherwise successful report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub code: Option<String>,
    pub message: String,
}

impl AuditReport {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Wrap a bare Lighthouse result.
    pub fn from_lhr(lhr: Value) -> Self {
        Self(json!({ "lhr": lhr }))
    }

    pub fn lhr(&self) -> Option<&Value> {
        self.0.get("lhr")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `lhr.runtimeError` entry, if the engine recorded one.
    pub fn runtime_error(&self) -> Option<RuntimeError> {
        let err = self
            .0
            .pointer("/lhr/runtimeError")
            .filter(|v| is_truthy(v))?;

        let code = err.get("code").and_then(Value::as_str).map(String::from);
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| code.clone())
            .unwrap_or_else(|| "Unknown runtime error".to_string());

        Some(RuntimeError { code, message })
    }

    /// Category id to score (0.0..=1.0; `None` when the category was not scored).
    pub fn category_scores(&self) -> BTreeMap<String, Option<f64>> {
        self.0
            .pointer("/lhr/categories")
            .and_then(Value::as_object)
            .map(|categories| {
                categories
                    .iter()
                    .map(|(id, category)| {
                        (id.clone(), category.get("score").and_then(Value::as_f64))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` are all unset.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl From<Value> for AuditReport {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
