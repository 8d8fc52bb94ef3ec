//! Normalized response and query parameters

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Normalized body of every Pipedrive response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub additional_data: Option<Value>,
    #[serde(default)]
    pub related_objects: Option<Value>,
}

impl ApiResponse {
    /// Decode a response body. Non-JSON bodies, and JSON that is not an
    /// object, are wrapped as `data: {"content": ...}`.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(payload @ Value::Object(_)) => {
                serde_json::from_value(payload.clone()).unwrap_or_else(|_| Self::content(payload))
            }
            Ok(other) => Self::content(other),
            Err(_) => Self::content(Value::String(String::from_utf8_lossy(body).into_owned())),
        }
    }

    fn content(content: Value) -> Self {
        Self {
            success: None,
            data: Some(json!({ "content": content })),
            additional_data: None,
            related_objects: None,
        }
    }

    /// `success` is absent on some endpoints; only an explicit `false` counts
    pub fn is_success(&self) -> bool {
        self.success != Some(false)
    }

    /// `data` as a list: arrays are returned as is, a single object becomes a
    /// one-element list, null becomes empty
    pub fn data_items(&self) -> Vec<Value> {
        match &self.data {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(other) => vec![other.clone()],
        }
    }

    /// `{"data": ..., "related_objects": ...}`
    pub fn into_value(self) -> Value {
        json!({
            "data": self.data.unwrap_or(Value::Null),
            "related_objects": self.related_objects.unwrap_or(Value::Null),
        })
    }
}

/// Query parameters, kept sorted so requests are reproducible
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert only when the value is present
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}
