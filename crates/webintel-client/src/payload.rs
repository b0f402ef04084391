use serde_json::{Map, Value};

/// Assembles a JSON request body from required and optional fields.
///
/// The only test applied to an optional field is whether a value was
/// supplied: `Some(0)`, `Some(false)` and `Some("")` are all emitted
/// verbatim. Nothing here validates ranges or choices; that stays with the
/// CLI layer.
#[derive(Debug, Default)]
pub struct PayloadBuilder {
    map: Map<String, Value>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    pub fn optional<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), v.into());
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}
