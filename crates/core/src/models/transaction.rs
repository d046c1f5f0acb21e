use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;

/// The serialized state of one holding, attached to its table row.
///
/// Only `quantity` is interpreted on the client. Every other field
/// (`price`, `variation`, `amount`, ids the template adds…) is carried
/// through untouched so the server gets back exactly what it rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowTransaction {
    /// Units held. Reaching zero removes the row.
    pub quantity: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RowTransaction {
    pub fn new(quantity: u64) -> Self {
        Self {
            quantity,
            extra: Map::new(),
        }
    }

    /// Builder-style helper for attaching an opaque field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up an opaque field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Parse a row's `data-transaction` attribute.
    pub fn parse(data: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Serialize for storing back onto the row.
    pub fn to_data_string(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}
