use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A server-computed figure relayed to the page as text.
///
/// The server may send either a JSON number (`102`) or a pre-formatted
/// string (`"$1,000.00"`). Numbers keep their JSON rendering; strings are
/// used as-is. The client never does arithmetic on these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayValue(String);

impl DisplayValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert a raw JSON value. Only numbers and strings are displayable.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) => Some(Self(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DisplayValue {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for DisplayValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DisplayValue::from_json(&value).ok_or_else(|| {
            de::Error::custom(format!("expected a number or string, found {value}"))
        })
    }
}

impl Serialize for DisplayValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
