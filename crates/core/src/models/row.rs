use serde::{Deserialize, Serialize};

/// Stable handle for one steppable table row.
///
/// Assigned once when the page is bound; the page owns the mapping from
/// key to element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The per-row labels a step rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowField {
    Quantity,
    Price,
    Variation,
    Amount,
}

impl RowField {
    pub const ALL: [RowField; 4] = [
        RowField::Quantity,
        RowField::Price,
        RowField::Variation,
        RowField::Amount,
    ];

    /// Class name of the descendant element holding this label.
    pub fn class_name(self) -> &'static str {
        match self {
            RowField::Quantity => "quantity",
            RowField::Price => "price",
            RowField::Variation => "variation",
            RowField::Amount => "amount",
        }
    }
}

impl std::fmt::Display for RowField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}
