//! Collection envelope used by list endpoints.

use serde::{Deserialize, Serialize};

/// `{"count": n, "value": [...]}` wrapper returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueList<T> {
    /// Number of items, when reported
    #[serde(default)]
    pub count: Option<usize>,

    /// The items
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> ValueList<T> {
    /// Consume the envelope and return the items.
    pub fn into_items(self) -> Vec<T> {
        self.value
    }
}
