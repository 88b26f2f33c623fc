use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, stable identity the host uses for cross-filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionId(String);

impl SelectionId {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host service handing out selection identities.
pub trait IdentityService {
    /// Identity of row `row` of the category column with host index `column_index`.
    fn category_identity(&self, column_index: usize, row: usize) -> SelectionId;

    /// Identity keyed by a measure value.
    fn measure_identity(&self, measure: &str) -> SelectionId;

    /// Identity used when no category column backs a value.
    fn empty_identity(&self) -> SelectionId {
        SelectionId::new("")
    }
}

/// Deterministic identities derived from column/row positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIdentityService;

impl IdentityService for DefaultIdentityService {
    fn category_identity(&self, column_index: usize, row: usize) -> SelectionId {
        SelectionId::new(format!("category:{column_index}:{row}"))
    }

    fn measure_identity(&self, measure: &str) -> SelectionId {
        SelectionId::new(format!("measure:{measure}"))
    }
}
