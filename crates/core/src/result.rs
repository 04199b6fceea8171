use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::field::Field;

/// Fields extracted from a single card image. A missing key means the field was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: BTreeMap<Field, String>,
}

impl ExtractionResult {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Set fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|v| (f, v)))
    }

    /// Value to put into the form; unset fields are shown blank.
    pub fn display_value(&self, field: Field) -> &str {
        self.get(field).unwrap_or("")
    }
}
