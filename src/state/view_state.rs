//! The View-State Model: one complete visual configuration of a table
//!
//! A `ViewState` is a plain value. Snapshotting the controller produces
//! one; applying one replaces the controller's display state wholesale
//! (never merged). The same shape, field for field, is what the Saved-View
//! Store persists.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::data::filter::Filter;
use crate::schema::TableSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One entry of a multi-column sort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortEntry {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Aggregate display configuration for one table.
///
/// Every field defaults to "nothing applied" so a partially populated
/// payload (an older saved view, a hand-written fixture) deserializes to a
/// usable state. The per-evaluation AND/OR filter mode is deliberately not
/// part of this aggregate; it is transient controller state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub filters: Vec<Filter>,
    pub group_by: Option<String>,
    pub search_term: Option<String>,
    pub hidden_columns: BTreeSet<String>,
    pub column_order: Vec<String>,
    pub column_widths: HashMap<String, u32>,
    pub sort_config: Vec<SortEntry>,
}

impl ViewState {
    pub fn is_default(&self) -> bool {
        *self == ViewState::default()
    }

    /// Drop references to fields the schema does not define.
    ///
    /// Unknown fields are ignored, never an error: a saved view may predate
    /// a column rename and must still apply cleanly.
    pub fn sanitized(&self, schema: &TableSchema) -> ViewState {
        ViewState {
            filters: self
                .filters
                .iter()
                .filter(|f| schema.has_field(&f.field))
                .cloned()
                .collect(),
            group_by: self
                .group_by
                .as_ref()
                .filter(|f| schema.has_field(f.as_str()))
                .cloned(),
            search_term: self.search_term.clone(),
            hidden_columns: self
                .hidden_columns
                .iter()
                .filter(|f| schema.has_field(f.as_str()))
                .cloned()
                .collect(),
            column_order: self
                .column_order
                .iter()
                .filter(|f| schema.has_field(f.as_str()))
                .cloned()
                .collect(),
            column_widths: self
                .column_widths
                .iter()
                .filter(|(f, _)| schema.has_field(f.as_str()))
                .map(|(f, w)| (f.clone(), *w))
                .collect(),
            sort_config: self
                .sort_config
                .iter()
                .filter(|s| schema.has_field(&s.field))
                .cloned()
                .collect(),
        }
    }
}
