//! Per-table column configuration
//!
//! A `TableSchema` is defined once per logical table (users, items,
//! projects, ...) and stays immutable for the lifetime of a controller.
//! Shared enumerations (role lists, contact-type lists) travel here as
//! explicit per-table configuration so independent tables can run
//! concurrently with independent option sets.

use serde::{Deserialize, Serialize};

/// Data type hint used for editors and filter UIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    Enum,
    Number,
    Date,
    List,
}

/// Static definition of one column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub field: String,
    pub title: String,
    #[serde(default)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub editable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    #[serde(default)]
    pub groupable: bool,
    /// Fixed pixel width; None means flexible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Fixed option list for Enum columns (filter and group choices)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl ColumnDescriptor {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            kind: ColumnKind::Text,
            editable: false,
            filterable: true,
            groupable: false,
            width: None,
            options: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn groupable(mut self) -> Self {
        self.groupable = true;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Column Descriptor set for one logical table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Logical table name ("users", "items", ...)
    pub name: String,
    /// Path segment of the dataset/mutation endpoint for this table
    pub endpoint: String,
    /// Field carrying the stable row identifier
    pub id_field: String,
    pub columns: Vec<ColumnDescriptor>,
    /// Whitelist of fields the free-text search expands over
    #[serde(default)]
    pub searchable: Vec<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            id_field: "id".to_string(),
            columns: Vec::new(),
            searchable: Vec::new(),
        }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_searchable(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.searchable = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.column(field).is_some()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.field.clone()).collect()
    }

    /// Searchable fields that actually exist in the descriptor set
    pub fn searchable_fields(&self) -> Vec<String> {
        self.searchable
            .iter()
            .filter(|f| self.has_field(f))
            .cloned()
            .collect()
    }

    pub fn is_groupable(&self, field: &str) -> bool {
        self.column(field).is_some_and(|c| c.groupable)
    }

    pub fn is_editable(&self, field: &str) -> bool {
        self.column(field).is_some_and(|c| c.editable)
    }
}
