//! Capability contract for the underlying grid widget
//!
//! The explorer never couples to one rendering library: any widget that can
//! satisfy this trait (render rows, take a predicate filter, partition into
//! groups, rearrange columns, report edits) is substitutable. Implementors
//! must keep transient UI state (scroll position, selection, focus) across
//! filter and layout changes; the widget's copy of the data is never the
//! source of truth.

use std::collections::{BTreeSet, HashMap};

use crate::data::row::{DataValue, Row, RowId};
use crate::schema::TableSchema;

/// Row-level filter predicate handed to the widget
pub type RowPredicate = Box<dyn Fn(&Row) -> bool>;

/// Column arrangement: explicit order, hidden set, per-field pixel widths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    pub order: Vec<String>,
    pub hidden: BTreeSet<String>,
    pub widths: HashMap<String, u32>,
}

/// Required capabilities of the rendering widget.
///
/// Fallible operations return `Err(reason)` when the widget rejects a
/// specification (an unknown field, an unsupported grouping). Rejection
/// must leave the widget's previous state intact.
pub trait GridWidget {
    /// Render (or re-render) a row collection under the given descriptors.
    fn set_rows(&mut self, rows: &[Row], schema: &TableSchema);

    /// Re-apply a row filter without destroying scroll/selection state.
    fn apply_predicate(&mut self, predicate: RowPredicate) -> Result<(), String>;

    /// Partition rows into collapsible groups by the given field, each
    /// group header showing its member count. `None` removes grouping.
    fn set_group_by(&mut self, field: Option<&str>) -> Result<(), String>;

    /// Reorder/hide/resize columns, without a full re-render when possible.
    fn set_column_layout(&mut self, layout: &ColumnLayout) -> Result<(), String>;

    /// Reflect a single-cell value change in place.
    fn update_cell(&mut self, row_id: RowId, field: &str, value: &DataValue);

    /// Batching hints so a wholesale view-state application does not
    /// flicker through intermediate states. Optional for widgets that
    /// repaint atomically anyway.
    fn begin_batch(&mut self) {}
    fn end_batch(&mut self) {}
}
