//! Adapter between controller state and the rendering widget
//!
//! Widget-level failures stop here: a rejected filter or layout is logged
//! and the previous visual state stays active. Nothing a widget does can
//! take down the surrounding page.

use tracing::{debug, warn};

use crate::data::row::{DataValue, Row, RowId};
use crate::grid::widget::{ColumnLayout, GridWidget, RowPredicate};
use crate::schema::TableSchema;

pub struct GridAdapter<W: GridWidget> {
    widget: W,
}

impl<W: GridWidget> GridAdapter<W> {
    pub fn new(widget: W) -> Self {
        Self { widget }
    }

    pub fn set_rows(&mut self, rows: &[Row], schema: &TableSchema) {
        debug!(target: "grid", "rendering {} rows for '{}'", rows.len(), schema.name);
        self.widget.set_rows(rows, schema);
    }

    /// Hand the widget a new filter predicate. A rejection is absorbed;
    /// the widget keeps its previous filter.
    pub fn apply_filter(&mut self, predicate: RowPredicate) {
        if let Err(reason) = self.widget.apply_predicate(predicate) {
            warn!(target: "grid", "widget rejected filter, keeping previous: {}", reason);
        }
    }

    pub fn set_group_by(&mut self, field: Option<&str>) {
        if let Err(reason) = self.widget.set_group_by(field) {
            warn!(target: "grid", "widget rejected grouping {:?}: {}", field, reason);
        }
    }

    pub fn set_column_layout(&mut self, layout: &ColumnLayout) {
        if let Err(reason) = self.widget.set_column_layout(layout) {
            warn!(target: "grid", "widget rejected column layout: {}", reason);
        }
    }

    pub fn update_cell(&mut self, row_id: RowId, field: &str, value: &DataValue) {
        self.widget.update_cell(row_id, field, value);
    }

    /// Push a full display configuration as one batch so the user never
    /// sees an intermediate state.
    pub fn refresh(
        &mut self,
        rows: &[Row],
        schema: &TableSchema,
        predicate: RowPredicate,
        group_by: Option<&str>,
        layout: &ColumnLayout,
    ) {
        self.widget.begin_batch();
        self.widget.set_rows(rows, schema);
        self.apply_filter(predicate);
        self.set_group_by(group_by);
        self.set_column_layout(layout);
        self.widget.end_batch();
    }

    /// Access to the wrapped widget if needed
    pub fn inner(&self) -> &W {
        &self.widget
    }

    pub fn inner_mut(&mut self) -> &mut W {
        &mut self.widget
    }
}
