//! Table Controller: orchestrates one table instance
//!
//! The controller owns the dataset and the current view state, mediates
//! between UI controls and the grid adapter, and drives the optimistic-edit
//! protocol. All state transitions happen on the host's single event loop;
//! network completions re-enter through [`TableController::resolve_edit`].
//! Dropping the controller is teardown: outstanding responses are simply
//! never applied.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::data::filter::{group_matches, search_filters, Filter, FilterMode};
use crate::data::row::{DataValue, Row, RowId};
use crate::data::value_compare::compare_values;
use crate::error::{ExplorerError, Result};
use crate::grid::{ColumnLayout, GridAdapter, GridWidget, RowPredicate};
use crate::schema::TableSchema;
use crate::state::events::GridEvent;
use crate::state::view_state::{SortDirection, SortEntry, ViewState};

/// Handle pairing an optimistic edit with its eventual server response.
///
/// The host issues the network call, keeps the ticket, and feeds the
/// response back through `resolve_edit`.
#[derive(Debug, Clone)]
pub struct EditTicket {
    pub row_id: RowId,
    pub field: String,
    seq: u64,
}

/// What happened when a response was folded back in
#[derive(Debug)]
pub enum EditResolution {
    /// The response was the latest for its key and was applied
    Applied,
    /// The edit failed; the cell reverted to its last confirmed value
    RolledBack(ExplorerError),
    /// An older response for a key with a newer edit, or a response that
    /// arrived after teardown/refetch. Discarded.
    Stale,
}

/// One group of visible rows under the active group-by field
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    pub key: String,
    pub row_ids: Vec<RowId>,
    pub count: usize,
}

struct PendingEdit {
    /// Latest issued sequence number for this (row, field) key
    seq: u64,
    /// Value to revert to if the latest request fails
    last_confirmed: DataValue,
}

pub struct TableController<W: GridWidget> {
    schema: TableSchema,
    adapter: GridAdapter<W>,
    rows: Vec<Row>,
    explicit_filters: Vec<Filter>,
    filter_mode: FilterMode,
    search_term: Option<String>,
    search_group: Vec<Filter>,
    group_by: Option<String>,
    sort_config: Vec<SortEntry>,
    layout: ColumnLayout,
    pending: HashMap<(RowId, String), PendingEdit>,
}

impl<W: GridWidget> TableController<W> {
    pub fn new(schema: TableSchema, widget: W) -> Self {
        Self {
            schema,
            adapter: GridAdapter::new(widget),
            rows: Vec::new(),
            explicit_filters: Vec::new(),
            filter_mode: FilterMode::And,
            search_term: None,
            search_group: Vec::new(),
            group_by: None,
            sort_config: Vec::new(),
            layout: ColumnLayout::default(),
            pending: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Replace the full dataset. Idempotent; the current view state is kept
    /// and re-projected onto the new rows. Pending edits are dropped, so
    /// responses belonging to the old dataset resolve as stale.
    pub fn load(&mut self, rows: Vec<Row>) {
        debug!(target: "controller", "loading {} rows into '{}'", rows.len(), self.schema.name);
        self.rows = rows;
        self.pending.clear();
        self.refresh_grid();
    }

    /// Replace the explicit filter group. An empty list shows all rows.
    pub fn apply_filter(&mut self, filters: Vec<Filter>, mode: FilterMode) {
        self.explicit_filters = filters;
        self.filter_mode = mode;
        self.adapter.apply_filter(self.predicate());
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(Vec::new(), FilterMode::And);
    }

    /// Set the free-text search term. A non-empty term becomes an
    /// OR-combined Contains group over the schema's searchable fields; an
    /// empty term clears only that group, leaving explicit filters alone.
    pub fn set_search_term(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            self.search_term = None;
            self.search_group.clear();
        } else {
            self.search_term = Some(term.to_string());
            self.search_group = search_filters(term, &self.schema.searchable_fields());
        }
        self.adapter.apply_filter(self.predicate());
    }

    /// Re-partition under a new group-by field without touching filters or
    /// sort. An unknown field is ignored.
    pub fn set_group_by(&mut self, field: Option<&str>) {
        match field {
            Some(f) if !self.schema.has_field(f) => {
                warn!(target: "controller", "ignoring group-by on unknown field '{}'", f);
                return;
            }
            _ => {}
        }
        self.group_by = field.map(String::from);
        self.adapter.set_group_by(self.group_by.as_deref());
    }

    /// Stable multi-key sort. Rows with a null value for a sort field sort
    /// after all non-null values regardless of direction. Entries for
    /// unknown fields are dropped.
    pub fn set_sort(&mut self, entries: Vec<SortEntry>) {
        self.sort_config = entries
            .into_iter()
            .filter(|e| self.schema.has_field(&e.field))
            .collect();
        // Display order changed: re-push rows in sorted order
        let display = self.rows_in_display_order();
        self.adapter.set_rows(&display, &self.schema);
    }

    pub fn hide_column(&mut self, field: &str) {
        if !self.schema.has_field(field) {
            return;
        }
        self.layout.hidden.insert(field.to_string());
        self.adapter.set_column_layout(&self.layout);
    }

    pub fn show_column(&mut self, field: &str) {
        self.layout.hidden.remove(field);
        self.adapter.set_column_layout(&self.layout);
    }

    /// Snapshot the complete display configuration for saving.
    pub fn get_current_view_state(&self) -> ViewState {
        ViewState {
            filters: self.explicit_filters.clone(),
            group_by: self.group_by.clone(),
            search_term: self.search_term.clone(),
            hidden_columns: self.layout.hidden.clone(),
            column_order: self.layout.order.clone(),
            column_widths: self.layout.widths.clone(),
            sort_config: self.sort_config.clone(),
        }
    }

    /// Replace the complete display configuration atomically. The widget
    /// calls are batched so no intermediate state is visible. References to
    /// unknown fields are dropped, never an error.
    pub fn apply_view_state(&mut self, state: &ViewState) {
        let clean = state.sanitized(&self.schema);
        self.explicit_filters = clean.filters;
        self.filter_mode = FilterMode::And;
        self.search_term = clean.search_term.filter(|t| !t.trim().is_empty());
        self.search_group = match &self.search_term {
            Some(term) => search_filters(term, &self.schema.searchable_fields()),
            None => Vec::new(),
        };
        self.group_by = clean.group_by;
        self.sort_config = clean.sort_config;
        self.layout = ColumnLayout {
            order: clean.column_order,
            hidden: clean.hidden_columns,
            widths: clean.column_widths,
        };
        self.refresh_grid();
    }

    /// Ids of rows passing both filter groups, in display (sorted) order.
    pub fn visible_rows(&self) -> Vec<RowId> {
        self.visible_indices()
            .into_iter()
            .filter_map(|idx| self.rows[idx].id(&self.schema.id_field))
            .collect()
    }

    /// Partition the visible rows under the active group-by field,
    /// preserving first-seen key order. Null group values collect under
    /// the empty-string key. Without a group-by this is one unnamed group.
    pub fn grouped_rows(&self) -> Vec<RowGroup> {
        let visible = self.visible_indices();
        let group_field = match &self.group_by {
            Some(f) => f,
            None => {
                let row_ids: Vec<RowId> = visible
                    .iter()
                    .filter_map(|&idx| self.rows[idx].id(&self.schema.id_field))
                    .collect();
                let count = row_ids.len();
                return vec![RowGroup {
                    key: String::new(),
                    row_ids,
                    count,
                }];
            }
        };

        let mut order: Vec<String> = Vec::new();
        let mut buckets: HashMap<String, Vec<RowId>> = HashMap::new();
        for idx in visible {
            let row = &self.rows[idx];
            let key = row
                .get(group_field)
                .map(|v| v.to_string())
                .unwrap_or_default();
            if !buckets.contains_key(&key) {
                order.push(key.clone());
            }
            if let Some(id) = row.id(&self.schema.id_field) {
                buckets.entry(key).or_default().push(id);
            } else {
                buckets.entry(key).or_default();
            }
        }

        order
            .into_iter()
            .map(|key| {
                let row_ids = buckets.remove(&key).unwrap_or_default();
                let count = row_ids.len();
                RowGroup { key, row_ids, count }
            })
            .collect()
    }

    /// Begin an optimistic edit: the new value shows immediately, and the
    /// returned ticket pairs the in-flight request with its response. Each
    /// `(row, field)` key carries its own monotonically increasing sequence
    /// so overlapping edits reconcile last-issued-wins.
    pub fn edit_cell(&mut self, row_id: RowId, field: &str, new_value: JsonValue) -> Result<EditTicket> {
        let id_field = self.schema.id_field.clone();
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id(&id_field) == Some(row_id))
            .ok_or_else(|| ExplorerError::NotFound(format!("row {}", row_id)))?;

        let value = DataValue::from_json(&new_value);
        let current = row.get(field).cloned().unwrap_or(DataValue::Null);
        let entry = self
            .pending
            .entry((row_id, field.to_string()))
            .or_insert(PendingEdit {
                seq: 0,
                last_confirmed: current,
            });
        entry.seq += 1;
        let seq = entry.seq;

        row.set(field, value.clone());
        self.adapter.update_cell(row_id, field, &value);
        debug!(target: "controller", "optimistic edit {}.{} seq {}", row_id, field, seq);

        Ok(EditTicket {
            row_id,
            field: field.to_string(),
            seq,
        })
    }

    /// Fold a mutation response back into the dataset.
    ///
    /// Only the response belonging to the most recently issued request for
    /// its key may touch the visual state. A stale success still refreshes
    /// the rollback baseline (the server did confirm that older write); a
    /// stale failure is discarded outright.
    pub fn resolve_edit(
        &mut self,
        ticket: &EditTicket,
        outcome: Result<Row>,
    ) -> EditResolution {
        let key = (ticket.row_id, ticket.field.clone());
        let latest_seq = match self.pending.get(&key) {
            Some(entry) => entry.seq,
            None => {
                debug!(target: "controller", "response for {}.{} after teardown, discarding",
                       ticket.row_id, ticket.field);
                return EditResolution::Stale;
            }
        };

        if ticket.seq < latest_seq {
            if let Ok(server_row) = &outcome {
                if let Some(value) = server_row.get(&ticket.field) {
                    if let Some(entry) = self.pending.get_mut(&key) {
                        entry.last_confirmed = value.clone();
                    }
                }
            }
            debug!(target: "controller", "stale response for {}.{} (seq {} < {})",
                   ticket.row_id, ticket.field, ticket.seq, latest_seq);
            return EditResolution::Stale;
        }

        let entry = match self.pending.remove(&key) {
            Some(entry) => entry,
            None => return EditResolution::Stale,
        };
        match outcome {
            Ok(server_row) => {
                self.reconcile_row(ticket.row_id, &server_row);
                EditResolution::Applied
            }
            Err(err) => {
                match &err {
                    ExplorerError::Transport(e) => {
                        warn!(target: "controller", "transport failure for {}.{}: {}",
                              ticket.row_id, ticket.field, e);
                    }
                    other => {
                        warn!(target: "controller", "edit rejected for {}.{}: {}",
                              ticket.row_id, ticket.field, other);
                    }
                }
                let id_field = self.schema.id_field.clone();
                if let Some(row) = self
                    .rows
                    .iter_mut()
                    .find(|r| r.id(&id_field) == Some(ticket.row_id))
                {
                    row.set(&ticket.field, entry.last_confirmed.clone());
                    self.adapter
                        .update_cell(ticket.row_id, &ticket.field, &entry.last_confirmed);
                }
                EditResolution::RolledBack(err)
            }
        }
    }

    /// Fold a widget-originated change back into the view state. An inline
    /// edit commit drives the optimistic-edit protocol and yields a ticket.
    pub fn handle_grid_event(&mut self, event: GridEvent) -> Result<Option<EditTicket>> {
        match event {
            GridEvent::CellEdited {
                row_id,
                field,
                new_value,
                ..
            } => self.edit_cell(row_id, &field, new_value).map(Some),
            GridEvent::ColumnMoved { field, to_index } => {
                if self.schema.has_field(&field) {
                    if self.layout.order.is_empty() {
                        self.layout.order = self.schema.field_names();
                    }
                    self.layout.order.retain(|f| *f != field);
                    let idx = to_index.min(self.layout.order.len());
                    self.layout.order.insert(idx, field);
                }
                Ok(None)
            }
            GridEvent::ColumnResized { field, width } => {
                if self.schema.has_field(&field) {
                    self.layout.widths.insert(field, width);
                }
                Ok(None)
            }
            GridEvent::ColumnHidden { field } => {
                if self.schema.has_field(&field) {
                    self.layout.hidden.insert(field);
                }
                Ok(None)
            }
        }
    }

    /// Access to the wrapped widget (scroll restoration and the like)
    pub fn widget(&self) -> &W {
        self.adapter.inner()
    }

    pub fn widget_mut(&mut self) -> &mut W {
        self.adapter.inner_mut()
    }

    // Combined predicate: the explicit group under its mode AND the
    // search group under OR. Both groups empty means show everything.
    fn predicate(&self) -> RowPredicate {
        let explicit = self.explicit_filters.clone();
        let mode = self.filter_mode;
        let search = self.search_group.clone();
        Box::new(move |row: &Row| {
            group_matches(row, &explicit, mode) && group_matches(row, &search, FilterMode::Or)
        })
    }

    fn visible_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&idx| {
                let row = &self.rows[idx];
                group_matches(row, &self.explicit_filters, self.filter_mode)
                    && group_matches(row, &self.search_group, FilterMode::Or)
            })
            .collect();
        self.sort_indices(&mut indices);
        indices
    }

    fn rows_in_display_order(&self) -> Vec<Row> {
        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        self.sort_indices(&mut indices);
        indices.into_iter().map(|idx| self.rows[idx].clone()).collect()
    }

    fn sort_indices(&self, indices: &mut [usize]) {
        if self.sort_config.is_empty() {
            return;
        }
        indices.sort_by(|&a, &b| {
            for entry in &self.sort_config {
                let va = self.rows[a].get(&entry.field).filter(|v| !v.is_null());
                let vb = self.rows[b].get(&entry.field).filter(|v| !v.is_null());
                let ord = match (va, vb) {
                    (None, None) => Ordering::Equal,
                    // Nulls sort after everything, in either direction
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(a), Some(b)) => {
                        let cmp = compare_values(a, b);
                        match entry.direction {
                            SortDirection::Ascending => cmp,
                            SortDirection::Descending => cmp.reverse(),
                        }
                    }
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }

    fn refresh_grid(&mut self) {
        let display = self.rows_in_display_order();
        let layout = self.layout.clone();
        let group_by = self.group_by.clone();
        let predicate = self.predicate();
        self.adapter
            .refresh(&display, &self.schema, predicate, group_by.as_deref(), &layout);
    }

    fn reconcile_row(&mut self, row_id: RowId, server_row: &Row) {
        let id_field = self.schema.id_field.clone();
        let Some(pos) = self.rows.iter().position(|r| r.id(&id_field) == Some(row_id)) else {
            return;
        };
        // Take every authoritative field except those with their own edit
        // still in flight; their optimistic values must keep winning.
        let mut updates: Vec<(String, DataValue)> = Vec::new();
        for (field, value) in server_row.fields() {
            if self.pending.contains_key(&(row_id, field.clone())) {
                continue;
            }
            if self.rows[pos].get(field) != Some(value) {
                updates.push((field.clone(), value.clone()));
            }
        }
        for (field, value) in updates {
            self.rows[pos].set(field.clone(), value.clone());
            self.adapter.update_cell(row_id, &field, &value);
        }
    }
}
