//! End-to-end explorer flows against a scripted grid widget

use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

use tablex::data::filter::{Filter, FilterMode};
use tablex::data::row::{rows_from_items, DataValue, Row, RowId};
use tablex::grid::{ColumnLayout, GridWidget, RowPredicate};
use tablex::schema::{ColumnDescriptor, ColumnKind, TableSchema};
use tablex::state::events::GridEvent;
use tablex::state::view_state::{SortEntry, ViewState};
use tablex::api::{NewSavedView, SavedView};
use tablex::{EditResolution, ExplorerError, TableController};

/// Shared log of what the widget was asked to do
#[derive(Default)]
struct WidgetLog {
    /// Number of visible repaints (state changes outside a batch count
    /// one each; a whole batch counts one at its end)
    paints: usize,
    batch_depth: usize,
    dirty_in_batch: bool,
    rows: Vec<Row>,
    id_field: String,
    filtered_ids: Option<Vec<RowId>>,
    group_by: Option<String>,
    layout: ColumnLayout,
    cell_updates: Vec<(RowId, String, String)>,
    reject_filters: bool,
}

impl WidgetLog {
    fn mark_dirty(&mut self) {
        if self.batch_depth == 0 {
            self.paints += 1;
        } else {
            self.dirty_in_batch = true;
        }
    }
}

#[derive(Clone, Default)]
struct ScriptedWidget {
    log: Rc<RefCell<WidgetLog>>,
}

impl GridWidget for ScriptedWidget {
    fn set_rows(&mut self, rows: &[Row], schema: &TableSchema) {
        let mut log = self.log.borrow_mut();
        log.rows = rows.to_vec();
        log.id_field = schema.id_field.clone();
        log.mark_dirty();
    }

    fn apply_predicate(&mut self, predicate: RowPredicate) -> Result<(), String> {
        let mut log = self.log.borrow_mut();
        if log.reject_filters {
            return Err("scripted rejection".to_string());
        }
        let id_field = log.id_field.clone();
        let ids = log
            .rows
            .iter()
            .filter(|row| predicate(row))
            .filter_map(|row| row.id(&id_field))
            .collect();
        log.filtered_ids = Some(ids);
        log.mark_dirty();
        Ok(())
    }

    fn set_group_by(&mut self, field: Option<&str>) -> Result<(), String> {
        let mut log = self.log.borrow_mut();
        log.group_by = field.map(String::from);
        log.mark_dirty();
        Ok(())
    }

    fn set_column_layout(&mut self, layout: &ColumnLayout) -> Result<(), String> {
        let mut log = self.log.borrow_mut();
        log.layout = layout.clone();
        log.mark_dirty();
        Ok(())
    }

    fn update_cell(&mut self, row_id: RowId, field: &str, value: &DataValue) {
        let mut log = self.log.borrow_mut();
        log.cell_updates
            .push((row_id, field.to_string(), value.to_string()));
        log.mark_dirty();
    }

    fn begin_batch(&mut self) {
        self.log.borrow_mut().batch_depth += 1;
    }

    fn end_batch(&mut self) {
        let mut log = self.log.borrow_mut();
        log.batch_depth -= 1;
        if log.batch_depth == 0 && log.dirty_in_batch {
            log.dirty_in_batch = false;
            log.paints += 1;
        }
    }
}

fn users_schema() -> TableSchema {
    TableSchema::new("users", "users")
        .with_column(ColumnDescriptor::new("id", "ID").with_kind(ColumnKind::Number))
        .with_column(ColumnDescriptor::new("name", "Name").editable())
        .with_column(ColumnDescriptor::new("email", "Email").editable())
        .with_column(
            ColumnDescriptor::new("role", "Role")
                .with_kind(ColumnKind::Enum)
                .groupable()
                .with_options(["admin", "member", "guest"]),
        )
        .with_searchable(["name", "email", "role"])
}

fn sample_rows() -> Vec<Row> {
    rows_from_items(
        json!([
            {"id": 1, "name": "Bob",  "email": "bob@x.io",  "role": "admin"},
            {"id": 2, "name": "Amy",  "email": "amy@x.io",  "role": "member"},
            {"id": 3, "name": null,   "email": "c@x.io",    "role": "member"},
            {"id": 4, "name": "Dina", "email": "dina@y.io", "role": "guest"},
        ])
        .as_array()
        .unwrap(),
    )
}

fn explorer() -> (TableController<ScriptedWidget>, Rc<RefCell<WidgetLog>>) {
    let widget = ScriptedWidget::default();
    let log = widget.log.clone();
    let mut controller = TableController::new(users_schema(), widget);
    controller.load(sample_rows());
    (controller, log)
}

#[test]
fn apply_view_state_paints_exactly_once() {
    let (mut controller, log) = explorer();
    let before = log.borrow().paints;

    let state: ViewState = serde_json::from_value(json!({
        "filters": [{"field": "role", "operator": "in", "value": ["member", "guest"]}],
        "group_by": "role",
        "hidden_columns": ["email"],
        "column_order": ["name", "role", "email", "id"],
        "column_widths": {"name": 180},
        "sort_config": [{"field": "name", "direction": "ascending"}]
    }))
    .unwrap();
    controller.apply_view_state(&state);

    // One repaint for the whole configuration, no intermediate states
    assert_eq!(log.borrow().paints, before + 1);
    assert_eq!(log.borrow().group_by.as_deref(), Some("role"));
    assert!(log.borrow().layout.hidden.contains("email"));
}

#[test]
fn widget_sees_filtered_subset() {
    let (mut controller, log) = explorer();
    controller.apply_filter(
        vec![Filter::equals("role", json!("member"))],
        FilterMode::And,
    );
    assert_eq!(log.borrow().filtered_ids, Some(vec![2, 3]));

    // Search narrows within the widget's filter too
    controller.set_search_term("amy");
    assert_eq!(log.borrow().filtered_ids, Some(vec![2]));

    controller.set_search_term("");
    assert_eq!(log.borrow().filtered_ids, Some(vec![2, 3]));
}

#[test]
fn widget_rejection_leaves_previous_filter_active() {
    let (mut controller, log) = explorer();
    controller.apply_filter(
        vec![Filter::equals("role", json!("member"))],
        FilterMode::And,
    );
    assert_eq!(log.borrow().filtered_ids, Some(vec![2, 3]));

    log.borrow_mut().reject_filters = true;
    controller.apply_filter(vec![Filter::equals("role", json!("guest"))], FilterMode::And);

    // The widget kept its previous visual state...
    assert_eq!(log.borrow().filtered_ids, Some(vec![2, 3]));
    // ...while the controller's own projection moved on, and nothing panicked
    assert_eq!(controller.visible_rows(), vec![4]);
}

#[test]
fn sort_pushes_display_order_with_nulls_last() {
    let (mut controller, log) = explorer();
    controller.set_sort(vec![SortEntry::desc("name")]);

    let names: Vec<String> = log
        .borrow()
        .rows
        .iter()
        .map(|r| r.get("name").map(|v| v.to_string()).unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Dina", "Bob", "Amy", ""]);
}

#[test]
fn optimistic_edit_reaches_widget_then_rolls_back() {
    let (mut controller, log) = explorer();
    let ticket = controller.edit_cell(1, "name", json!("Robert")).unwrap();
    assert_eq!(
        log.borrow().cell_updates.last().unwrap(),
        &(1, "name".to_string(), "Robert".to_string())
    );

    let resolution = controller.resolve_edit(
        &ticket,
        Err(ExplorerError::MutationRejected("boom".to_string())),
    );
    assert!(matches!(resolution, EditResolution::RolledBack(_)));
    assert_eq!(
        log.borrow().cell_updates.last().unwrap(),
        &(1, "name".to_string(), "Bob".to_string())
    );
}

#[test]
fn concurrent_edits_same_cell_last_issued_wins() {
    let (mut controller, _log) = explorer();
    let first = controller.edit_cell(1, "role", json!("A")).unwrap();
    let second = controller.edit_cell(1, "role", json!("B")).unwrap();

    // Server answers the first request only after the second was issued
    let row_b = Row::from_json(&json!({"id": 1, "name": "Bob", "email": "bob@x.io", "role": "B"}))
        .unwrap();
    assert!(matches!(
        controller.resolve_edit(&second, Ok(row_b)),
        EditResolution::Applied
    ));
    let row_a = Row::from_json(&json!({"id": 1, "name": "Bob", "email": "bob@x.io", "role": "A"}))
        .unwrap();
    assert!(matches!(
        controller.resolve_edit(&first, Ok(row_a)),
        EditResolution::Stale
    ));

    assert_eq!(controller.rows()[0].get("role").unwrap().to_string(), "B");
}

#[test]
fn saved_view_reproduces_hidden_column_exactly() {
    let (mut controller, _log) = explorer();
    controller.hide_column("email");
    controller.set_group_by(Some("role"));

    // Save: snapshot → create payload → what the server would echo back
    let snapshot = controller.get_current_view_state();
    let payload =
        serde_json::to_value(NewSavedView::new("My view", "users", snapshot.clone())).unwrap();
    let mut stored = payload;
    stored["id"] = json!(7);
    stored["created_at"] = json!("2024-05-01T08:00:00Z");
    stored["updated_at"] = json!("2024-05-01T08:00:00Z");
    let saved: SavedView = serde_json::from_value(stored).unwrap();

    // Reload into a fresh controller over the same table
    let widget = ScriptedWidget::default();
    let mut fresh = TableController::new(users_schema(), widget);
    fresh.load(sample_rows());
    fresh.apply_view_state(&saved.state);

    let state = fresh.get_current_view_state();
    assert!(state.hidden_columns.contains("email"));
    assert_eq!(state.hidden_columns.len(), 1);
    assert_eq!(state.group_by.as_deref(), Some("role"));
    assert_eq!(state, snapshot);
}

#[test]
fn inline_edit_event_flows_through_edit_protocol() {
    let (mut controller, log) = explorer();
    let ticket = controller
        .handle_grid_event(GridEvent::CellEdited {
            row_id: 4,
            field: "email".to_string(),
            old_value: json!("dina@y.io"),
            new_value: json!("dina@z.io"),
        })
        .unwrap()
        .expect("edit commits yield a ticket");

    assert_eq!(ticket.row_id, 4);
    assert!(log
        .borrow()
        .cell_updates
        .iter()
        .any(|(id, field, value)| *id == 4 && field == "email" && value == "dina@z.io"));
}
