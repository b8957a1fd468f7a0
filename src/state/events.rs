//! Widget-originated events
//!
//! The grid widget reports user interactions (inline edit commits, column
//! drags and resizes) through this surface; the TableController folds them
//! back into its view state.

use serde_json::Value as JsonValue;

use crate::data::row::RowId;

/// Events emitted by the grid boundary
#[derive(Debug, Clone)]
pub enum GridEvent {
    /// A user committed an inline cell edit
    CellEdited {
        row_id: RowId,
        field: String,
        old_value: JsonValue,
        new_value: JsonValue,
    },

    /// A column was dragged to a new position
    ColumnMoved { field: String, to_index: usize },

    /// A column was resized
    ColumnResized { field: String, width: u32 },

    /// A column was hidden through the widget's own UI
    ColumnHidden { field: String },
}
