pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod logging;
pub mod schema;
pub mod state;
pub mod table_controller;

pub use error::{ExplorerError, Result};
pub use schema::{ColumnDescriptor, ColumnKind, TableSchema};
pub use state::view_state::ViewState;
pub use table_controller::{EditResolution, EditTicket, TableController};
