//! View-state model and widget-originated events
//!
//! These are plain values orchestrated by the TableController; nothing in
//! here touches the network or the widget directly.

pub mod events;
pub mod view_state;

pub use events::GridEvent;
pub use view_state::{SortDirection, SortEntry, ViewState};
