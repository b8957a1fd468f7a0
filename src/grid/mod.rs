//! Grid boundary: the widget capability contract and its adapter

pub mod adapter;
pub mod widget;

pub use adapter::GridAdapter;
pub use widget::{ColumnLayout, GridWidget, RowPredicate};
