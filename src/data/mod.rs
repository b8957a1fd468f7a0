//! Data layer: row model, value ordering, filter evaluation
//!
//! This module keeps data representation separate from presentation;
//! nothing in here knows about the grid widget.

pub mod filter;
pub mod row;
pub mod value_compare;

pub use filter::{Filter, FilterMode, FilterOperator};
pub use row::{DataValue, Row, RowId};
