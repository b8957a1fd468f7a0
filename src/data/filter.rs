//! Filter specifications and row-level evaluation
//!
//! Filters are `{field, operator, value}` triples. The value side keeps its
//! JSON form so the same shape flows unchanged between the grid, the
//! controller, and the saved-view persistence payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

use crate::data::row::{DataValue, Row};
use crate::data::value_compare::compare_values;

/// The fixed operator set for column filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Exact match (numeric values compare by value, not type)
    Equals,
    /// Case-insensitive substring match on the display text
    Contains,
    /// Membership in a list of candidate values
    In,
    /// Inclusive range; either bound may be omitted
    Range,
}

/// How multiple filters combine within one evaluation. Never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    And,
    Or,
}

/// A single column filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: JsonValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: JsonValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn equals(field: impl Into<String>, value: JsonValue) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    pub fn contains(field: impl Into<String>, needle: &str) -> Self {
        Self::new(field, FilterOperator::Contains, JsonValue::String(needle.to_string()))
    }
}

/// Evaluate one filter against one row.
///
/// A field the row does not carry evaluates as Null; an unknown or
/// malformed filter value simply fails to match. Never errors.
pub fn row_matches(row: &Row, filter: &Filter) -> bool {
    let cell = row.get(&filter.field).cloned().unwrap_or(DataValue::Null);

    match filter.operator {
        FilterOperator::Equals => values_equal(&cell, &DataValue::from_json(&filter.value)),
        FilterOperator::Contains => {
            let needle = match filter.value.as_str() {
                Some(s) => s.to_lowercase(),
                None => filter.value.to_string().to_lowercase(),
            };
            if needle.is_empty() {
                return true;
            }
            cell_text_contains(&cell, &needle)
        }
        FilterOperator::In => match filter.value.as_array() {
            Some(candidates) => candidates
                .iter()
                .any(|c| values_equal(&cell, &DataValue::from_json(c))),
            None => false,
        },
        FilterOperator::Range => {
            if cell.is_null() {
                return false;
            }
            let bounds = match filter.value.as_object() {
                Some(obj) => obj,
                None => return false,
            };
            let min_ok = match bounds.get("min").filter(|v| !v.is_null()) {
                Some(min) => compare_values(&cell, &DataValue::from_json(min)) != Ordering::Less,
                None => true,
            };
            let max_ok = match bounds.get("max").filter(|v| !v.is_null()) {
                Some(max) => compare_values(&cell, &DataValue::from_json(max)) != Ordering::Greater,
                None => true,
            };
            min_ok && max_ok
        }
    }
}

/// Evaluate a filter group under one boolean mode.
/// The empty group matches everything, in either mode.
pub fn group_matches(row: &Row, filters: &[Filter], mode: FilterMode) -> bool {
    if filters.is_empty() {
        return true;
    }
    match mode {
        FilterMode::And => filters.iter().all(|f| row_matches(row, f)),
        FilterMode::Or => filters.iter().any(|f| row_matches(row, f)),
    }
}

/// Filter a row collection, returning indices of matching rows.
pub fn rows_matching(rows: &[Row], filters: &[Filter], mode: FilterMode) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| group_matches(row, filters, mode))
        .map(|(idx, _)| idx)
        .collect()
}

/// Expand a free-text search term into an OR-combined Contains group over
/// the searchable fields. A blank term expands to the empty group.
pub fn search_filters(term: &str, searchable_fields: &[String]) -> Vec<Filter> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }
    searchable_fields
        .iter()
        .map(|field| Filter::contains(field.clone(), term))
        .collect()
}

fn values_equal(a: &DataValue, b: &DataValue) -> bool {
    if a.is_null() || b.is_null() {
        return a.is_null() && b.is_null();
    }
    compare_values(a, b) == Ordering::Equal
}

fn cell_text_contains(cell: &DataValue, needle_lower: &str) -> bool {
    match cell {
        DataValue::Null => false,
        // A list matches if any element does
        DataValue::List(items) => items
            .iter()
            .any(|item| cell_text_contains(item, needle_lower)),
        other => other.to_string().to_lowercase().contains(needle_lower),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(json: JsonValue) -> Row {
        Row::from_json(&json).unwrap()
    }

    #[test]
    fn test_equals_numeric_coercion() {
        let r = row(json!({"age": 30}));
        assert!(row_matches(&r, &Filter::equals("age", json!(30))));
        assert!(row_matches(&r, &Filter::equals("age", json!(30.0))));
        assert!(!row_matches(&r, &Filter::equals("age", json!(31))));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let r = row(json!({"name": "Alice Cooper"}));
        assert!(row_matches(&r, &Filter::contains("name", "alice")));
        assert!(row_matches(&r, &Filter::contains("name", "COOP")));
        assert!(!row_matches(&r, &Filter::contains("name", "bob")));
    }

    #[test]
    fn test_contains_searches_list_elements() {
        let r = row(json!({"tags": ["Billing", "Urgent"]}));
        assert!(row_matches(&r, &Filter::contains("tags", "urgent")));
        assert!(!row_matches(&r, &Filter::contains("tags", "closed")));
    }

    #[test]
    fn test_in_list() {
        let r = row(json!({"status": "open"}));
        let f = Filter::new("status", FilterOperator::In, json!(["open", "pending"]));
        assert!(row_matches(&r, &f));
        let f = Filter::new("status", FilterOperator::In, json!(["closed"]));
        assert!(!row_matches(&r, &f));
    }

    #[test]
    fn test_range_bounds() {
        let r = row(json!({"price": 50}));
        let within = Filter::new("price", FilterOperator::Range, json!({"min": 10, "max": 100}));
        let above = Filter::new("price", FilterOperator::Range, json!({"min": 60}));
        let open_max = Filter::new("price", FilterOperator::Range, json!({"min": 10}));
        assert!(row_matches(&r, &within));
        assert!(!row_matches(&r, &above));
        assert!(row_matches(&r, &open_max));
    }

    #[test]
    fn test_null_cell_never_in_range() {
        let r = row(json!({"price": null}));
        let f = Filter::new("price", FilterOperator::Range, json!({"min": 0}));
        assert!(!row_matches(&r, &f));
    }

    #[test]
    fn test_unknown_field_evaluates_as_null() {
        let r = row(json!({"name": "x"}));
        assert!(!row_matches(&r, &Filter::contains("missing", "x")));
        assert!(row_matches(&r, &Filter::equals("missing", json!(null))));
    }

    #[test]
    fn test_group_modes() {
        let rows = vec![
            row(json!({"a": 1, "b": "x"})),
            row(json!({"a": 2, "b": "x"})),
            row(json!({"a": 2, "b": "y"})),
        ];
        let filters = vec![Filter::equals("a", json!(2)), Filter::equals("b", json!("x"))];

        assert_eq!(rows_matching(&rows, &filters, FilterMode::And), vec![1]);
        assert_eq!(rows_matching(&rows, &filters, FilterMode::Or), vec![0, 1, 2]);
        // Empty group shows everything regardless of mode
        assert_eq!(rows_matching(&rows, &[], FilterMode::And), vec![0, 1, 2]);
        assert_eq!(rows_matching(&rows, &[], FilterMode::Or), vec![0, 1, 2]);
    }

    #[test]
    fn test_search_expansion() {
        let fields = vec!["name".to_string(), "email".to_string()];
        let group = search_filters("ann", &fields);
        assert_eq!(group.len(), 2);
        assert!(group.iter().all(|f| f.operator == FilterOperator::Contains));

        assert!(search_filters("   ", &fields).is_empty());
        assert!(search_filters("", &fields).is_empty());
    }
}
