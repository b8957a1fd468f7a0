use crate::data::row::DataValue;
use std::cmp::Ordering;

/// Utility function to compare two DataValues across all variants.
/// This centralizes comparison logic so sorting and range filters agree.
pub fn compare_values(a: &DataValue, b: &DataValue) -> Ordering {
    match (a, b) {
        // Same-type comparisons
        (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),
        (DataValue::Float(a), DataValue::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (DataValue::String(a), DataValue::String(b)) => a.cmp(b),
        (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),
        // ISO 8601 strings order chronologically when compared lexically
        (DataValue::DateTime(a), DataValue::DateTime(b)) => a.cmp(b),
        (DataValue::List(a), DataValue::List(b)) => compare_lists(a, b),

        // Null handling
        (DataValue::Null, DataValue::Null) => Ordering::Equal,
        (DataValue::Null, _) => Ordering::Less,
        (_, DataValue::Null) => Ordering::Greater,

        // Numeric cross-type comparisons use the actual values
        (DataValue::Integer(i), DataValue::Float(f)) => {
            (*i as f64).partial_cmp(f).unwrap_or(Ordering::Equal)
        }
        (DataValue::Float(f), DataValue::Integer(i)) => {
            f.partial_cmp(&(*i as f64)).unwrap_or(Ordering::Equal)
        }

        // Remaining cross-type comparisons use a fixed type rank:
        // Boolean < Integer/Float < String < DateTime < List
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_lists(a: &[DataValue], b: &[DataValue]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let cmp = compare_values(x, y);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    a.len().cmp(&b.len())
}

fn type_rank(value: &DataValue) -> u8 {
    match value {
        DataValue::Null => 0,
        DataValue::Boolean(_) => 1,
        DataValue::Integer(_) | DataValue::Float(_) => 2,
        DataValue::String(_) => 3,
        DataValue::DateTime(_) => 4,
        DataValue::List(_) => 5,
    }
}

/// Compare values that may be missing entirely (absent column in a row)
pub fn compare_optional_values(a: Option<&DataValue>, b: Option<&DataValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}
