use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Stable server-issued row identifier
pub type RowId = i64;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // ISO 8601 string
    List(Vec<DataValue>),
    Null,
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Convert a JSON value into a cell value.
    ///
    /// Strings that look like ISO dates become `DateTime` so that sorting
    /// and range filters order them chronologically.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    DataValue::Float(f)
                } else {
                    DataValue::String(n.to_string())
                }
            }
            JsonValue::String(s) => {
                if looks_like_datetime(s) {
                    DataValue::DateTime(s.clone())
                } else {
                    DataValue::String(s.clone())
                }
            }
            JsonValue::Array(items) => {
                DataValue::List(items.iter().map(DataValue::from_json).collect())
            }
            // Nested objects are opaque to the grid; keep their JSON text
            JsonValue::Object(_) => DataValue::String(json.to_string()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            DataValue::String(s) => JsonValue::String(s.clone()),
            DataValue::Integer(i) => JsonValue::from(*i),
            DataValue::Float(f) => {
                serde_json::Number::from_f64(*f).map(JsonValue::Number).unwrap_or(JsonValue::Null)
            }
            DataValue::Boolean(b) => JsonValue::Bool(*b),
            DataValue::DateTime(dt) => JsonValue::String(dt.clone()),
            DataValue::List(items) => {
                JsonValue::Array(items.iter().map(DataValue::to_json).collect())
            }
            DataValue::Null => JsonValue::Null,
        }
    }
}

/// Simple heuristic: ISO-ish strings ("2024-01-01", "2024-01-01T10:00:00Z")
fn looks_like_datetime(s: &str) -> bool {
    s.len() >= 8
        && s.len() <= 35
        && s.as_bytes().first().is_some_and(|b| b.is_ascii_digit())
        && s.matches('-').count() >= 2
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            DataValue::Null => write!(f, ""),
        }
    }
}

/// One entity instance: an opaque mapping from field name to value.
///
/// Rows are created on fetch, mutated in place when an edit is confirmed,
/// and replaced wholesale on refetch. The identifier lives in whichever
/// field the table schema names as `id_field`.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: HashMap<String, DataValue>,
}

impl Row {
    pub fn new() -> Self {
        Self { values: HashMap::new() }
    }

    /// Build a row from a fetched JSON object. Returns None for non-objects.
    pub fn from_json(json: &JsonValue) -> Option<Self> {
        let obj = json.as_object()?;
        let values = obj
            .iter()
            .map(|(k, v)| (k.clone(), DataValue::from_json(v)))
            .collect();
        Some(Self { values })
    }

    pub fn get(&self, field: &str) -> Option<&DataValue> {
        self.values.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: DataValue) {
        self.values.insert(field.into(), value);
    }

    /// The row's stable identifier, read from the given id field.
    pub fn id(&self, id_field: &str) -> Option<RowId> {
        match self.values.get(id_field) {
            Some(DataValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &DataValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Convert a fetched `items` payload into rows, skipping non-object entries.
pub fn rows_from_items(items: &[JsonValue]) -> Vec<Row> {
    items.iter().filter_map(Row::from_json).collect()
}
