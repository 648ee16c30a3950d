//! Inputs accepted when building a [`BoundTable`](super::BoundTable).

use std::collections::BTreeMap;

use serde_json::Value;

use super::column::{ColumnData, Field, FieldType};
use super::BoundTable;
use crate::error::{MatrixError, Result};

/// Where a metadata table's columns come from.
#[derive(Clone, Debug, Default)]
pub enum MetadataSource {
    /// Only the identity column, filled with `0..n`.
    #[default]
    Empty,
    /// Copy an existing table's columns and field types verbatim.
    Table(BoundTable),
    /// Named columns, kept in the given order.
    Columns(Vec<(String, ColumnData)>),
    /// A JSON object whose members are arrays, one per column.
    ///
    /// Members become columns in sorted key order.
    Json(Value),
}

impl MetadataSource {
    /// Build a column source from `(name, values)` pairs.
    pub fn columns<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ColumnData>,
    {
        MetadataSource::Columns(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Resolve into an ordered column list.
    pub(crate) fn into_columns(self) -> Result<Vec<(String, ColumnData)>> {
        match self {
            MetadataSource::Empty => Ok(Vec::new()),
            MetadataSource::Table(table) => Ok(table.into_columns()),
            MetadataSource::Columns(columns) => Ok(columns),
            MetadataSource::Json(value) => columns_from_json(value),
        }
    }
}

impl From<BoundTable> for MetadataSource {
    fn from(table: BoundTable) -> Self {
        MetadataSource::Table(table)
    }
}

impl From<Vec<(String, ColumnData)>> for MetadataSource {
    fn from(columns: Vec<(String, ColumnData)>) -> Self {
        MetadataSource::Columns(columns)
    }
}

impl From<BTreeMap<String, ColumnData>> for MetadataSource {
    fn from(columns: BTreeMap<String, ColumnData>) -> Self {
        MetadataSource::Columns(columns.into_iter().collect())
    }
}

impl From<Value> for MetadataSource {
    fn from(value: Value) -> Self {
        MetadataSource::Json(value)
    }
}

impl<T: Into<MetadataSource>> From<Option<T>> for MetadataSource {
    fn from(source: Option<T>) -> Self {
        source.map_or(MetadataSource::Empty, Into::into)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn columns_from_json(value: Value) -> Result<Vec<(String, ColumnData)>> {
    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(MatrixError::InvalidMetadataSource {
                found: format!("JSON {}", json_kind(&other)),
            });
        }
    };

    let mut columns = Vec::with_capacity(object.len());
    let mut schema = Vec::with_capacity(object.len());
    for (name, member) in object {
        let items = match member {
            Value::Array(items) => items,
            other => {
                return Err(MatrixError::InvalidMetadataSource {
                    found: format!("JSON member {name:?} of type {}", json_kind(&other)),
                });
            }
        };
        let Some(column) = column_from_json(&items) else {
            return Err(MatrixError::SchemaConstructionError {
                reason: format!("column {name:?} mixes value types"),
                schema,
            });
        };
        schema.push(Field::new(name.clone(), column.dtype()));
        columns.push((name, column));
    }
    Ok(columns)
}

/// Type a JSON array by its elements; `None` for mixed or nested arrays.
///
/// An empty array becomes an empty integer column.
fn column_from_json(items: &[Value]) -> Option<ColumnData> {
    let dtype = if items.iter().all(|v| v.is_i64()) {
        FieldType::Int
    } else if items.iter().all(Value::is_number) {
        FieldType::Float
    } else if items.iter().all(Value::is_boolean) {
        FieldType::Bool
    } else if items.iter().all(Value::is_string) {
        FieldType::Str
    } else {
        return None;
    };

    let column = match dtype {
        FieldType::Int => ColumnData::Int(items.iter().filter_map(Value::as_i64).collect()),
        FieldType::Float => ColumnData::Float(items.iter().filter_map(Value::as_f64).collect()),
        FieldType::Bool => ColumnData::Bool(items.iter().filter_map(Value::as_bool).collect()),
        FieldType::Str => ColumnData::Str(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
        ),
    };
    Some(column)
}
