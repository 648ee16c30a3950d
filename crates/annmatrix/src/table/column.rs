//! Typed metadata columns.

use std::fmt;

use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

/// Element type of a metadata column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Int,
    Float,
    Bool,
    Str,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::Int => "int64",
            FieldType::Float => "float64",
            FieldType::Bool => "bool",
            FieldType::Str => "str",
        })
    }
}

/// One entry of a table schema: column name plus element type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub dtype: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, dtype: FieldType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// Values of a single metadata column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Int(Array1<i64>),
    Float(Array1<f64>),
    Bool(Array1<bool>),
    Str(Array1<String>),
}

impl ColumnData {
    /// `0..n` as integers; the default identity column.
    pub fn identity(n: usize) -> Self {
        ColumnData::Int(Array1::from_iter(0..n as i64))
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> FieldType {
        match self {
            ColumnData::Int(_) => FieldType::Int,
            ColumnData::Float(_) => FieldType::Float,
            ColumnData::Bool(_) => FieldType::Bool,
            ColumnData::Str(_) => FieldType::Str,
        }
    }

    /// Gather the given positions into a new column. Positions may repeat.
    pub fn select(&self, positions: &[usize]) -> Self {
        match self {
            ColumnData::Int(v) => ColumnData::Int(v.select(Axis(0), positions)),
            ColumnData::Float(v) => ColumnData::Float(v.select(Axis(0), positions)),
            ColumnData::Bool(v) => ColumnData::Bool(v.select(Axis(0), positions)),
            ColumnData::Str(v) => ColumnData::Str(v.select(Axis(0), positions)),
        }
    }

    /// Entry `i` rendered as text, used for name-based lookups.
    pub fn label(&self, i: usize) -> Option<String> {
        match self {
            ColumnData::Int(v) => v.get(i).map(|x| x.to_string()),
            ColumnData::Float(v) => v.get(i).map(|x| x.to_string()),
            ColumnData::Bool(v) => v.get(i).map(|x| x.to_string()),
            ColumnData::Str(v) => v.get(i).cloned(),
        }
    }

    /// All entries rendered as text.
    pub fn labels(&self) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.label(i)).collect()
    }

    pub fn as_int(&self) -> Option<&Array1<i64>> {
        match self {
            ColumnData::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&Array1<f64>> {
        match self {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<&Array1<bool>> {
        match self {
            ColumnData::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&Array1<String>> {
        match self {
            ColumnData::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Array1<i64>> for ColumnData {
    fn from(v: Array1<i64>) -> Self {
        ColumnData::Int(v)
    }
}

impl From<Array1<f64>> for ColumnData {
    fn from(v: Array1<f64>) -> Self {
        ColumnData::Float(v)
    }
}

impl From<Array1<bool>> for ColumnData {
    fn from(v: Array1<bool>) -> Self {
        ColumnData::Bool(v)
    }
}

impl From<Array1<String>> for ColumnData {
    fn from(v: Array1<String>) -> Self {
        ColumnData::Str(v)
    }
}

impl From<Vec<i64>> for ColumnData {
    fn from(v: Vec<i64>) -> Self {
        ColumnData::Int(Array1::from(v))
    }
}

impl From<Vec<f64>> for ColumnData {
    fn from(v: Vec<f64>) -> Self {
        ColumnData::Float(Array1::from(v))
    }
}

impl From<Vec<bool>> for ColumnData {
    fn from(v: Vec<bool>) -> Self {
        ColumnData::Bool(Array1::from(v))
    }
}

impl From<Vec<String>> for ColumnData {
    fn from(v: Vec<String>) -> Self {
        ColumnData::Str(Array1::from(v))
    }
}

impl From<Vec<&str>> for ColumnData {
    fn from(v: Vec<&str>) -> Self {
        ColumnData::Str(v.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for ColumnData {
    fn from(v: &[&str]) -> Self {
        ColumnData::Str(v.iter().map(|s| s.to_string()).collect())
    }
}
