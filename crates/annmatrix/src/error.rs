//! Error type shared by storage, tables and matrices.

use crate::table::{Field, TableRole};

/// Errors raised while building, slicing or mutating an annotated matrix.
///
/// Every variant is returned to the immediate caller. Validation always runs
/// before mutation, so an `Err` never leaves a matrix half-updated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    #[error("storage needs to be one of [{}], not {found}", .allowed.join(", "))]
    UnsupportedStorageType {
        found: String,
        allowed: Vec<&'static str>,
    },

    #[error("storage needs to be 2-dimensional, not {ndim}D")]
    InvalidRank { ndim: usize },

    #[error("row metadata needs {expected} rows (one per matrix row), but has {got}")]
    RowCountMismatch { expected: usize, got: usize },

    #[error("column metadata needs {expected} rows (one per matrix column), but has {got}")]
    ColumnCountMismatch { expected: usize, got: usize },

    #[error("metadata needs to be a table or a name -> values mapping, not {found}")]
    InvalidMetadataSource { found: String },

    #[error("cannot assemble metadata schema ({reason}): {}", format_schema(.schema))]
    SchemaConstructionError { reason: String, schema: Vec<Field> },

    #[error("new column {column:?} has too many entries ({got} > {row_count})")]
    ColumnTooLong {
        column: String,
        got: usize,
        row_count: usize,
    },

    #[error("new column {column:?} has too few entries ({got} < {row_count})")]
    ColumnTooShort {
        column: String,
        got: usize,
        row_count: usize,
    },

    #[error("column {column:?} needs exactly {expected} entries, got {got}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("no metadata column named {key:?}")]
    KeyNotFound { key: String },

    #[error("no dataset metadata under key {key:?}")]
    MetadataKeyNotFound { key: String },

    #[error("deletion must span all rows or all columns")]
    UnsupportedDeletion,

    #[error("index {index} is out of bounds for {role} axis of length {len}")]
    IndexOutOfBounds {
        index: isize,
        len: usize,
        role: TableRole,
    },

    #[error("boolean mask has {got} entries but the {role} axis has {expected}")]
    MaskLengthMismatch {
        expected: usize,
        got: usize,
        role: TableRole,
    },

    #[error("slice step cannot be zero")]
    ZeroSliceStep,

    #[error("no {role} named {name:?}")]
    UnknownName { name: String, role: TableRole },

    #[error("{what}: expected shape {expected:?}, got {got:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("{role} table is not bound to a matrix")]
    UnboundTable { role: TableRole },

    #[error("table replacement targets matrix #{expected}, not matrix #{got}")]
    OwnerMismatch { expected: u64, got: u64 },

    #[error("stale {role} table replacement: built at revision {got}, table is at {expected}")]
    StaleReplacement {
        role: TableRole,
        expected: u64,
        got: u64,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MatrixError>;

fn format_schema(schema: &[Field]) -> String {
    let fields: Vec<String> = schema
        .iter()
        .map(|f| format!("({:?}, {})", f.name, f.dtype))
        .collect();
    format!("[{}]", fields.join(", "))
}
