//! Per-axis metadata tables.
//!
//! A [`BoundTable`] is an ordered set of named, equally long columns. One of
//! them is the identity column ([`SAMPLE_NAMES`] on the row axis,
//! [`VARIABLE_NAMES`] on the column axis), which is filled with `0..n` when the
//! source does not supply it.
//!
//! Tables owned by an annotated matrix carry that matrix's [`OwnerId`]. Adding
//! a column to such a table does not mutate it: [`BoundTable::append_column`]
//! returns a [`SlotReplacement`] which the owner applies.

mod binding;
mod column;
mod source;

use std::collections::HashSet;
use std::fmt;

use crate::error::{MatrixError, Result};
use crate::storage::complement;

pub use binding::{OwnerId, SlotReplacement};
pub use column::{ColumnData, Field, FieldType};
pub use source::MetadataSource;

/// Identity column name on the row axis.
pub const SAMPLE_NAMES: &str = "sample_names";

/// Identity column name on the column axis.
pub const VARIABLE_NAMES: &str = "variable_names";

/// Which matrix axis a table describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableRole {
    Row,
    Column,
}

impl TableRole {
    pub fn identity_name(&self) -> &'static str {
        match self {
            TableRole::Row => SAMPLE_NAMES,
            TableRole::Column => VARIABLE_NAMES,
        }
    }

    /// The other axis.
    pub fn flip(&self) -> TableRole {
        match self {
            TableRole::Row => TableRole::Column,
            TableRole::Column => TableRole::Row,
        }
    }
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableRole::Row => "row",
            TableRole::Column => "column",
        })
    }
}

/// Length mismatch between a table and the axis it describes.
pub(crate) fn axis_mismatch(role: TableRole, expected: usize, got: usize) -> MatrixError {
    match role {
        TableRole::Row => MatrixError::RowCountMismatch { expected, got },
        TableRole::Column => MatrixError::ColumnCountMismatch { expected, got },
    }
}

fn schema_of(columns: &[(String, ColumnData)]) -> Vec<Field> {
    columns
        .iter()
        .map(|(name, data)| Field::new(name.clone(), data.dtype()))
        .collect()
}

/// Metadata table for one axis of an annotated matrix.
#[derive(Clone, Debug)]
pub struct BoundTable {
    role: TableRole,
    row_count: usize,
    columns: Vec<(String, ColumnData)>,
    identity: usize,
    owner: Option<OwnerId>,
    revision: u64,
}

impl BoundTable {
    /// Build a table with `row_count` rows from `source`.
    ///
    /// Columns keep the source's order. The identity column is appended as
    /// `0..row_count` when the source lacks it.
    ///
    /// # Errors
    ///
    /// - [`MatrixError::InvalidMetadataSource`] for JSON that is not an object of arrays
    /// - [`MatrixError::SchemaConstructionError`] on duplicate or empty names
    /// - [`MatrixError::RowCountMismatch`] / [`MatrixError::ColumnCountMismatch`]
    ///   when a column's length differs from `row_count`
    pub fn build(
        source: impl Into<MetadataSource>,
        row_count: usize,
        role: TableRole,
        owner: Option<OwnerId>,
    ) -> Result<Self> {
        let mut columns = source.into().into_columns()?;

        let mut seen = HashSet::with_capacity(columns.len());
        for (name, _) in &columns {
            let reason = if name.is_empty() {
                Some("empty field name".to_string())
            } else if !seen.insert(name.as_str()) {
                Some(format!("duplicate field {name:?}"))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(MatrixError::SchemaConstructionError {
                    reason,
                    schema: schema_of(&columns),
                });
            }
        }

        for (_, data) in &columns {
            if data.len() != row_count {
                return Err(axis_mismatch(role, row_count, data.len()));
            }
        }

        let identity_name = role.identity_name();
        let identity = match columns.iter().position(|(name, _)| name == identity_name) {
            Some(pos) => pos,
            None => {
                columns.push((identity_name.to_string(), ColumnData::identity(row_count)));
                columns.len() - 1
            }
        };

        tracing::trace!(%role, row_count, n_columns = columns.len(), "built metadata table");
        Ok(Self {
            role,
            row_count,
            columns,
            identity,
            owner,
            revision: 0,
        })
    }

    pub fn role(&self) -> TableRole {
        self.role
    }

    /// Number of entries in every column.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }

    /// Edit counter, bumped by every in-place change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn identity_name(&self) -> &str {
        &self.columns[self.identity].0
    }

    pub fn identity(&self) -> &ColumnData {
        &self.columns[self.identity].1
    }

    /// Column by name, identity included.
    ///
    /// # Errors
    ///
    /// [`MatrixError::KeyNotFound`] when no column has that name.
    pub fn get(&self, name: &str) -> Result<&ColumnData> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
            .ok_or_else(|| MatrixError::KeyNotFound {
                key: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Names of the annotation columns, identity excluded.
    pub fn columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.identity)
            .map(|(_, (name, _))| name.as_str())
            .collect()
    }

    /// Every column name in order, identity included.
    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn schema(&self) -> Vec<Field> {
        schema_of(&self.columns)
    }

    /// `(name, values)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnData)> {
        self.columns.iter().map(|(name, data)| (name.as_str(), data))
    }

    /// Rebuild this table with one more column, for the owner to apply.
    ///
    /// The table itself is not modified.
    ///
    /// # Errors
    ///
    /// - [`MatrixError::UnboundTable`] when the table has no owner
    /// - [`MatrixError::ColumnTooLong`] / [`MatrixError::ColumnTooShort`]
    /// - [`MatrixError::SchemaConstructionError`] when `name` already exists
    pub fn append_column(
        &self,
        name: impl Into<String>,
        values: impl Into<ColumnData>,
    ) -> Result<SlotReplacement> {
        let Some(owner) = self.owner else {
            return Err(MatrixError::UnboundTable { role: self.role });
        };
        let name = name.into();
        let values = values.into();
        let got = values.len();
        if got > self.row_count {
            return Err(MatrixError::ColumnTooLong {
                column: name,
                got,
                row_count: self.row_count,
            });
        }
        if got < self.row_count {
            return Err(MatrixError::ColumnTooShort {
                column: name,
                got,
                row_count: self.row_count,
            });
        }

        let mut columns = self.columns.clone();
        columns.push((name, values));
        let table = BoundTable::build(
            MetadataSource::Columns(columns),
            self.row_count,
            self.role,
            Some(owner),
        )?;
        Ok(SlotReplacement {
            owner,
            role: self.role,
            revision: self.revision,
            table,
        })
    }

    /// Replace a column's values in place, or append a new column.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ColumnLengthMismatch`] unless `values` has exactly
    /// [`row_count`](Self::row_count) entries.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        values: impl Into<ColumnData>,
    ) -> Result<()> {
        let name = name.into();
        let values = values.into();
        if values.len() != self.row_count {
            return Err(MatrixError::ColumnLengthMismatch {
                column: name,
                expected: self.row_count,
                got: values.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = values,
            None => self.columns.push((name, values)),
        }
        self.revision += 1;
        Ok(())
    }

    /// Gather rows at `positions` into an unbound copy.
    ///
    /// Positions must be in bounds; they may repeat.
    pub fn select(&self, positions: &[usize]) -> BoundTable {
        BoundTable {
            role: self.role,
            row_count: positions.len(),
            columns: self
                .columns
                .iter()
                .map(|(name, data)| (name.clone(), data.select(positions)))
                .collect(),
            identity: self.identity,
            owner: None,
            revision: 0,
        }
    }

    /// Drop rows at `positions` in place.
    pub fn delete_rows(&mut self, positions: &[usize]) {
        let keep = complement(self.row_count, positions);
        for (_, data) in &mut self.columns {
            *data = data.select(&keep);
        }
        self.row_count = keep.len();
        self.revision += 1;
    }

    /// Re-label this table for the other axis, renaming the identity column.
    ///
    /// The result is unbound.
    ///
    /// # Errors
    ///
    /// [`MatrixError::SchemaConstructionError`] when an annotation column
    /// already carries the new identity name.
    pub fn reinterpret(mut self, role: TableRole) -> Result<BoundTable> {
        self.owner = None;
        if role == self.role {
            return Ok(self);
        }
        let new_name = role.identity_name();
        let clash = self
            .columns
            .iter()
            .enumerate()
            .any(|(i, (name, _))| i != self.identity && name == new_name);
        if clash {
            return Err(MatrixError::SchemaConstructionError {
                reason: format!("identity column {new_name:?} already exists"),
                schema: self.schema(),
            });
        }
        self.columns[self.identity].0 = new_name.to_string();
        self.role = role;
        Ok(self)
    }

    pub(crate) fn bind(&mut self, owner: OwnerId) {
        self.owner = Some(owner);
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub(crate) fn into_columns(self) -> Vec<(String, ColumnData)> {
        self.columns
    }
}

/// Tables compare by role and contents; owner and revision are ignored.
impl PartialEq for BoundTable {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role
            && self.row_count == other.row_count
            && self.identity == other.identity
            && self.columns == other.columns
    }
}
