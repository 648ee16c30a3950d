//! The annotated matrix: numeric storage plus one metadata table per axis.
//!
//! # Construction
//!
//! - [`AnnotatedMatrix::new`]: storage only, identity-only tables
//! - [`AnnotatedMatrix::builder`]: storage plus optional metadata, vis and meta
//! - [`AnnotatedMatrix::from_parts`]: the same, positionally
//! - [`AnnotatedMatrix::from_flat`]: storage plus flat identity arrays
//!
//! Every path builds both tables, binds them to a fresh [`OwnerId`] and runs
//! [`check_dimensions`] before returning.
//!
//! # Sharing
//!
//! Selection and transpose copy storage and tables. The `vis` and `meta` maps
//! are shared behind `Arc` and copied on first write, so no matrix observes
//! another's later edits.

mod check;
mod meta;
mod selector;

use std::sync::Arc;

use bon::Builder;
use serde_json::Value;

use crate::error::{MatrixError, Result};
use crate::storage::{AssignValue, Storage, StorageKind};
use crate::table::{
    BoundTable, ColumnData, MetadataSource, OwnerId, SAMPLE_NAMES, SlotReplacement, TableRole,
    VARIABLE_NAMES,
};

pub use check::check_dimensions;
pub use meta::{ColorSpec, Meta, Vis};
pub use selector::Selector;

/// Inputs to [`AnnotatedMatrix`] construction, filled in through
/// [`AnnotatedMatrix::builder`].
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct MatrixParts {
    /// Numeric data, samples x variables.
    #[builder(into)]
    pub storage: Storage,

    /// Row (sample) annotations. Default: identity column only.
    #[builder(default, into)]
    pub row_meta: MetadataSource,

    /// Column (variable) annotations. Default: identity column only.
    #[builder(default, into)]
    pub col_meta: MetadataSource,

    /// Colour hints keyed by annotation column.
    #[builder(default)]
    pub vis: Vis,

    /// Free-form dataset metadata.
    #[builder(default)]
    pub meta: Meta,
}

impl<S: matrix_parts_builder::IsComplete> MatrixPartsBuilder<S> {
    /// Build the matrix and validate its dimensions.
    ///
    /// # Errors
    ///
    /// Any error of [`BoundTable::build`] for either table, then
    /// [`MatrixError::RowCountMismatch`] / [`MatrixError::ColumnCountMismatch`].
    pub fn build(self) -> Result<AnnotatedMatrix> {
        let parts = self.__build_internal();
        AnnotatedMatrix::assemble(
            parts.storage,
            parts.row_meta,
            parts.col_meta,
            Arc::new(parts.vis),
            Arc::new(parts.meta),
        )
    }
}

/// A samples x variables matrix with per-axis metadata tables.
///
/// # Example
///
/// ```
/// use annmatrix::{AnnotatedMatrix, MetadataSource, Selector};
/// use ndarray::array;
///
/// let mut m = AnnotatedMatrix::builder()
///     .storage(array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]])
///     .row_meta(MetadataSource::columns([("batch", vec!["A", "B"])]))
///     .build()
///     .unwrap();
///
/// let first = m.select(0, ..).unwrap();
/// assert_eq!(first.shape(), (1, 3));
///
/// m.set_meta("k", 1);
/// assert_eq!(m.meta_value("k").unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct AnnotatedMatrix {
    storage: Storage,
    row_table: BoundTable,
    col_table: BoundTable,
    vis: Arc<Vis>,
    meta: Arc<Meta>,
    owner: OwnerId,
}

impl AnnotatedMatrix {
    pub fn builder() -> MatrixPartsBuilder {
        MatrixParts::builder()
    }

    /// Wrap storage with identity-only tables.
    pub fn new(storage: impl Into<Storage>) -> Result<Self> {
        Self::builder().storage(storage).build()
    }

    pub fn from_parts(
        storage: impl Into<Storage>,
        row_meta: impl Into<MetadataSource>,
        col_meta: impl Into<MetadataSource>,
        vis: Vis,
        meta: Meta,
    ) -> Result<Self> {
        Self::builder()
            .storage(storage)
            .row_meta(row_meta)
            .col_meta(col_meta)
            .vis(vis)
            .meta(meta)
            .build()
    }

    /// Build from storage and flat identity arrays.
    ///
    /// A missing identity array falls back to `0..n`.
    pub fn from_flat(
        storage: impl Into<Storage>,
        row_identities: Option<ColumnData>,
        col_identities: Option<ColumnData>,
        meta: Meta,
    ) -> Result<Self> {
        let identity_only = |name: &str, ids: Option<ColumnData>| {
            ids.map_or(MetadataSource::Empty, |ids| {
                MetadataSource::columns([(name, ids)])
            })
        };
        Self::builder()
            .storage(storage)
            .row_meta(identity_only(SAMPLE_NAMES, row_identities))
            .col_meta(identity_only(VARIABLE_NAMES, col_identities))
            .meta(meta)
            .build()
    }

    fn assemble(
        storage: Storage,
        row_meta: MetadataSource,
        col_meta: MetadataSource,
        vis: Arc<Vis>,
        meta: Arc<Meta>,
    ) -> Result<Self> {
        let owner = OwnerId::fresh();
        let (n_rows, n_cols) = storage.shape();
        let row_table = BoundTable::build(row_meta, n_rows, TableRole::Row, Some(owner))?;
        let col_table = BoundTable::build(col_meta, n_cols, TableRole::Column, Some(owner))?;
        check_dimensions(storage.shape(), &row_table, &col_table)?;

        tracing::debug!(
            %owner,
            kind = %storage.kind(),
            n_rows,
            n_cols,
            "constructed annotated matrix"
        );
        Ok(Self {
            storage,
            row_table,
            col_table,
            vis,
            meta,
            owner,
        })
    }

    // ---- shape and parts ----

    /// Number of rows (samples).
    pub fn len(&self) -> usize {
        self.storage.n_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> (usize, usize) {
        self.storage.shape()
    }

    pub fn n_rows(&self) -> usize {
        self.storage.n_rows()
    }

    pub fn n_cols(&self) -> usize {
        self.storage.n_cols()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn kind(&self) -> StorageKind {
        self.storage.kind()
    }

    pub fn row_table(&self) -> &BoundTable {
        &self.row_table
    }

    pub fn col_table(&self) -> &BoundTable {
        &self.col_table
    }

    /// The table for `role`.
    pub fn table(&self, role: TableRole) -> &BoundTable {
        match role {
            TableRole::Row => &self.row_table,
            TableRole::Column => &self.col_table,
        }
    }

    fn table_mut(&mut self, role: TableRole) -> &mut BoundTable {
        match role {
            TableRole::Row => &mut self.row_table,
            TableRole::Column => &mut self.col_table,
        }
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner
    }

    // ---- identities ----

    pub fn row_names(&self) -> &ColumnData {
        self.row_table.identity()
    }

    /// Replace the row identity column.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ColumnLengthMismatch`] unless one value per row is given.
    pub fn set_row_names(&mut self, values: impl Into<ColumnData>) -> Result<()> {
        self.row_table.set_column(SAMPLE_NAMES, values)
    }

    pub fn col_names(&self) -> &ColumnData {
        self.col_table.identity()
    }

    /// Replace the column identity column.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ColumnLengthMismatch`] unless one value per column is given.
    pub fn set_col_names(&mut self, values: impl Into<ColumnData>) -> Result<()> {
        self.col_table.set_column(VARIABLE_NAMES, values)
    }

    // ---- annotation write-back ----

    /// Swap in a table rebuilt by [`BoundTable::append_column`].
    ///
    /// # Errors
    ///
    /// - [`MatrixError::OwnerMismatch`] when the replacement came from another matrix
    /// - [`MatrixError::StaleReplacement`] when the slot was edited after the
    ///   replacement was built
    /// - [`MatrixError::RowCountMismatch`] / [`MatrixError::ColumnCountMismatch`]
    pub fn apply(&mut self, replacement: SlotReplacement) -> Result<()> {
        let SlotReplacement {
            owner,
            role,
            revision,
            mut table,
        } = replacement;
        if owner != self.owner {
            return Err(MatrixError::OwnerMismatch {
                expected: owner.get(),
                got: self.owner.get(),
            });
        }
        let current = self.table(role).revision();
        if revision != current {
            return Err(MatrixError::StaleReplacement {
                role,
                expected: current,
                got: revision,
            });
        }
        match role {
            TableRole::Row => check_dimensions(self.shape(), &table, &self.col_table)?,
            TableRole::Column => check_dimensions(self.shape(), &self.row_table, &table)?,
        }
        tracing::debug!(%owner, %role, columns = ?table.field_names(), "replaced metadata table");
        table.set_revision(current + 1);
        *self.table_mut(role) = table;
        Ok(())
    }

    /// Set an annotation column on one axis.
    ///
    /// Existing columns are overwritten in place. New columns go through
    /// [`BoundTable::append_column`] and [`apply`](Self::apply), so a failure
    /// leaves the table as it was.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ColumnLengthMismatch`] when overwriting;
    /// [`MatrixError::ColumnTooLong`] / [`MatrixError::ColumnTooShort`] when
    /// appending.
    pub fn set_annotation(
        &mut self,
        role: TableRole,
        name: impl Into<String>,
        values: impl Into<ColumnData>,
    ) -> Result<()> {
        let name = name.into();
        if self.table(role).contains(&name) {
            return self.table_mut(role).set_column(name, values);
        }
        let replacement = self.table(role).append_column(name, values)?;
        self.apply(replacement)
    }

    // ---- selection ----

    /// Sub-matrix at the selected rows and columns.
    ///
    /// Storage and both tables are copied. An integer selector keeps its axis
    /// with length 1.
    ///
    /// # Errors
    ///
    /// Any error of [`Selector::resolve`].
    pub fn select(
        &self,
        rows: impl Into<Selector>,
        cols: impl Into<Selector>,
    ) -> Result<AnnotatedMatrix> {
        let rows = rows.into().resolve(&self.row_table)?;
        let cols = cols.into().resolve(&self.col_table)?;
        tracing::debug!(
            owner = %self.owner,
            rows = rows.len(),
            cols = cols.len(),
            "selecting sub-matrix"
        );
        Self::assemble(
            self.storage.select(&rows, &cols),
            self.row_table.select(&rows).into(),
            self.col_table.select(&cols).into(),
            Arc::clone(&self.vis),
            Arc::clone(&self.meta),
        )
    }

    pub fn select_rows(&self, rows: impl Into<Selector>) -> Result<AnnotatedMatrix> {
        self.select(rows, Selector::Full)
    }

    pub fn select_cols(&self, cols: impl Into<Selector>) -> Result<AnnotatedMatrix> {
        self.select(Selector::Full, cols)
    }

    /// Write into the selected region of storage in place.
    ///
    /// # Errors
    ///
    /// Any error of [`Selector::resolve`], or [`MatrixError::ShapeMismatch`]
    /// for a block of the wrong shape.
    pub fn assign(
        &mut self,
        rows: impl Into<Selector>,
        cols: impl Into<Selector>,
        value: impl Into<AssignValue>,
    ) -> Result<()> {
        let rows = rows.into().resolve(&self.row_table)?;
        let cols = cols.into().resolve(&self.col_table)?;
        self.storage.assign(&rows, &cols, &value.into())
    }

    /// Delete whole rows or whole columns in place.
    ///
    /// With `cols` = [`Selector::Full`] the selected rows are removed from
    /// storage and the row table. Otherwise, with `rows` = `Full`, the
    /// selected columns are removed from storage and the column table.
    ///
    /// # Errors
    ///
    /// [`MatrixError::UnsupportedDeletion`] when neither selector is `Full`,
    /// or any error of [`Selector::resolve`].
    pub fn delete(&mut self, rows: impl Into<Selector>, cols: impl Into<Selector>) -> Result<()> {
        match (rows.into(), cols.into()) {
            (rows, Selector::Full) => {
                let rows = rows.resolve(&self.row_table)?;
                self.storage.delete_rows(&rows);
                self.row_table.delete_rows(&rows);
                tracing::debug!(owner = %self.owner, deleted = rows.len(), "deleted rows");
            }
            (Selector::Full, cols) => {
                let cols = cols.resolve(&self.col_table)?;
                self.storage.delete_cols(&cols);
                self.col_table.delete_rows(&cols);
                tracing::debug!(owner = %self.owner, deleted = cols.len(), "deleted columns");
            }
            _ => return Err(MatrixError::UnsupportedDeletion),
        }
        check_dimensions(self.shape(), &self.row_table, &self.col_table)
    }

    // ---- transpose ----

    /// Variables x samples view as a new matrix; `self` is unchanged.
    ///
    /// # Errors
    ///
    /// [`MatrixError::SchemaConstructionError`] when an annotation column
    /// already uses the other axis's identity name.
    pub fn transpose(&self) -> Result<AnnotatedMatrix> {
        let row_table = self.col_table.clone().reinterpret(TableRole::Row)?;
        let col_table = self.row_table.clone().reinterpret(TableRole::Column)?;
        tracing::debug!(owner = %self.owner, shape = ?self.shape(), "transposing");
        Self::assemble(
            self.storage.transpose(),
            row_table.into(),
            col_table.into(),
            Arc::clone(&self.vis),
            Arc::clone(&self.meta),
        )
    }

    /// Shorthand for [`transpose`](Self::transpose).
    pub fn t(&self) -> Result<AnnotatedMatrix> {
        self.transpose()
    }

    // ---- dataset metadata ----

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// # Errors
    ///
    /// [`MatrixError::MetadataKeyNotFound`] when `key` is absent.
    pub fn meta_value(&self, key: &str) -> Result<&Value> {
        self.meta
            .get(key)
            .ok_or_else(|| MatrixError::MetadataKeyNotFound {
                key: key.to_string(),
            })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.meta.get(key).cloned().unwrap_or_else(|| default.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.meta.contains_key(key)
    }

    /// Insert or overwrite a metadata entry.
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        Arc::make_mut(&mut self.meta).insert(key.into(), value.into());
    }

    pub fn remove_meta(&mut self, key: &str) -> Option<Value> {
        if !self.meta.contains_key(key) {
            return None;
        }
        Arc::make_mut(&mut self.meta).remove(key)
    }

    pub fn vis(&self) -> &Vis {
        &self.vis
    }

    pub fn set_vis(&mut self, column: impl Into<String>, spec: impl Into<ColorSpec>) {
        Arc::make_mut(&mut self.vis).insert(column.into(), spec.into());
    }
}

/// Clones get their own owner identity; replacements built from the original
/// are rejected by the clone.
impl Clone for AnnotatedMatrix {
    fn clone(&self) -> Self {
        let owner = OwnerId::fresh();
        let mut row_table = self.row_table.clone();
        let mut col_table = self.col_table.clone();
        row_table.bind(owner);
        col_table.bind(owner);
        Self {
            storage: self.storage.clone(),
            row_table,
            col_table,
            vis: Arc::clone(&self.vis),
            meta: Arc::clone(&self.meta),
            owner,
        }
    }
}

/// Equal when storage, tables, vis and meta are equal; owners are ignored.
impl PartialEq for AnnotatedMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.storage == other.storage
            && self.row_table == other.row_table
            && self.col_table == other.col_table
            && self.vis == other.vis
            && self.meta == other.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};
    use serde_json::json;

    fn sample() -> AnnotatedMatrix {
        AnnotatedMatrix::builder()
            .storage(array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]])
            .row_meta(MetadataSource::columns([("Smp", vec!["A", "B"])]))
            .col_meta(MetadataSource::columns([("Feat", vec!["a", "b", "c"])]))
            .build()
            .unwrap()
    }

    #[test]
    fn tables_are_bound_to_owner() {
        let m = sample();
        assert_eq!(m.row_table().owner(), Some(m.owner_id()));
        assert_eq!(m.col_table().owner(), Some(m.owner_id()));
        assert_eq!(m.len(), 2);
        assert_eq!(m.kind(), StorageKind::Dense);
    }

    #[test]
    fn from_flat_uses_identities() {
        let m = AnnotatedMatrix::from_flat(
            array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]],
            Some(ColumnData::from(vec!["A", "B"])),
            Some(ColumnData::from(vec!["a", "b", "c"])),
            Meta::new(),
        )
        .unwrap();
        assert_eq!(m.row_names().labels(), vec!["A", "B"]);
        assert_eq!(m.col_names().labels(), vec!["a", "b", "c"]);
        assert!(m.row_table().columns().is_empty());

        let err = AnnotatedMatrix::from_flat(
            Array2::<f32>::zeros((2, 2)),
            Some(ColumnData::from(vec!["A"])),
            None,
            Meta::new(),
        )
        .unwrap_err();
        assert_eq!(err, MatrixError::RowCountMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn apply_rejects_foreign_replacement() {
        let mut a = sample();
        let b = sample();
        let rep = b.row_table().append_column("x", vec![1i64, 2]).unwrap();
        let err = a.apply(rep).unwrap_err();
        assert_eq!(
            err,
            MatrixError::OwnerMismatch {
                expected: b.owner_id().get(),
                got: a.owner_id().get()
            }
        );
        assert!(!a.row_table().contains("x"));
    }

    #[test]
    fn apply_stale_replacement_is_checked() {
        let mut m = sample();
        let rep = m.row_table().append_column("x", vec![1i64, 2]).unwrap();
        m.delete(0, Selector::Full).unwrap();
        let err = m.apply(rep).unwrap_err();
        assert_eq!(
            err,
            MatrixError::StaleReplacement {
                role: TableRole::Row,
                expected: 1,
                got: 0
            }
        );
        assert_eq!(m.row_table().row_count(), 1);
    }

    #[test]
    fn clone_gets_fresh_owner() {
        let m = sample();
        let mut c = m.clone();
        assert_ne!(c.owner_id(), m.owner_id());
        assert_eq!(c, m);
        let rep = m.col_table().append_column("y", vec![1i64, 2, 3]).unwrap();
        assert!(matches!(c.apply(rep), Err(MatrixError::OwnerMismatch { .. })));
    }

    #[test]
    fn meta_is_copy_on_write() {
        let mut m = sample();
        m.set_meta("k", 1);
        let sub = m.select_rows(0).unwrap();
        m.set_meta("k", 2);
        m.set_vis("Smp", vec!["#ff3300", "#ffcc88"]);

        assert_eq!(sub.meta_value("k").unwrap(), &json!(1));
        assert!(sub.vis().is_empty());
        assert_eq!(m.meta_value("k").unwrap(), &json!(2));
        assert_eq!(m.remove_meta("k"), Some(json!(2)));
        assert_eq!(m.remove_meta("k"), None);
    }
}
