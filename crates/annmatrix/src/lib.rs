//! annmatrix: annotated matrices for Rust.
//!
//! A samples x variables numeric matrix paired with one metadata table per
//! axis, free-form dataset metadata and colour hints. The tables always match
//! the matrix shape, including after columns are added, rows are deleted or the
//! matrix is sliced or transposed.
//!
//! # Key Types
//!
//! - [`AnnotatedMatrix`] - the aggregate, built with [`AnnotatedMatrix::builder`]
//! - [`Storage`] / [`StorageKind`] - dense, masked or sparse numeric data
//! - [`BoundTable`] - per-axis metadata with an identity column
//! - [`Selector`] - positions, ranges, masks or names along one axis
//! - [`MatrixError`] - every failure the crate reports
//!
//! # Adding Annotations
//!
//! Tables owned by a matrix are read-only from outside. A new column is
//! produced as a [`SlotReplacement`] by [`BoundTable::append_column`] and
//! installed with [`AnnotatedMatrix::apply`], or in one step with
//! [`AnnotatedMatrix::set_annotation`].

pub mod error;
pub mod matrix;
pub mod storage;
pub mod table;
pub mod testing;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use error::{MatrixError, Result};

pub use matrix::{
    AnnotatedMatrix, ColorSpec, MatrixParts, MatrixPartsBuilder, Meta, Selector, Vis,
    check_dimensions,
};

pub use storage::{AssignValue, MaskedArray, Storage, StorageKind};

pub use table::{
    BoundTable, ColumnData, Field, FieldType, MetadataSource, OwnerId, SAMPLE_NAMES,
    SlotReplacement, TableRole, VARIABLE_NAMES,
};
