//! Numeric storage backends for the annotated matrix.
//!
//! # Storage Kinds
//!
//! - [`StorageKind::Dense`]: `ndarray::Array2<f32>`
//! - [`StorageKind::Masked`]: [`MaskedArray`], dense values plus a validity mask
//! - [`StorageKind::Sparse`]: `sprs::CsMat<f32>`, kept in CSR form
//!
//! [`Storage`] is a closed union over the three. Typed inputs convert through
//! `From`; type-erased inputs go through [`StorageKind::classify`] and
//! [`Storage::from_any`], which reject anything outside the three kinds.

mod dense;
mod masked;
mod sparse;

use std::any::{Any, type_name};
use std::fmt;

use ndarray::{Array1, Array2, ArrayD, Axis};
use sprs::CsMat;

use crate::error::{MatrixError, Result};

pub use masked::MaskedArray;

pub(crate) use dense::complement;

/// The closed set of accepted storage representations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Dense,
    Masked,
    Sparse,
}

impl StorageKind {
    /// All kinds, in classification order.
    pub const ALL: [StorageKind; 3] =
        [StorageKind::Dense, StorageKind::Masked, StorageKind::Sparse];

    pub fn name(&self) -> &'static str {
        match self {
            StorageKind::Dense => "Dense",
            StorageKind::Masked => "Masked",
            StorageKind::Sparse => "Sparse",
        }
    }

    /// Whether a type-erased value is a representation of this kind.
    fn accepts(&self, value: &dyn Any) -> bool {
        match self {
            StorageKind::Dense => {
                value.is::<Array2<f32>>() || value.is::<Array1<f32>>() || value.is::<ArrayD<f32>>()
            }
            StorageKind::Masked => value.is::<MaskedArray>(),
            StorageKind::Sparse => value.is::<CsMat<f32>>(),
        }
    }

    /// Find the first kind, in [`StorageKind::ALL`] order, that accepts `value`.
    ///
    /// # Errors
    ///
    /// [`MatrixError::UnsupportedStorageType`] listing the allowed kinds.
    pub fn classify<T: Any>(value: &T) -> Result<StorageKind> {
        let erased = value as &dyn Any;
        Self::ALL
            .into_iter()
            .find(|kind| kind.accepts(erased))
            .ok_or_else(|| MatrixError::UnsupportedStorageType {
                found: type_name::<T>().to_string(),
                allowed: Self::ALL.iter().map(|k| k.name()).collect(),
            })
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value written by [`Storage::assign`].
#[derive(Clone, Debug, PartialEq)]
pub enum AssignValue {
    /// Broadcast one value over the whole region.
    Scalar(f32),
    /// One value per selected cell; shape must equal the region's shape.
    Block(Array2<f32>),
}

impl From<f32> for AssignValue {
    fn from(v: f32) -> Self {
        AssignValue::Scalar(v)
    }
}

impl From<Array2<f32>> for AssignValue {
    fn from(block: Array2<f32>) -> Self {
        AssignValue::Block(block)
    }
}

impl AssignValue {
    fn at(&self, i: usize, j: usize) -> f32 {
        match self {
            AssignValue::Scalar(v) => *v,
            AssignValue::Block(block) => block[[i, j]],
        }
    }
}

/// A 2-D numeric matrix in one of the supported representations.
#[derive(Clone, Debug, PartialEq)]
pub enum Storage {
    Dense(Array2<f32>),
    Masked(MaskedArray),
    Sparse(CsMat<f32>),
}

impl From<Array2<f32>> for Storage {
    fn from(arr: Array2<f32>) -> Self {
        Storage::Dense(arr)
    }
}

/// A vector becomes an `(n, 1)` column: n elements, n rows.
impl From<Array1<f32>> for Storage {
    fn from(arr: Array1<f32>) -> Self {
        Storage::Dense(arr.insert_axis(Axis(1)))
    }
}

impl From<MaskedArray> for Storage {
    fn from(arr: MaskedArray) -> Self {
        Storage::Masked(arr)
    }
}

impl From<CsMat<f32>> for Storage {
    fn from(mat: CsMat<f32>) -> Self {
        Storage::Sparse(sparse::to_csr(mat))
    }
}

impl Storage {
    /// Convert a dynamic-rank dense array. Rank 1 becomes a column vector.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidRank`] for anything not reducible to 2-D.
    pub fn from_dyn(arr: ArrayD<f32>) -> Result<Self> {
        dense::into_matrix(arr).map(Storage::Dense)
    }

    /// Convert a type-erased value, classifying it first.
    ///
    /// # Errors
    ///
    /// [`MatrixError::UnsupportedStorageType`] or [`MatrixError::InvalidRank`].
    pub fn from_any<T: Any>(value: T) -> Result<Self> {
        StorageKind::classify(&value)?;
        let boxed: Box<dyn Any> = Box::new(value);
        let boxed = match boxed.downcast::<Array2<f32>>() {
            Ok(arr) => return Ok(Storage::Dense(*arr)),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<Array1<f32>>() {
            Ok(arr) => return Ok(Storage::from(*arr)),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<ArrayD<f32>>() {
            Ok(arr) => return Storage::from_dyn(*arr),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<MaskedArray>() {
            Ok(arr) => return Ok(Storage::Masked(*arr)),
            Err(other) => other,
        };
        match boxed.downcast::<CsMat<f32>>() {
            Ok(mat) => Ok(Storage::from(*mat)),
            Err(_) => Err(MatrixError::UnsupportedStorageType {
                found: type_name::<T>().to_string(),
                allowed: StorageKind::ALL.iter().map(|k| k.name()).collect(),
            }),
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            Storage::Dense(_) => StorageKind::Dense,
            Storage::Masked(_) => StorageKind::Masked,
            Storage::Sparse(_) => StorageKind::Sparse,
        }
    }

    /// `(n_rows, n_cols)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Storage::Dense(arr) => arr.dim(),
            Storage::Masked(arr) => arr.dim(),
            Storage::Sparse(mat) => mat.shape(),
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.shape().0
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.shape().1
    }

    /// Value at `(row, col)`.
    ///
    /// Returns `None` out of bounds and for masked cells. Unstored sparse
    /// cells read as `0.0`.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        let (n_rows, n_cols) = self.shape();
        if row >= n_rows || col >= n_cols {
            return None;
        }
        match self {
            Storage::Dense(arr) => Some(arr[[row, col]]),
            Storage::Masked(arr) => arr.get(row, col),
            Storage::Sparse(mat) => Some(mat.get(row, col).copied().unwrap_or(0.0)),
        }
    }

    /// Densify. Masked cells become NaN.
    pub fn to_dense(&self) -> Array2<f32> {
        match self {
            Storage::Dense(arr) => arr.clone(),
            Storage::Masked(arr) => arr.filled(f32::NAN),
            Storage::Sparse(mat) => sparse::to_dense(mat),
        }
    }

    /// Gather `rows` x `cols` into new storage of the same kind.
    ///
    /// Positions must already be in bounds.
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Storage {
        match self {
            Storage::Dense(arr) => Storage::Dense(dense::select(arr, rows, cols)),
            Storage::Masked(arr) => Storage::Masked(arr.select(rows, cols)),
            Storage::Sparse(mat) => Storage::Sparse(sparse::select(mat, rows, cols)),
        }
    }

    /// Write `value` into the `rows` x `cols` region in place.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ShapeMismatch`] when a block does not match the region.
    pub fn assign(&mut self, rows: &[usize], cols: &[usize], value: &AssignValue) -> Result<()> {
        if let AssignValue::Block(block) = value
            && block.dim() != (rows.len(), cols.len())
        {
            return Err(MatrixError::ShapeMismatch {
                what: "assigned block",
                expected: (rows.len(), cols.len()),
                got: block.dim(),
            });
        }
        let at = |i, j| value.at(i, j);
        match self {
            Storage::Dense(arr) => dense::assign_with(arr, rows, cols, at),
            Storage::Masked(arr) => arr.assign_with(rows, cols, at),
            Storage::Sparse(mat) => *mat = sparse::assign_with(mat, rows, cols, at),
        }
        Ok(())
    }

    /// Drop the given rows in place.
    pub fn delete_rows(&mut self, rows: &[usize]) {
        match self {
            Storage::Dense(arr) => *arr = dense::delete(arr, Axis(0), rows),
            Storage::Masked(arr) => arr.delete(Axis(0), rows),
            Storage::Sparse(mat) => *mat = sparse::delete_rows(mat, rows),
        }
    }

    /// Drop the given columns in place.
    pub fn delete_cols(&mut self, cols: &[usize]) {
        match self {
            Storage::Dense(arr) => *arr = dense::delete(arr, Axis(1), cols),
            Storage::Masked(arr) => arr.delete(Axis(1), cols),
            Storage::Sparse(mat) => *mat = sparse::delete_cols(mat, cols),
        }
    }

    /// Transposed copy of the same kind.
    pub fn transpose(&self) -> Storage {
        match self {
            Storage::Dense(arr) => Storage::Dense(arr.t().to_owned()),
            Storage::Masked(arr) => Storage::Masked(arr.transposed()),
            Storage::Sparse(mat) => Storage::Sparse(sparse::transpose(mat)),
        }
    }

    /// Number of stored entries: all cells for dense kinds, non-zeros for sparse.
    pub fn nnz(&self) -> usize {
        match self {
            Storage::Sparse(mat) => mat.nnz(),
            _ => {
                let (r, c) = self.shape();
                r * c
            }
        }
    }
}
