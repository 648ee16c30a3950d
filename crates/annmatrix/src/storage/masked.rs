//! Dense values paired with a validity mask.

use ndarray::{Array2, ArrayD, Axis};

use super::dense;
use crate::error::{MatrixError, Result};

/// A dense matrix where individual cells can be masked out.
///
/// `mask[[r, c]] == true` marks the cell as invalid; its `data` entry is kept
/// but never reported by [`MaskedArray::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    data: Array2<f32>,
    mask: Array2<bool>,
}

impl MaskedArray {
    /// Pair `data` with a mask of the same shape.
    pub fn new(data: Array2<f32>, mask: Array2<bool>) -> Result<Self> {
        if data.dim() != mask.dim() {
            return Err(MatrixError::ShapeMismatch {
                what: "mask",
                expected: data.dim(),
                got: mask.dim(),
            });
        }
        Ok(Self { data, mask })
    }

    /// Wrap `data` with nothing masked.
    pub fn unmasked(data: Array2<f32>) -> Self {
        let mask = Array2::from_elem(data.dim(), false);
        Self { data, mask }
    }

    /// Build from dynamic-rank arrays; rank 1 becomes a column vector.
    pub fn from_dyn(data: ArrayD<f32>, mask: ArrayD<bool>) -> Result<Self> {
        Self::new(dense::into_matrix(data)?, dense::into_matrix(mask)?)
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Value at `(row, col)`, or `None` when masked or out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        match self.mask.get((row, col)) {
            Some(false) => self.data.get((row, col)).copied(),
            _ => None,
        }
    }

    /// Number of masked cells.
    pub fn n_masked(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Copy of the data with masked cells replaced by `fill`.
    pub fn filled(&self, fill: f32) -> Array2<f32> {
        let mut out = self.data.clone();
        out.zip_mut_with(&self.mask, |v, &m| {
            if m {
                *v = fill;
            }
        });
        out
    }

    pub(crate) fn select(&self, rows: &[usize], cols: &[usize]) -> Self {
        Self {
            data: dense::select(&self.data, rows, cols),
            mask: dense::select(&self.mask, rows, cols),
        }
    }

    pub(crate) fn delete(&mut self, axis: Axis, positions: &[usize]) {
        self.data = dense::delete(&self.data, axis, positions);
        self.mask = dense::delete(&self.mask, axis, positions);
    }

    /// Write values and unmask the written cells.
    pub(crate) fn assign_with<F>(&mut self, rows: &[usize], cols: &[usize], value: F)
    where
        F: FnMut(usize, usize) -> f32,
    {
        dense::assign_with(&mut self.data, rows, cols, value);
        dense::assign_with(&mut self.mask, rows, cols, |_, _| false);
    }

    pub(crate) fn transposed(&self) -> Self {
        Self {
            data: self.data.t().to_owned(),
            mask: self.mask.t().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> MaskedArray {
        MaskedArray::new(
            array![[1.0, 2.0], [3.0, 4.0]],
            array![[false, true], [true, false]],
        )
        .unwrap()
    }

    #[test]
    fn masked_cells_read_as_none() {
        let m = sample();
        assert_eq!(m.get(0, 0), Some(1.0));
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.get(5, 5), None);
        assert_eq!(m.n_masked(), 2);
    }

    #[test]
    fn mask_shape_must_match() {
        let err = MaskedArray::new(Array2::zeros((2, 2)), Array2::from_elem((2, 3), false));
        assert!(matches!(err, Err(MatrixError::ShapeMismatch { what: "mask", .. })));
    }

    #[test]
    fn assign_unmasks() {
        let mut m = sample();
        m.assign_with(&[0], &[1], |_, _| 9.0);
        assert_eq!(m.get(0, 1), Some(9.0));
        assert_eq!(m.n_masked(), 1);
    }

    #[test]
    fn filled_and_transposed() {
        let m = sample();
        assert_eq!(m.filled(0.0), array![[1.0, 0.0], [0.0, 4.0]]);
        let t = m.transposed();
        assert_eq!(t.get(1, 0), None);
        assert_eq!(t.get(1, 1), Some(4.0));
    }
}
