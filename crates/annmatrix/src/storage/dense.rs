//! Positional helpers over `Array2`, shared by the dense and masked backends.

use ndarray::{Array2, ArrayD, Axis, Ix2};

use crate::error::{MatrixError, Result};

/// Gather `rows` x `cols` into a new array. Positions may repeat.
pub(crate) fn select<T: Clone>(arr: &Array2<T>, rows: &[usize], cols: &[usize]) -> Array2<T> {
    arr.select(Axis(0), rows).select(Axis(1), cols)
}

/// Drop the given positions along `axis`, keeping the remaining order.
pub(crate) fn delete<T: Clone>(arr: &Array2<T>, axis: Axis, positions: &[usize]) -> Array2<T> {
    let keep = complement(arr.len_of(axis), positions);
    arr.select(axis, &keep)
}

/// Write `value(i, j)` into every cell `(rows[i], cols[j])`.
///
/// Later positions win when a selector repeats a position.
pub(crate) fn assign_with<T, F>(arr: &mut Array2<T>, rows: &[usize], cols: &[usize], mut value: F)
where
    F: FnMut(usize, usize) -> T,
{
    for (i, &r) in rows.iter().enumerate() {
        for (j, &c) in cols.iter().enumerate() {
            arr[[r, c]] = value(i, j);
        }
    }
}

/// Positions in `0..len` that are not listed in `positions`.
pub(crate) fn complement(len: usize, positions: &[usize]) -> Vec<usize> {
    let mut dropped = vec![false; len];
    for &p in positions {
        if p < len {
            dropped[p] = true;
        }
    }
    (0..len).filter(|&i| !dropped[i]).collect()
}

/// Reduce a dynamic-rank array to a matrix.
///
/// Rank 1 becomes an `(n, 1)` column vector; rank 2 is kept as is.
pub(crate) fn into_matrix<T: Clone>(arr: ArrayD<T>) -> Result<Array2<T>> {
    let ndim = arr.ndim();
    match ndim {
        1 => {
            let n = arr.len();
            arr.as_standard_layout()
                .into_owned()
                .into_shape_with_order((n, 1))
                .map_err(|_| MatrixError::InvalidRank { ndim })
        }
        2 => arr
            .into_dimensionality::<Ix2>()
            .map_err(|_| MatrixError::InvalidRank { ndim }),
        _ => Err(MatrixError::InvalidRank { ndim }),
    }
}
