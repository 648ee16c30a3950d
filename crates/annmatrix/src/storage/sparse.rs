//! Sparse backend helpers over `sprs::CsMat`.
//!
//! Sparse storage is kept in CSR form. Every structural edit (selection,
//! deletion, assignment, transpose) goes through a triplet rebuild, which keeps
//! the code independent of the matrix's internal index layout.

use std::collections::BTreeMap;

use ndarray::Array2;
use sprs::{CsMat, TriMat};

use super::dense::complement;

/// Non-zero entries as `(row, col, value)`, for either compressed storage.
pub(crate) fn triplets(mat: &CsMat<f32>) -> Vec<(usize, usize, f32)> {
    let csr = mat.is_csr();
    let mut out = Vec::with_capacity(mat.nnz());
    for (outer, lane) in mat.outer_iterator().enumerate() {
        for (inner, &v) in lane.iter() {
            let (r, c) = if csr { (outer, inner) } else { (inner, outer) };
            out.push((r, c, v));
        }
    }
    out
}

/// Assemble a CSR matrix. Duplicate coordinates are summed.
pub(crate) fn from_triplets<I>(shape: (usize, usize), entries: I) -> CsMat<f32>
where
    I: IntoIterator<Item = (usize, usize, f32)>,
{
    let mut tri = TriMat::new(shape);
    for (r, c, v) in entries {
        tri.add_triplet(r, c, v);
    }
    tri.to_csr()
}

/// Normalise any compressed storage to CSR.
pub(crate) fn to_csr(mat: CsMat<f32>) -> CsMat<f32> {
    if mat.is_csr() {
        mat
    } else {
        from_triplets(mat.shape(), triplets(&mat))
    }
}

/// Old position -> new positions, for a selector that may repeat positions.
fn position_map(len: usize, positions: &[usize]) -> Vec<Vec<usize>> {
    let mut map = vec![Vec::new(); len];
    for (new, &old) in positions.iter().enumerate() {
        map[old].push(new);
    }
    map
}

pub(crate) fn select(mat: &CsMat<f32>, rows: &[usize], cols: &[usize]) -> CsMat<f32> {
    let row_map = position_map(mat.rows(), rows);
    let col_map = position_map(mat.cols(), cols);
    let mut entries = Vec::new();
    for (r, c, v) in triplets(mat) {
        for &nr in &row_map[r] {
            for &nc in &col_map[c] {
                entries.push((nr, nc, v));
            }
        }
    }
    from_triplets((rows.len(), cols.len()), entries)
}

pub(crate) fn delete_rows(mat: &CsMat<f32>, rows: &[usize]) -> CsMat<f32> {
    let keep = complement(mat.rows(), rows);
    let all: Vec<usize> = (0..mat.cols()).collect();
    select(mat, &keep, &all)
}

pub(crate) fn delete_cols(mat: &CsMat<f32>, cols: &[usize]) -> CsMat<f32> {
    let keep = complement(mat.cols(), cols);
    let all: Vec<usize> = (0..mat.rows()).collect();
    select(mat, &all, &keep)
}

/// Overwrite the `rows` x `cols` region. Zeros written into the region are
/// not stored.
pub(crate) fn assign_with<F>(
    mat: &CsMat<f32>,
    rows: &[usize],
    cols: &[usize],
    mut value: F,
) -> CsMat<f32>
where
    F: FnMut(usize, usize) -> f32,
{
    let mut region = BTreeMap::new();
    for (i, &r) in rows.iter().enumerate() {
        for (j, &c) in cols.iter().enumerate() {
            region.insert((r, c), value(i, j));
        }
    }
    let mut entries: Vec<(usize, usize, f32)> = triplets(mat)
        .into_iter()
        .filter(|(r, c, _)| !region.contains_key(&(*r, *c)))
        .collect();
    entries.extend(
        region
            .into_iter()
            .filter(|(_, v)| *v != 0.0)
            .map(|((r, c), v)| (r, c, v)),
    );
    from_triplets(mat.shape(), entries)
}

pub(crate) fn transpose(mat: &CsMat<f32>) -> CsMat<f32> {
    let (rows, cols) = mat.shape();
    from_triplets(
        (cols, rows),
        triplets(mat).into_iter().map(|(r, c, v)| (c, r, v)),
    )
}

pub(crate) fn to_dense(mat: &CsMat<f32>) -> Array2<f32> {
    let mut out = Array2::zeros(mat.shape());
    for (r, c, v) in triplets(mat) {
        out[[r, c]] = v;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn eye3() -> CsMat<f32> {
        from_triplets((3, 3), vec![(0, 0, 1.0), (1, 1, 1.0), (2, 2, 1.0)])
    }

    #[test]
    fn select_repeats_and_reorders() {
        let m = select(&eye3(), &[2, 2, 0], &[0, 2]);
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(to_dense(&m), array![[0.0, 1.0], [0.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn delete_rows_and_cols() {
        let m = delete_rows(&eye3(), &[1]);
        assert_eq!(to_dense(&m), array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let m = delete_cols(&m, &[0]);
        assert_eq!(to_dense(&m), array![[0.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn assign_drops_written_zeros() {
        let m = assign_with(&eye3(), &[0, 1], &[0, 1], |i, j| if i == j { 0.0 } else { 5.0 });
        assert_eq!(m.nnz(), 3);
        assert_eq!(
            to_dense(&m),
            array![[0.0, 5.0, 0.0], [5.0, 0.0, 0.0], [0.0, 0.0, 1.0]]
        );
    }

    #[test]
    fn transpose_swaps_shape() {
        let m = from_triplets((2, 3), vec![(0, 2, 4.0)]);
        let t = transpose(&m);
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.get(2, 0), Some(&4.0));
    }

    #[test]
    fn csc_input_is_normalised() {
        let csr = from_triplets((2, 2), vec![(0, 1, 2.0)]);
        let csc = csr.to_other_storage();
        assert!(csc.is_csc());
        let back = to_csr(csc);
        assert!(back.is_csr());
        assert_eq!(back, csr);
    }
}
