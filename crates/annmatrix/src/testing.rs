//! Fixtures shared by unit and integration tests.

use ndarray::{Array2, array};
use rand::prelude::*;
use sprs::CsMat;

use crate::matrix::AnnotatedMatrix;
use crate::storage::{MaskedArray, Storage};
use crate::table::{ColumnData, MetadataSource};

/// Uniform values in `[0, 1)`, reproducible from `seed`.
pub fn random_dense(rows: usize, cols: usize, seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_simple_fn((rows, cols), || rng.r#gen::<f32>())
}

/// Random sparse matrix in which roughly `density` of the cells are stored.
pub fn random_sparse(rows: usize, cols: usize, density: f64, seed: u64) -> CsMat<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tri = sprs::TriMat::new((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            if rng.r#gen::<f64>() < density {
                tri.add_triplet(r, c, rng.r#gen::<f32>() + 1.0);
            }
        }
    }
    tri.to_csr()
}

/// Random data with every `stride`-th cell masked.
pub fn random_masked(rows: usize, cols: usize, stride: usize, seed: u64) -> MaskedArray {
    let data = random_dense(rows, cols, seed);
    let stride = stride.max(1);
    let mask = Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) % stride == 0);
    MaskedArray::new(data, mask).expect("mask built with the data's shape")
}

/// `"<prefix>0"`, `"<prefix>1"`, ... as a string column.
pub fn names(prefix: &str, n: usize) -> ColumnData {
    ColumnData::Str((0..n).map(|i| format!("{prefix}{i}")).collect())
}

/// The 2 x 3 matrix used throughout the tests:
///
/// ```text
///        a  b  c
///   A [  1  2  3 ]
///   B [  4  5  6 ]
/// ```
///
/// with row annotation `Smp = [A, B]` and column annotation `Feat = [a, b, c]`.
pub fn small_matrix(storage: impl Into<Storage>) -> AnnotatedMatrix {
    AnnotatedMatrix::builder()
        .storage(storage)
        .row_meta(MetadataSource::columns([("Smp", vec!["A", "B"])]))
        .col_meta(MetadataSource::columns([("Feat", vec!["a", "b", "c"])]))
        .build()
        .expect("fixture is consistent")
}

/// The values of [`small_matrix`].
pub fn small_values() -> Array2<f32> {
    array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]
}

/// A matrix of `rows` x `cols` random values with string identities and one
/// numeric annotation per axis.
pub fn annotated_random(rows: usize, cols: usize, seed: u64) -> AnnotatedMatrix {
    let row_meta = MetadataSource::columns([
        (crate::SAMPLE_NAMES, names("cell", rows)),
        ("depth", ColumnData::Int((0..rows as i64).collect())),
    ]);
    let col_meta = MetadataSource::columns([
        (crate::VARIABLE_NAMES, names("gene", cols)),
        ("mean", ColumnData::Float((0..cols).map(|c| c as f64 * 0.5).collect())),
    ]);
    AnnotatedMatrix::builder()
        .storage(random_dense(rows, cols, seed))
        .row_meta(row_meta)
        .col_meta(col_meta)
        .build()
        .expect("fixture is consistent")
}
