//! Selection, assignment, deletion and transpose.

use approx::assert_relative_eq;
use ndarray::{Array2, Slice, array};
use rstest::rstest;
use serde_json::json;

use annmatrix::testing::{
    annotated_random, random_masked, random_sparse, small_matrix, small_values,
};
use annmatrix::{
    AnnotatedMatrix, AssignValue, ColumnData, MatrixError, SAMPLE_NAMES, Selector, Storage,
    TableRole, VARIABLE_NAMES,
};

fn storages() -> Vec<Storage> {
    let values = small_values();
    let mut tri = sprs::TriMat::new((2, 3));
    for ((r, c), &v) in values.indexed_iter() {
        tri.add_triplet(r, c, v);
    }
    let csr: sprs::CsMat<f32> = tri.to_csr();
    vec![
        Storage::from(values.clone()),
        Storage::from(annmatrix::MaskedArray::unmasked(values)),
        Storage::from(csr),
    ]
}

#[rstest]
#[case::cell(Selector::Index(0), Selector::Index(0), array![[1.0]])]
#[case::row(Selector::Index(0), Selector::Full, array![[1.0, 2.0, 3.0]])]
#[case::col(Selector::Full, Selector::Index(0), array![[1.0], [4.0]])]
#[case::list(Selector::Full, Selector::Indices(vec![0, 1]), array![[1.0, 2.0], [4.0, 5.0]])]
#[case::range(Selector::Full, Selector::from(1..3), array![[2.0, 3.0], [5.0, 6.0]])]
#[case::reversed(
    Selector::Index(-1),
    Selector::Slice(Slice::new(0, None, -1)),
    array![[6.0, 5.0, 4.0]]
)]
#[case::mask(
    Selector::Mask(vec![false, true]),
    Selector::Mask(vec![true, false, true]),
    array![[4.0, 6.0]]
)]
fn get_subset(
    #[case] rows: Selector,
    #[case] cols: Selector,
    #[case] expected: Array2<f32>,
    #[values(0, 1, 2)] which: usize,
) {
    let m = small_matrix(storages().swap_remove(which));
    let sub = m.select(rows, cols).unwrap();
    assert_eq!(sub.kind(), m.kind());
    assert_eq!(sub.shape(), expected.dim());
    assert_eq!(sub.storage().to_dense(), expected);
    assert_eq!(sub.row_table().row_count(), sub.n_rows());
    assert_eq!(sub.col_table().row_count(), sub.n_cols());
}

#[test]
fn get_subset_meta() {
    let m = small_matrix(small_values());
    let sub = m.select(0, 0).unwrap();
    assert_eq!(sub.row_table().get("Smp").unwrap(), &ColumnData::from(vec!["A"]));
    assert_eq!(sub.col_table().get("Feat").unwrap(), &ColumnData::from(vec!["a"]));
    assert_eq!(sub.row_names(), &ColumnData::Int(array![0]));
}

#[test]
fn subset_tables_are_independent() {
    let mut m = small_matrix(small_values());
    let sub = m.select_rows(Selector::Full).unwrap();
    assert_ne!(sub.owner_id(), m.owner_id());
    assert_eq!(sub.row_table().owner(), Some(sub.owner_id()));

    m.set_annotation(TableRole::Row, "Smp", vec!["X", "Y"]).unwrap();
    m.assign(0, 0, 100.0f32).unwrap();
    assert_eq!(sub.row_table().get("Smp").unwrap(), &ColumnData::from(vec!["A", "B"]));
    assert_eq!(sub.storage().get(0, 0), Some(1.0));
}

#[test]
fn select_by_name() {
    let m = annotated_random(4, 3, 11);
    let sub = m
        .select(vec!["cell3", "cell1"], Selector::from("gene2"))
        .unwrap();
    assert_eq!(sub.shape(), (2, 1));
    assert_eq!(sub.row_names().labels(), vec!["cell3", "cell1"]);
    assert_relative_eq!(
        sub.storage().to_dense(),
        m.storage().select(&[3, 1], &[2]).to_dense()
    );

    let err = m.select_cols("gene9").unwrap_err();
    assert_eq!(
        err,
        MatrixError::UnknownName {
            name: "gene9".into(),
            role: TableRole::Column
        }
    );
}

#[test]
fn select_out_of_bounds() {
    let m = small_matrix(small_values());
    assert_eq!(
        m.select(2, Selector::Full).unwrap_err(),
        MatrixError::IndexOutOfBounds {
            index: 2,
            len: 2,
            role: TableRole::Row
        }
    );
    assert!(matches!(
        m.select_cols(Selector::Mask(vec![true])),
        Err(MatrixError::MaskLengthMismatch { expected: 3, got: 1, .. })
    ));
}

#[test]
fn selection_shares_meta_until_written() {
    let mut m = small_matrix(small_values());
    m.set_meta("k", 1);
    m.set_vis("Smp", vec!["#ff3300", "#ffcc88"]);
    let mut sub = m.select_rows(0).unwrap();
    assert_eq!(sub.meta(), m.meta());
    assert_eq!(sub.vis(), m.vis());

    sub.set_meta("k", 2);
    assert_eq!(m.meta_value("k").unwrap(), &json!(1));
    assert_eq!(sub.meta_value("k").unwrap(), &json!(2));
}

#[rstest]
#[case::scalar(AssignValue::Scalar(0.0), array![[1.0, 0.0, 0.0], [4.0, 0.0, 0.0]])]
#[case::block(
    AssignValue::Block(array![[7.0, 8.0], [9.0, 10.0]]),
    array![[1.0, 7.0, 8.0], [4.0, 9.0, 10.0]]
)]
fn assign_region(
    #[case] value: AssignValue,
    #[case] expected: Array2<f32>,
    #[values(0, 1, 2)] which: usize,
) {
    let mut m = small_matrix(storages().swap_remove(which));
    m.assign(Selector::Full, 1..3, value).unwrap();
    assert_eq!(m.storage().to_dense(), expected);
}

#[test]
fn assign_block_shape_mismatch() {
    let mut m = small_matrix(small_values());
    let err = m.assign(0, Selector::Full, array![[1.0f32]]).unwrap_err();
    assert!(matches!(err, MatrixError::ShapeMismatch { expected: (1, 3), got: (1, 1), .. }));
    assert_eq!(m.storage().to_dense(), small_values());
}

#[test]
fn assign_unmasks_cells() {
    let masked = random_masked(2, 3, 1, 5);
    let mut m = small_matrix(masked);
    assert_eq!(m.storage().get(0, 0), None);
    m.assign(0, 0, 3.0f32).unwrap();
    assert_eq!(m.storage().get(0, 0), Some(3.0));
    assert_eq!(m.storage().get(1, 1), None);
}

#[rstest]
fn delete_rows(#[values(0, 1, 2)] which: usize) {
    let mut m = small_matrix(storages().swap_remove(which));
    m.delete(0, Selector::Full).unwrap();
    assert_eq!(m.shape(), (1, 3));
    assert_eq!(m.storage().to_dense(), array![[4.0, 5.0, 6.0]]);
    assert_eq!(m.row_table().get("Smp").unwrap(), &ColumnData::from(vec!["B"]));
    assert_eq!(m.col_table().row_count(), 3);
}

#[rstest]
fn delete_cols(#[values(0, 1, 2)] which: usize) {
    let mut m = small_matrix(storages().swap_remove(which));
    m.delete(Selector::Full, Selector::Indices(vec![0, 2])).unwrap();
    assert_eq!(m.shape(), (2, 1));
    assert_eq!(m.storage().to_dense(), array![[2.0], [5.0]]);
    assert_eq!(m.col_table().get("Feat").unwrap(), &ColumnData::from(vec!["b"]));
    assert_eq!(m.row_table().row_count(), 2);
}

#[test]
fn delete_partial_block_is_unsupported() {
    let mut m = small_matrix(small_values());
    assert_eq!(m.delete(0, 0).unwrap_err(), MatrixError::UnsupportedDeletion);
    assert_eq!(m.shape(), (2, 3));
}

#[test]
fn delete_everything_removes_rows() {
    let mut m = small_matrix(small_values());
    m.delete(.., ..).unwrap();
    assert_eq!(m.shape(), (0, 3));
    assert!(m.is_empty());
}

#[test]
fn transpose_swaps_tables() {
    let mut m = annotated_random(3, 2, 3);
    m.set_meta("k", "v");
    let t = m.t().unwrap();
    assert_eq!(t.shape(), (2, 3));
    assert_eq!(t.row_table().identity_name(), SAMPLE_NAMES);
    assert_eq!(t.col_table().identity_name(), VARIABLE_NAMES);
    assert_eq!(t.row_names().labels(), vec!["gene0", "gene1"]);
    assert_eq!(t.col_names().labels(), vec!["cell0", "cell1", "cell2"]);
    assert_eq!(t.row_table().columns(), vec!["mean"]);
    assert_eq!(t.col_table().columns(), vec!["depth"]);
    assert_eq!(t.meta_value("k").unwrap(), &json!("v"));
    assert_eq!(m.shape(), (3, 2));
}

#[test]
fn transpose_sparse() {
    let m = AnnotatedMatrix::new(random_sparse(4, 6, 0.3, 2)).unwrap();
    let t = m.transpose().unwrap();
    assert_eq!(t.storage().to_dense(), m.storage().to_dense().t());
    assert_eq!(t.storage().nnz(), m.storage().nnz());
}

#[test]
fn transpose_identity_clash() {
    let m = AnnotatedMatrix::builder()
        .storage(small_values())
        .col_meta(annmatrix::MetadataSource::columns([(SAMPLE_NAMES, vec![1i64, 2, 3])]))
        .build()
        .unwrap();
    assert!(matches!(
        m.transpose(),
        Err(MatrixError::SchemaConstructionError { .. })
    ));
}
