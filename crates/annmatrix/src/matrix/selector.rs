//! Axis selectors and their resolution to positions.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use ndarray::Slice;

use crate::error::{MatrixError, Result};
use crate::table::{BoundTable, TableRole};

/// Picks positions along one axis of an annotated matrix.
///
/// Every variant resolves to an ordered position list. A single
/// [`Index`](Selector::Index) resolves to one position, so the selected axis
/// keeps length 1 instead of disappearing.
#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    /// The whole axis.
    Full,
    /// One position; negative values count from the end.
    Index(isize),
    /// A range with optional step, with `ndarray` slicing semantics.
    ///
    /// Bounds are clamped to the axis. A negative step walks the range
    /// backwards; a zero step is rejected with [`MatrixError::ZeroSliceStep`].
    Slice(Slice),
    /// Positions in the given order; repeats allowed, negatives count from the end.
    Indices(Vec<isize>),
    /// Keep positions whose entry is `true`. Must match the axis length.
    Mask(Vec<bool>),
    /// One entry of the identity column, compared as text.
    Name(String),
    /// Several identity entries, in the given order.
    Names(Vec<String>),
}

impl Selector {
    pub fn is_full(&self) -> bool {
        matches!(self, Selector::Full)
    }

    /// Resolve against the axis described by `table`.
    ///
    /// # Errors
    ///
    /// - [`MatrixError::IndexOutOfBounds`] for positions outside the axis
    /// - [`MatrixError::ZeroSliceStep`]
    /// - [`MatrixError::MaskLengthMismatch`]
    /// - [`MatrixError::UnknownName`] when a name is not in the identity column
    pub fn resolve(&self, table: &BoundTable) -> Result<Vec<usize>> {
        let len = table.row_count();
        let role = table.role();
        let positions = match self {
            Selector::Full => (0..len).collect(),
            Selector::Index(i) => vec![normalize(*i, len, role)?],
            Selector::Slice(slice) => slice_positions(*slice, len)?,
            Selector::Indices(indices) => indices
                .iter()
                .map(|&i| normalize(i, len, role))
                .collect::<Result<_>>()?,
            Selector::Mask(mask) => {
                if mask.len() != len {
                    return Err(MatrixError::MaskLengthMismatch {
                        expected: len,
                        got: mask.len(),
                        role,
                    });
                }
                mask.iter()
                    .enumerate()
                    .filter_map(|(i, &keep)| keep.then_some(i))
                    .collect()
            }
            Selector::Name(name) => {
                let labels = table.identity().labels();
                vec![find_name(&labels, name, role)?]
            }
            Selector::Names(names) => {
                let labels = table.identity().labels();
                names
                    .iter()
                    .map(|name| find_name(&labels, name, role))
                    .collect::<Result<_>>()?
            }
        };
        tracing::trace!(%role, len, selected = positions.len(), "resolved selector");
        Ok(positions)
    }
}

fn normalize(index: isize, len: usize, role: TableRole) -> Result<usize> {
    let out_of_bounds = || MatrixError::IndexOutOfBounds { index, len, role };
    let pos = if index < 0 {
        len.checked_sub(index.unsigned_abs()).ok_or_else(out_of_bounds)?
    } else {
        index.unsigned_abs()
    };
    if pos < len { Ok(pos) } else { Err(out_of_bounds()) }
}

fn clamp(bound: isize, len: usize) -> usize {
    if bound < 0 {
        len.saturating_sub(bound.unsigned_abs())
    } else {
        bound.unsigned_abs().min(len)
    }
}

fn slice_positions(slice: Slice, len: usize) -> Result<Vec<usize>> {
    if slice.step == 0 {
        return Err(MatrixError::ZeroSliceStep);
    }
    let start = clamp(slice.start, len);
    let end = slice.end.map_or(len, |end| clamp(end, len)).max(start);
    let step = slice.step.unsigned_abs();
    let positions = if slice.step > 0 {
        (start..end).step_by(step).collect()
    } else {
        (start..end).rev().step_by(step).collect()
    };
    Ok(positions)
}

fn find_name(labels: &[String], name: &str, role: TableRole) -> Result<usize> {
    labels
        .iter()
        .position(|label| label == name)
        .ok_or_else(|| MatrixError::UnknownName {
            name: name.to_string(),
            role,
        })
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::Full
    }
}

impl From<isize> for Selector {
    fn from(i: isize) -> Self {
        Selector::Index(i)
    }
}

impl From<i32> for Selector {
    fn from(i: i32) -> Self {
        Selector::Index(i as isize)
    }
}

impl From<usize> for Selector {
    fn from(i: usize) -> Self {
        Selector::Index(isize::try_from(i).unwrap_or(isize::MAX))
    }
}

impl From<Slice> for Selector {
    fn from(slice: Slice) -> Self {
        Selector::Slice(slice)
    }
}

impl From<Range<usize>> for Selector {
    fn from(r: Range<usize>) -> Self {
        Selector::Slice(Slice::from(r))
    }
}

impl From<RangeFrom<usize>> for Selector {
    fn from(r: RangeFrom<usize>) -> Self {
        Selector::Slice(Slice::from(r))
    }
}

impl From<RangeTo<usize>> for Selector {
    fn from(r: RangeTo<usize>) -> Self {
        Selector::Slice(Slice::from(r))
    }
}

impl From<Vec<isize>> for Selector {
    fn from(indices: Vec<isize>) -> Self {
        Selector::Indices(indices)
    }
}

impl From<&[usize]> for Selector {
    fn from(indices: &[usize]) -> Self {
        Selector::Indices(
            indices
                .iter()
                .map(|&i| isize::try_from(i).unwrap_or(isize::MAX))
                .collect(),
        )
    }
}

impl From<Vec<bool>> for Selector {
    fn from(mask: Vec<bool>) -> Self {
        Selector::Mask(mask)
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Name(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Selector::Name(name)
    }
}

impl From<Vec<&str>> for Selector {
    fn from(names: Vec<&str>) -> Self {
        Selector::Names(names.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for Selector {
    fn from(names: Vec<String>) -> Self {
        Selector::Names(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{MetadataSource, SAMPLE_NAMES};
    use rstest::rstest;

    fn axis(n: usize) -> BoundTable {
        BoundTable::build(MetadataSource::Empty, n, TableRole::Row, None).unwrap()
    }

    #[rstest]
    #[case(Selector::Full, vec![0, 1, 2, 3, 4])]
    #[case(Selector::Index(1), vec![1])]
    #[case(Selector::Index(-1), vec![4])]
    #[case(Selector::from(1..3), vec![1, 2])]
    #[case(Selector::from(3..), vec![3, 4])]
    #[case(Selector::Slice(Slice::new(-2, None, 1)), vec![3, 4])]
    #[case(Selector::Slice(Slice::new(0, None, 2)), vec![0, 2, 4])]
    #[case(Selector::Slice(Slice::new(0, Some(4), -2)), vec![3, 1])]
    #[case(Selector::Slice(Slice::new(1, Some(99), 1)), vec![1, 2, 3, 4])]
    #[case(Selector::Slice(Slice::new(4, Some(2), 1)), vec![])]
    #[case(Selector::Indices(vec![4, 0, 0, -2]), vec![4, 0, 0, 3])]
    #[case(Selector::Mask(vec![true, false, false, true, false]), vec![0, 3])]
    #[case(Selector::from("2"), vec![2])]
    #[case(Selector::from(vec!["4", "1"]), vec![4, 1])]
    fn resolves_positions(#[case] selector: Selector, #[case] expected: Vec<usize>) {
        assert_eq!(selector.resolve(&axis(5)).unwrap(), expected);
    }

    #[rstest]
    #[case(Selector::Index(5))]
    #[case(Selector::Index(-6))]
    #[case(Selector::Indices(vec![0, 7]))]
    fn out_of_bounds(#[case] selector: Selector) {
        assert!(matches!(
            selector.resolve(&axis(5)),
            Err(MatrixError::IndexOutOfBounds { len: 5, role: TableRole::Row, .. })
        ));
    }

    #[test]
    fn mask_length_checked() {
        let err = Selector::Mask(vec![true]).resolve(&axis(3)).unwrap_err();
        assert_eq!(
            err,
            MatrixError::MaskLengthMismatch {
                expected: 3,
                got: 1,
                role: TableRole::Row
            }
        );
    }

    #[test]
    fn zero_step_rejected() {
        let zero = Slice {
            start: 0,
            end: None,
            step: 0,
        };
        let err = Selector::Slice(zero)
            .resolve(&axis(3))
            .unwrap_err();
        assert_eq!(err, MatrixError::ZeroSliceStep);
    }

    #[test]
    fn names_match_identity_labels() {
        let source = MetadataSource::columns([(SAMPLE_NAMES, vec!["a", "b", "c"])]);
        let table = BoundTable::build(source, 3, TableRole::Row, None).unwrap();
        assert_eq!(Selector::from("c").resolve(&table).unwrap(), vec![2]);
        assert_eq!(
            Selector::from("z").resolve(&table).unwrap_err(),
            MatrixError::UnknownName {
                name: "z".into(),
                role: TableRole::Row
            }
        );
    }
}
