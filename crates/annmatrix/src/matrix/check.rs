//! Shape consistency between storage and its metadata tables.

use crate::error::{MatrixError, Result};
use crate::table::BoundTable;

/// Verify that both tables match the storage shape.
///
/// # Errors
///
/// [`MatrixError::RowCountMismatch`] when the row table's length differs from
/// `shape.0`, else [`MatrixError::ColumnCountMismatch`] when the column
/// table's length differs from `shape.1`.
pub fn check_dimensions(
    shape: (usize, usize),
    row_table: &BoundTable,
    col_table: &BoundTable,
) -> Result<()> {
    if row_table.row_count() != shape.0 {
        return Err(MatrixError::RowCountMismatch {
            expected: shape.0,
            got: row_table.row_count(),
        });
    }
    if col_table.row_count() != shape.1 {
        return Err(MatrixError::ColumnCountMismatch {
            expected: shape.1,
            got: col_table.row_count(),
        });
    }
    Ok(())
}
