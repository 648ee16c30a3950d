//! Owner handles and the table write-back channel.
//!
//! A [`BoundTable`] never holds a reference to the matrix that owns it. It
//! carries an [`OwnerId`] instead, and adding a column yields a
//! [`SlotReplacement`]: the rebuilt table plus the slot it must replace. Only
//! the owning matrix, through `&mut`, can apply it, and only while the slot is
//! still at the revision the replacement was built from.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{BoundTable, TableRole};

/// Process-unique identity of an annotated matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        OwnerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rebuilt table destined for one slot of one matrix.
///
/// Produced by [`BoundTable::append_column`]; consumed by
/// `AnnotatedMatrix::apply`.
#[derive(Clone, Debug)]
#[must_use = "a replacement does nothing until applied to its owner"]
pub struct SlotReplacement {
    pub(crate) owner: OwnerId,
    pub(crate) role: TableRole,
    pub(crate) revision: u64,
    pub(crate) table: BoundTable,
}

impl SlotReplacement {
    /// The matrix this replacement is addressed to.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Which slot (row or column table) gets replaced.
    pub fn role(&self) -> TableRole {
        self.role
    }

    /// Revision of the source table when this replacement was built.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The rebuilt table.
    pub fn table(&self) -> &BoundTable {
        &self.table
    }

    pub fn into_table(self) -> BoundTable {
        self.table
    }
}
