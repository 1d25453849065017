//! Merge-on-load.
//!
//! A loaded image never replaces the live object. Its field values are
//! copied into the target, and container fields are refilled in place, so
//! anything holding the target or one of its containers keeps seeing the
//! current state.

use crate::fields::FieldMode;
use crate::lifecycle::Persistable;

/// What a merge did, field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Read-write fields assigned from the image.
    pub assigned: usize,
    /// Container fields cleared and refilled.
    pub refilled: usize,
    /// Read-only fields left alone.
    pub skipped: usize,
    /// Fields excluded from the document.
    pub ignored: usize,
}

impl MergeSummary {
    /// Fields that changed the target.
    pub fn written(&self) -> usize {
        self.assigned + self.refilled
    }
}

/// Merge `image` into `target`.
///
/// Fires `on_begin_deserialize` and `on_end_deserialize` on the target
/// around the walk. There is no rollback; every field of the table is
/// visited.
pub fn merge<T: Persistable>(target: &mut T, image: &T) -> MergeSummary {
    target.on_begin_deserialize();

    let mut summary = MergeSummary::default();
    for field in T::field_table().fields() {
        match field.mode() {
            FieldMode::Ignored => summary.ignored += 1,
            FieldMode::ReadOnly => summary.skipped += 1,
            mode => {
                field.transfer(target, image);
                if mode.is_refilled() {
                    summary.refilled += 1;
                } else {
                    summary.assigned += 1;
                }
            }
        }
    }

    target.on_end_deserialize();

    tracing::trace!(
        type_name = T::TYPE_NAME,
        assigned = summary.assigned,
        refilled = summary.refilled,
        skipped = summary.skipped,
        "Merged loaded image"
    );
    summary
}

/// Copy only the scalar fields of `source` into `target`.
///
/// No hooks fire and containers are left alone.
pub fn assign_scalars<T: Persistable>(source: &T, target: &mut T) -> usize {
    T::field_table()
        .fields()
        .iter()
        .filter(|field| field.mode() == FieldMode::Scalar)
        .filter(|field| field.transfer(target, source))
        .count()
}
