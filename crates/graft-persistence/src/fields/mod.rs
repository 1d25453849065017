//! Per-type field descriptor tables.
//!
//! Each persistable type describes its fields once, in a [`FieldTable`], and
//! the merge engine walks that table instead of inspecting values at run
//! time.

mod container;
mod table;

pub use container::{Associative, Sequence};
pub use table::{Accessor, FieldDescriptor, FieldMode, FieldTable, FieldTableBuilder};

/// Build an [`Accessor`] for a named struct field.
///
/// ```
/// use graft_persistence::accessor;
///
/// struct Profile {
///     name: String,
/// }
///
/// let access = accessor!(Profile, name);
/// let mut profile = Profile { name: "a".to_string() };
/// access.get_mut(&mut profile).push('b');
/// assert_eq!(access.get(&profile), "ab");
/// ```
#[macro_export]
macro_rules! accessor {
    ($ty:ty, $field:ident) => {
        $crate::Accessor::<$ty, _>::new(
            |value: &$ty| &value.$field,
            |value: &mut $ty| &mut value.$field,
        )
    };
}
