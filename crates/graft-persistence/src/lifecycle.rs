//! The contract every persistable type implements.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::fields::FieldTable;

/// A type that can be saved and merged back in place.
///
/// The four hooks bracket serialization and deserialization and default to
/// no-ops. `file_name` is the object's own notion of where it lives; an
/// empty string means it has none yet.
///
/// # Example
///
/// ```
/// use std::sync::OnceLock;
///
/// use graft_persistence::{FieldTable, Persistable, accessor};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct Profile {
///     #[serde(skip)]
///     file_name: String,
///     name: String,
///     tags: Vec<String>,
/// }
///
/// impl Persistable for Profile {
///     const TYPE_NAME: &'static str = "Profile";
///
///     fn file_name(&self) -> &str {
///         &self.file_name
///     }
///
///     fn set_file_name(&mut self, file_name: String) {
///         self.file_name = file_name;
///     }
///
///     fn field_table() -> &'static FieldTable<Self> {
///         static TABLE: OnceLock<FieldTable<Profile>> = OnceLock::new();
///         TABLE.get_or_init(|| {
///             FieldTable::builder()
///                 .ignored("file_name")
///                 .scalar("name", accessor!(Profile, name))
///                 .sequence("tags", accessor!(Profile, tags))
///                 .build()
///         })
///     }
/// }
/// ```
pub trait Persistable: Serialize + DeserializeOwned + 'static {
    /// Root element name, and the name this type is registered under.
    const TYPE_NAME: &'static str;

    fn file_name(&self) -> &str;

    fn set_file_name(&mut self, file_name: String);

    /// Field descriptors the merge engine walks.
    fn field_table() -> &'static FieldTable<Self>;

    fn on_begin_serialize(&mut self) {}

    fn on_end_serialize(&mut self) {}

    fn on_begin_deserialize(&mut self) {}

    fn on_end_deserialize(&mut self) {}
}
