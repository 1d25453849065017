//! Type registry and extra-type discovery for Graft persistence.
//!
//! A document codec can only round-trip a polymorphic member if it was told
//! about the member's concrete type up front. This crate works out that set
//! of "extra types" for a declared type.
//!
//! # Model
//!
//! - [`TypeDescriptor`] - declarative metadata for one type: its supertypes,
//!   its known-subtype hints and an optional [`DynamicTypeMarker`]
//! - [`TypeModule`] - a named group of descriptors that may reference other
//!   modules by name
//! - [`TypeRegistry`] - the explicit context discovery runs against: an entry
//!   module plus resident and deferred modules
//! - [`ExtraTypeSet`] - the ordered, duplicate-free result
//!
//! # Example
//!
//! ```
//! use graft_registry::{TypeDescriptor, TypeModule, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! registry.add_module(
//!     TypeModule::new("shapes")
//!         .with_type(TypeDescriptor::new("Drawing").include("Shape").allow_dynamic_types())
//!         .with_type(TypeDescriptor::new("Shape").abstract_type())
//!         .with_type(TypeDescriptor::new("Circle").implements("Shape")),
//! );
//!
//! let extra = registry.resolve("Drawing");
//! assert_eq!(extra.names(), ["Circle"]);
//! ```

mod descriptor;
mod discovery;
mod error;
mod module;
mod registry;

pub use descriptor::{DynamicTypeMarker, TypeDescriptor};
pub use discovery::ExtraTypeSet;
pub use error::{DiscoveryError, Result};
pub use module::TypeModule;
pub use registry::{ModuleLoader, TypeRegistry};
