//! Object persistence with merge-on-load.
//!
//! This crate saves persistable objects as XML documents and loads documents
//! back *into* live objects, preserving their identity.
//!
//! # Features
//!
//! - **Merge-on-load**: a loaded document is decoded into a fresh image whose
//!   fields are copied into the target; container fields are cleared and
//!   refilled in place
//! - **Field tables**: each type declares its fields once, with the access
//!   mode the merge honours (assign, refill, read-only, ignored)
//! - **Extra-type discovery**: polymorphic members are checked against the
//!   types resolved by [`graft_registry`]
//! - **Atomic writes**: saves go to a temp sibling that is renamed into place
//! - **Lifecycle hooks** around serialization and deserialization
//!
//! # Example
//!
//! ```ignore
//! use graft_persistence::Persistence;
//! use graft_registry::TypeRegistry;
//!
//! let persistence = Persistence::new(TypeRegistry::new());
//!
//! let mut config = Config::default();
//! config.set_file_name("cfg.xml".into());
//! persistence.try_save_to_path(&mut config, "settings")?;
//!
//! // Merge the saved document back into an existing instance.
//! let mut live = Config::default();
//! persistence.try_load(&mut live, "settings/cfg.xml")?;
//! ```
//!
//! # Architecture
//!
//! The crate is organized into:
//!
//! - `lifecycle.rs` - The [`Persistable`] contract
//! - `fields/` - Field descriptor tables and container capabilities
//! - `merge.rs` - Merge-on-load
//! - `codec/` - The [`DocumentCodec`] boundary and the XML codec
//! - `io/` - Save target reconciliation and atomic writes
//! - `facade.rs` - [`Persistence`], the entry point
//! - `config.rs` - [`PersistenceConfig`]
//! - `error.rs` - Error types with user-friendly messages

mod codec;
mod config;
mod error;
mod facade;
mod fields;
mod io;
mod lifecycle;
mod merge;

// Re-export main types
pub use codec::{
    CodecError, DocumentCodec, TYPE_ATTRIBUTE, TYPE_TAG, XML_DECLARATION, XSI_NAMESPACE, XmlCodec,
};
pub use config::PersistenceConfig;
pub use error::{ConfigError, FailureKind, PersistenceError, Result};
pub use facade::Persistence;
pub use fields::{
    Accessor, Associative, FieldDescriptor, FieldMode, FieldTable, FieldTableBuilder, Sequence,
};
pub use io::{SaveTarget, StagedWrite, reconcile_save_target};
pub use lifecycle::Persistable;
pub use merge::{MergeSummary, assign_scalars, merge};

pub use graft_registry::{ExtraTypeSet, TypeRegistry};
