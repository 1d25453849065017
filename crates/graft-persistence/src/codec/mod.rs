//! Document codec boundary.
//!
//! The facade never touches markup directly. It hands a value, the root
//! element name and the resolved [`ExtraTypeSet`] to a [`DocumentCodec`].

mod type_tags;
mod xml;

use std::io::{Read, Write};

use graft_registry::ExtraTypeSet;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use type_tags::{TYPE_ATTRIBUTE, TYPE_TAG, XSI_NAMESPACE};
pub use xml::{XML_DECLARATION, XmlCodec};

/// Encodes values to documents and back.
///
/// `extra_types` lists the concrete types, beyond `root`, that a document
/// may name for its polymorphic members.
pub trait DocumentCodec {
    /// Write `value` as a document with root element `root`.
    fn encode<T, W>(
        &self,
        writer: W,
        root: &str,
        value: &T,
        extra_types: &ExtraTypeSet,
    ) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
        W: Write;

    /// Read a document into a fresh value.
    fn decode<T, R>(&self, reader: R, root: &str, extra_types: &ExtraTypeSet) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
        R: Read;
}

/// Codec failure.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to encode document")]
    Encode {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to decode document")]
    Decode {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Document is empty")]
    EmptyDocument,

    #[error("Malformed markup")]
    Malformed {
        #[from]
        source: quick_xml::Error,
    },

    /// The document's root element is not the declared type.
    #[error("Expected root element '{expected}', found '{found}'")]
    UnexpectedRoot { expected: String, found: String },

    /// A polymorphic member names a type outside the root and the extra types.
    #[error("Type '{name}' is not known to the codec")]
    UnknownType { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn encode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Encode {
            source: Box::new(source),
        }
    }

    pub(crate) fn decode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode {
            source: Box::new(source),
        }
    }
}
