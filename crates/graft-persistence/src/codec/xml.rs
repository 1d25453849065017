//! XML codec backed by quick-xml's serde support.

use std::io::{Read, Write};

use graft_registry::ExtraTypeSet;
use quick_xml::se::Serializer;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::type_tags::{read_type_tags, write_type_tags};
use super::{CodecError, DocumentCodec};
use crate::config::PersistenceConfig;

/// XML declaration written ahead of the root element.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Default [`DocumentCodec`]: one XML element per struct field, repeated
/// elements for sequences, child elements keyed by map key.
///
/// # Polymorphic members
///
/// A member whose concrete type varies is written as an element carrying
/// `xsi:type`. On the serde side that attribute is the [`TYPE_TAG`] key
/// `@xsi_type`:
///
/// - an internally tagged enum, `#[serde(tag = "@xsi_type")]`, whose variant
///   names are the registered type names
/// - or a record struct with a `#[serde(rename = "@xsi_type")]` field,
///   converted to and from the enum with `#[serde(try_from, into)]`
///
/// Internally tagged enums are buffered by serde before the variant is
/// picked, and buffered XML text only deserializes into strings. Variants
/// with numeric fields go through a record struct.
///
/// [`TYPE_TAG`]: super::TYPE_TAG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlCodec {
    declaration: bool,
    indent: Option<usize>,
}

impl Default for XmlCodec {
    fn default() -> Self {
        Self::from_config(&PersistenceConfig::default())
    }
}

impl XmlCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self {
            declaration: config.xml_declaration,
            indent: (config.indent > 0).then_some(config.indent),
        }
    }

    /// Write the XML declaration or not.
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    /// Indent nested elements by `width` spaces, or write a single line with `None`.
    pub fn with_indent(mut self, width: Option<usize>) -> Self {
        self.indent = width;
        self
    }

    fn to_xml<T>(&self, root: &str, value: &T) -> Result<String, CodecError>
    where
        T: Serialize + ?Sized,
    {
        let mut xml = String::new();
        if self.declaration {
            xml.push_str(XML_DECLARATION);
            if self.indent.is_some() {
                xml.push('\n');
            }
        }

        let mut serializer = Serializer::with_root(&mut xml, Some(root)).map_err(CodecError::encode)?;
        if let Some(width) = self.indent {
            serializer.indent(' ', width);
        }
        value.serialize(serializer).map_err(CodecError::encode)?;

        Ok(xml)
    }
}

impl DocumentCodec for XmlCodec {
    fn encode<T, W>(
        &self,
        mut writer: W,
        root: &str,
        value: &T,
        extra_types: &ExtraTypeSet,
    ) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        let xml = self.to_xml(root, value)?;
        let document = write_type_tags(&xml, root, extra_types)?;
        writer.write_all(&document)?;
        writer.flush()?;
        Ok(())
    }

    fn decode<T, R>(&self, mut reader: R, root: &str, extra_types: &ExtraTypeSet) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        if xml.trim().is_empty() {
            return Err(CodecError::EmptyDocument);
        }

        let document = read_type_tags(&xml, root, extra_types)?;
        quick_xml::de::from_reader(document.as_slice()).map_err(CodecError::decode)
    }
}
