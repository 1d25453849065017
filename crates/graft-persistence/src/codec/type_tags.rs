//! `xsi:type` handling.
//!
//! A polymorphic member is written with an `xsi:type` attribute naming its
//! concrete type. Only the root type and the resolved extra types may appear
//! there; anything else was never made known to the codec.
//!
//! quick-xml's deserializer drops attribute prefixes, so `xsi:type` would
//! reach serde as `@type` and collide with any plain `type` attribute. Both
//! directions therefore translate between `xsi:type` in the document and
//! [`TYPE_TAG`] on the serde side. The attribute is recognised through the
//! XML Schema instance namespace, whatever prefix binds it. An unbound `xsi`
//! prefix is accepted as well.

use std::borrow::Cow;

use graft_registry::ExtraTypeSet;
use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::reader::NsReader;

use super::CodecError;

/// Attribute carrying the concrete type of a polymorphic element.
pub const TYPE_ATTRIBUTE: &str = "xsi:type";

/// Namespace `xsi:type` belongs to.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Serde key the concrete type is exposed under, e.g.
/// `#[serde(rename = "@xsi_type")]` or `#[serde(tag = "@xsi_type")]`.
pub const TYPE_TAG: &str = "@xsi_type";

const TAG_KEY: &[u8] = b"xsi_type";
const XSI_DECLARATION: &str = "xmlns:xsi";

/// Rewrite serializer output: [`TYPE_TAG`] attributes become `xsi:type`.
pub(crate) fn write_type_tags(
    xml: &str,
    root: &str,
    extra_types: &ExtraTypeSet,
) -> Result<Vec<u8>, CodecError> {
    rewrite_elements(xml, root, |_, element| {
        let mut attributes = Vec::new();
        let mut tagged = false;
        let mut declared = false;

        for attribute in element.attributes() {
            let attribute = attribute.map_err(|err| CodecError::Malformed { source: err.into() })?;
            if attribute.key.as_ref() == TAG_KEY {
                check_allowed(&attribute.value, root, extra_types)?;
                attributes.push(Attribute {
                    key: QName(TYPE_ATTRIBUTE.as_bytes()),
                    value: attribute.value,
                });
                tagged = true;
            } else {
                declared |= attribute.key.as_ref() == XSI_DECLARATION.as_bytes();
                attributes.push(attribute);
            }
        }

        if !tagged {
            return Ok(None);
        }
        if !declared {
            attributes.insert(0, Attribute::from((XSI_DECLARATION, XSI_NAMESPACE)));
        }
        Ok(Some(rebuild(element, attributes)))
    })
}

/// Rewrite a document for the deserializer: `xsi:type` attributes become
/// [`TYPE_TAG`] and declarations of the instance namespace are dropped.
///
/// Fails on a root element other than `root` and on any type outside
/// `root` and `extra_types`.
pub(crate) fn read_type_tags(
    xml: &str,
    root: &str,
    extra_types: &ExtraTypeSet,
) -> Result<Vec<u8>, CodecError> {
    rewrite_elements(xml, root, |reader, element| {
        let mut attributes = Vec::new();
        let mut changed = false;

        for attribute in element.attributes() {
            let attribute = attribute.map_err(|err| CodecError::Malformed { source: err.into() })?;
            if declares_xsi(&attribute) {
                changed = true;
            } else if is_type_attribute(reader, &attribute) {
                check_allowed(&attribute.value, root, extra_types)?;
                attributes.push(Attribute {
                    key: QName(TAG_KEY),
                    value: attribute.value,
                });
                changed = true;
            } else {
                attributes.push(attribute);
            }
        }

        Ok(changed.then(|| rebuild(element, attributes)))
    })
}

/// Copy `xml` event by event, letting `rewrite` replace start tags.
fn rewrite_elements<F>(xml: &str, root: &str, mut rewrite: F) -> Result<Vec<u8>, CodecError>
where
    F: FnMut(&NsReader<&[u8]>, &BytesStart<'_>) -> Result<Option<BytesStart<'static>>, CodecError>,
{
    let mut reader = NsReader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut seen_root = false;

    loop {
        let event = match reader
            .read_event()
            .map_err(|source| CodecError::Malformed { source })?
        {
            Event::Start(element) => {
                check_root(&mut seen_root, &element, root)?;
                match rewrite(&reader, &element)? {
                    Some(replaced) => Event::Start(replaced),
                    None => Event::Start(element),
                }
            }
            Event::Empty(element) => {
                check_root(&mut seen_root, &element, root)?;
                match rewrite(&reader, &element)? {
                    Some(replaced) => Event::Empty(replaced),
                    None => Event::Empty(element),
                }
            }
            Event::Eof => break,
            event => event,
        };
        writer.write_event(event)?;
    }

    Ok(writer.into_inner())
}

fn check_root(seen_root: &mut bool, element: &BytesStart<'_>, root: &str) -> Result<(), CodecError> {
    if std::mem::replace(seen_root, true) {
        return Ok(());
    }
    let found = element.local_name();
    if found.as_ref() != root.as_bytes() {
        return Err(CodecError::UnexpectedRoot {
            expected: root.to_string(),
            found: String::from_utf8_lossy(found.as_ref()).into_owned(),
        });
    }
    Ok(())
}

fn check_allowed(value: &[u8], root: &str, extra_types: &ExtraTypeSet) -> Result<(), CodecError> {
    let name = String::from_utf8_lossy(value);
    if name != root && !extra_types.contains(&name) {
        return Err(CodecError::UnknownType {
            name: name.into_owned(),
        });
    }
    Ok(())
}

fn is_type_attribute(reader: &NsReader<&[u8]>, attribute: &Attribute<'_>) -> bool {
    if attribute.key.as_ref() == TAG_KEY {
        return true;
    }
    let (namespace, local) = reader.resolve_attribute(attribute.key);
    if local.as_ref() != b"type" {
        return false;
    }
    match namespace {
        ResolveResult::Bound(Namespace(uri)) => uri == XSI_NAMESPACE.as_bytes(),
        ResolveResult::Unknown(prefix) => prefix == b"xsi",
        ResolveResult::Unbound => false,
    }
}

fn declares_xsi(attribute: &Attribute<'_>) -> bool {
    attribute.key.as_ref().starts_with(b"xmlns:") && attribute.value.as_ref() == XSI_NAMESPACE.as_bytes()
}

fn rebuild(element: &BytesStart<'_>, attributes: Vec<Attribute<'_>>) -> BytesStart<'static> {
    let name: Cow<'static, str> = String::from_utf8_lossy(element.name().as_ref())
        .into_owned()
        .into();
    let mut rebuilt = BytesStart::new(name);
    for attribute in attributes {
        rebuilt.push_attribute(attribute);
    }
    rebuilt
}
