//! Declarative type metadata.

/// Opt-in flag for extra-type discovery.
///
/// A type without a marker, or whose marker is disabled, resolves to an empty
/// extra-type set without any module being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicTypeMarker {
    allow: bool,
}

impl Default for DynamicTypeMarker {
    /// A marker that is present but carries no explicit value is enabled.
    fn default() -> Self {
        Self::new(true)
    }
}

impl DynamicTypeMarker {
    /// Create a marker with an explicit value.
    pub const fn new(allow: bool) -> Self {
        Self { allow }
    }

    /// Whether the marked type opts into discovery.
    #[inline]
    pub const fn allows(&self) -> bool {
        self.allow
    }
}

/// Metadata for a single registered type.
///
/// Names are the identities discovery compares; they are also the element
/// and `xsi:type` names a codec writes, so they must be unique across the
/// modules of one registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: &'static str,
    is_abstract: bool,
    supertypes: Vec<&'static str>,
    known_subtypes: Vec<&'static str>,
    dynamic: Option<DynamicTypeMarker>,
}

impl TypeDescriptor {
    /// Create a concrete type with no relationships and no marker.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            is_abstract: false,
            supertypes: Vec::new(),
            known_subtypes: Vec::new(),
            dynamic: None,
        }
    }

    /// Mark the type abstract. Abstract types are never added to an extra-type set.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Declare a direct supertype (base type or implemented trait).
    pub fn implements(mut self, supertype: &'static str) -> Self {
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        self
    }

    /// Add a known-subtype hint: every concrete type assignable to `hint`
    /// becomes an extra type of this one.
    pub fn include(mut self, hint: &'static str) -> Self {
        if !self.known_subtypes.contains(&hint) {
            self.known_subtypes.push(hint);
        }
        self
    }

    /// Attach an enabled [`DynamicTypeMarker`].
    pub fn allow_dynamic_types(self) -> Self {
        self.dynamic_types(DynamicTypeMarker::default())
    }

    /// Attach a marker with an explicit value.
    pub fn dynamic_types(mut self, marker: DynamicTypeMarker) -> Self {
        self.dynamic = Some(marker);
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[inline]
    pub fn is_concrete(&self) -> bool {
        !self.is_abstract
    }

    /// Direct supertypes, in declaration order.
    pub fn supertypes(&self) -> &[&'static str] {
        &self.supertypes
    }

    /// Known-subtype hints, in declaration order.
    pub fn known_subtypes(&self) -> &[&'static str] {
        &self.known_subtypes
    }

    pub fn dynamic_marker(&self) -> Option<DynamicTypeMarker> {
        self.dynamic
    }

    /// Whether discovery should run for this type at all.
    pub fn allows_dynamic_types(&self) -> bool {
        self.dynamic.is_some_and(|marker| marker.allows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_defaults() {
        assert!(DynamicTypeMarker::default().allows());
        assert!(!DynamicTypeMarker::new(false).allows());
    }

    #[test]
    fn test_allows_dynamic_types() {
        assert!(!TypeDescriptor::new("Plain").allows_dynamic_types());
        assert!(TypeDescriptor::new("Open").allow_dynamic_types().allows_dynamic_types());
        assert!(
            !TypeDescriptor::new("Closed")
                .dynamic_types(DynamicTypeMarker::new(false))
                .allows_dynamic_types()
        );
    }

    #[test]
    fn test_relationships_are_deduplicated() {
        let descriptor = TypeDescriptor::new("Square")
            .implements("Shape")
            .implements("Shape")
            .include("Corner")
            .include("Corner");
        assert_eq!(descriptor.supertypes(), ["Shape"]);
        assert_eq!(descriptor.known_subtypes(), ["Corner"]);
    }
}
