//! Extra-type discovery.
//!
//! Starting from the known-subtype hints of a declared type, every concrete
//! type assignable to a hint is added to the result, and the added type's own
//! hints are followed in turn until no new type turns up.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::descriptor::TypeDescriptor;
use crate::module::TypeModule;
use crate::registry::TypeRegistry;

/// Concrete types a codec must know about to handle a declared type.
///
/// Ordered by discovery, never holds a name twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraTypeSet {
    names: Vec<&'static str>,
}

impl ExtraTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type name. Returns `false` if it was already present.
    pub fn insert(&mut self, name: &'static str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| *existing == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> IntoIterator for &'a ExtraTypeSet {
    type Item = &'static str;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, &'static str>>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter().copied()
    }
}

pub(crate) fn resolve(registry: &TypeRegistry, declared: &str) -> ExtraTypeSet {
    let mut extra = ExtraTypeSet::new();

    // Resident lookup first so opted-out types never trigger a module load.
    let resident = registry.find_type(declared).cloned();
    let scan = match resident {
        Some(ref descriptor) if !descriptor.allows_dynamic_types() => {
            tracing::trace!(declared, "Dynamic types not enabled");
            return extra;
        }
        _ => Scan::new(registry.reachable_modules()),
    };

    let Some(descriptor) = resident.as_ref().or_else(|| scan.descriptor(declared)) else {
        tracing::debug!(declared, "Declared type is not registered");
        return extra;
    };
    if !descriptor.allows_dynamic_types() {
        tracing::trace!(declared, "Dynamic types not enabled");
        return extra;
    }

    scan.collect(descriptor.known_subtypes(), &mut extra);
    tracing::debug!(
        declared,
        modules = scan.modules.len(),
        extra_types = extra.len(),
        "Resolved extra types"
    );
    extra
}

struct Scan<'a> {
    modules: Vec<Cow<'a, TypeModule>>,
}

impl<'a> Scan<'a> {
    fn new(modules: Vec<Cow<'a, TypeModule>>) -> Self {
        Self { modules }
    }

    /// First descriptor with this name, in scan order.
    fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.modules.iter().find_map(|module| module.find(name))
    }

    /// Whether `candidate` is `target` or derives from it through declared supertypes.
    fn is_assignable(&self, candidate: &TypeDescriptor, target: &str) -> bool {
        if candidate.name() == target {
            return true;
        }

        let mut visited: HashSet<&str> = HashSet::from([candidate.name()]);
        let mut pending: Vec<&str> = candidate.supertypes().to_vec();

        while let Some(name) = pending.pop() {
            if name == target {
                return true;
            }
            if !visited.insert(name) {
                continue;
            }
            if let Some(supertype) = self.descriptor(name) {
                pending.extend(supertype.supertypes().iter().copied());
            }
        }
        false
    }

    fn collect(&self, hints: &[&'static str], extra: &mut ExtraTypeSet) {
        if hints.is_empty() {
            return;
        }
        for module in &self.modules {
            for candidate in module.types().iter().filter(|t| t.is_concrete()) {
                for hint in hints {
                    if self.is_assignable(candidate, hint) && extra.insert(candidate.name()) {
                        tracing::trace!(
                            module = module.name(),
                            extra_type = candidate.name(),
                            hint = *hint,
                            "Found extra type"
                        );
                        self.collect(candidate.known_subtypes(), extra);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DynamicTypeMarker;

    fn shapes_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new().with_entry("app");
        registry
            .add_module(
                TypeModule::new("app")
                    .with_reference("shapes")
                    .with_type(
                        TypeDescriptor::new("Drawing")
                            .include("Shape")
                            .allow_dynamic_types(),
                    )
                    .with_type(TypeDescriptor::new("Sketch").include("Shape")),
            )
            .add_module(
                TypeModule::new("shapes")
                    .with_type(TypeDescriptor::new("Shape").abstract_type())
                    .with_type(TypeDescriptor::new("Circle").implements("Shape"))
                    .with_type(
                        TypeDescriptor::new("Group")
                            .implements("Shape")
                            .include("Style"),
                    )
                    .with_type(TypeDescriptor::new("Style").abstract_type())
                    .with_type(TypeDescriptor::new("Stroke").implements("Style"))
                    .with_type(TypeDescriptor::new("Dashed").implements("Stroke")),
            );
        registry
    }

    #[test]
    fn test_resolve_follows_hints_of_discovered_types() {
        let registry = shapes_registry();
        let extra = registry.resolve("Drawing");

        assert_eq!(extra.names(), ["Circle", "Group", "Stroke", "Dashed"]);
    }

    #[test]
    fn test_resolve_without_marker_is_empty() {
        let registry = shapes_registry();
        assert!(registry.resolve("Sketch").is_empty());
    }

    #[test]
    fn test_resolve_with_disabled_marker_is_empty() {
        let mut registry = shapes_registry();
        registry.add_module(
            TypeModule::new("closed").with_type(
                TypeDescriptor::new("Locked")
                    .include("Shape")
                    .dynamic_types(DynamicTypeMarker::new(false)),
            ),
        );
        assert!(registry.resolve("Locked").is_empty());
    }

    #[test]
    fn test_resolve_unregistered_type_is_empty() {
        let registry = shapes_registry();
        assert!(registry.resolve("Nowhere").is_empty());
    }

    #[test]
    fn test_hint_that_is_concrete_includes_itself() {
        let mut registry = TypeRegistry::new();
        registry.add_module(
            TypeModule::new("core")
                .with_type(TypeDescriptor::new("Box").include("Item").allow_dynamic_types())
                .with_type(TypeDescriptor::new("Item")),
        );
        assert_eq!(registry.resolve("Box").names(), ["Item"]);
    }

    #[test]
    fn test_mutual_hints_terminate() {
        let mut registry = TypeRegistry::new();
        registry.add_module(
            TypeModule::new("core")
                .with_type(TypeDescriptor::new("Root").include("A").allow_dynamic_types())
                .with_type(TypeDescriptor::new("A").include("B"))
                .with_type(TypeDescriptor::new("B").include("A")),
        );
        assert_eq!(registry.resolve("Root").names(), ["A", "B"]);
    }

    #[test]
    fn test_supertype_cycle_terminates() {
        let mut registry = TypeRegistry::new();
        registry.add_module(
            TypeModule::new("core")
                .with_type(TypeDescriptor::new("Root").include("Base").allow_dynamic_types())
                .with_type(TypeDescriptor::new("Left").implements("Right"))
                .with_type(TypeDescriptor::new("Right").implements("Left")),
        );
        assert!(registry.resolve("Root").is_empty());
    }

    #[test]
    fn test_deferred_module_contributes_types() {
        let mut registry = TypeRegistry::new().with_entry("app");
        registry
            .add_module(
                TypeModule::new("app")
                    .with_reference("plugin")
                    .with_type(
                        TypeDescriptor::new("Document")
                            .include("Block")
                            .allow_dynamic_types(),
                    ),
            )
            .add_deferred("plugin", || {
                Ok(TypeModule::new("plugin")
                    .with_type(TypeDescriptor::new("Block").abstract_type())
                    .with_type(TypeDescriptor::new("Table").implements("Block")))
            });

        assert_eq!(registry.resolve("Document").names(), ["Table"]);
    }

    #[test]
    fn test_declared_type_in_deferred_module() {
        let mut registry = TypeRegistry::new().with_entry("plugin");
        registry.add_deferred("plugin", || {
            Ok(TypeModule::new("plugin")
                .with_type(TypeDescriptor::new("Sheet").include("Cell").allow_dynamic_types())
                .with_type(TypeDescriptor::new("Cell")))
        });

        assert_eq!(registry.resolve("Sheet").names(), ["Cell"]);
    }

    #[test]
    fn test_extra_type_set_rejects_duplicates() {
        let mut set = ExtraTypeSet::new();
        assert!(set.insert("A"));
        assert!(!set.insert("A"));
        assert!(set.insert("B"));
        assert_eq!(set.iter().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(set.len(), 2);
    }
}
