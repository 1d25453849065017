//! Named groups of type descriptors.

use crate::descriptor::TypeDescriptor;

/// A named unit of registered types.
///
/// Modules reference each other by name; the registry follows references
/// from its entry module when collecting the modules to scan.
#[derive(Debug, Clone, Default)]
pub struct TypeModule {
    name: String,
    references: Vec<String>,
    types: Vec<TypeDescriptor>,
}

impl TypeModule {
    /// Create an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            references: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Add a reference to another module.
    pub fn with_reference(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.references.contains(&name) {
            self.references.push(name);
        }
        self
    }

    /// Add a type to this module.
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Add a type, replacing any earlier descriptor with the same name.
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        match self
            .types
            .iter_mut()
            .find(|existing| existing.name() == descriptor.name())
        {
            Some(existing) => *existing = descriptor,
            None => self.types.push(descriptor),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Referenced module names, in declaration order.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Types in registration order.
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// Look up a type defined in this module.
    pub fn find(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|descriptor| descriptor.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_replaces_same_name() {
        let mut module = TypeModule::new("core");
        module.register(TypeDescriptor::new("Node"));
        module.register(TypeDescriptor::new("Node").abstract_type());

        assert_eq!(module.types().len(), 1);
        assert!(module.find("Node").unwrap().is_abstract());
    }

    #[test]
    fn test_references_keep_order() {
        let module = TypeModule::new("app")
            .with_reference("b")
            .with_reference("a")
            .with_reference("b");
        assert_eq!(module.references(), ["b", "a"]);
    }
}
