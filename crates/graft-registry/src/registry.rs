//! The explicit registry discovery runs against.

use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::descriptor::TypeDescriptor;
use crate::discovery::{self, ExtraTypeSet};
use crate::error::{DiscoveryError, Result};
use crate::module::TypeModule;

/// Loader for a module that is only built when a scan reaches it.
pub type ModuleLoader = Box<dyn Fn() -> Result<TypeModule> + Send + Sync>;

enum ModuleSlot {
    Resident(TypeModule),
    Deferred { name: String, loader: ModuleLoader },
}

impl ModuleSlot {
    fn name(&self) -> &str {
        match self {
            Self::Resident(module) => module.name(),
            Self::Deferred { name, .. } => name,
        }
    }
}

/// Registry of type modules.
///
/// Replaces any process-wide notion of "loaded modules": everything discovery
/// may scan is registered here explicitly, so a resolution is reproducible
/// for a given registry.
///
/// A scan visits the entry module, then the modules it references
/// (transitively, breadth-first, in declaration order), then every resident
/// module not reached that way. Each module name is scanned at most once.
/// Deferred modules are only loaded when a reference reaches them.
#[derive(Default)]
pub struct TypeRegistry {
    entry: Option<String>,
    slots: Vec<ModuleSlot>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("entry", &self.entry)
            .field(
                "modules",
                &self.slots.iter().map(ModuleSlot::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the module scans start from.
    pub fn with_entry(mut self, name: impl Into<String>) -> Self {
        self.set_entry(name);
        self
    }

    pub fn set_entry(&mut self, name: impl Into<String>) {
        self.entry = Some(name.into());
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    /// Register an already-built module.
    pub fn add_module(&mut self, module: TypeModule) -> &mut Self {
        self.slots.push(ModuleSlot::Resident(module));
        self
    }

    /// Register a module that is built on demand.
    ///
    /// A loader error excludes the module from that scan; it never reaches
    /// the caller of [`TypeRegistry::resolve`].
    pub fn add_deferred<F>(&mut self, name: impl Into<String>, loader: F) -> &mut Self
    where
        F: Fn() -> Result<TypeModule> + Send + Sync + 'static,
    {
        self.slots.push(ModuleSlot::Deferred {
            name: name.into(),
            loader: Box::new(loader),
        });
        self
    }

    /// Number of registered modules, resident and deferred.
    pub fn module_count(&self) -> usize {
        self.slots.len()
    }

    /// Find a type among the resident modules.
    pub fn find_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.slots.iter().find_map(|slot| match slot {
            ModuleSlot::Resident(module) => module.find(name),
            ModuleSlot::Deferred { .. } => None,
        })
    }

    /// Compute the extra-type set for `declared`.
    ///
    /// Runs a fresh scan on every call.
    pub fn resolve(&self, declared: &str) -> ExtraTypeSet {
        discovery::resolve(self, declared)
    }

    /// Collect every module a scan visits, in scan order.
    pub(crate) fn reachable_modules(&self) -> Vec<Cow<'_, TypeModule>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut modules = Vec::new();
        let mut queue: VecDeque<String> = self.entry.iter().cloned().collect();

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            let module = match self.load(&name) {
                Ok(module) => module,
                Err(err) => {
                    tracing::debug!(module = %name, error = %err, "Skipping module");
                    continue;
                }
            };
            if module.name() != name && !seen.insert(module.name().to_string()) {
                continue;
            }
            queue.extend(module.references().iter().cloned());
            modules.push(module);
        }

        for slot in &self.slots {
            if let ModuleSlot::Resident(module) = slot
                && seen.insert(module.name().to_string())
            {
                modules.push(Cow::Borrowed(module));
            }
        }

        modules
    }

    fn load(&self, name: &str) -> Result<Cow<'_, TypeModule>> {
        let slot = self
            .slots
            .iter()
            .find(|slot| slot.name() == name)
            .ok_or_else(|| DiscoveryError::UnknownModule {
                name: name.to_string(),
            })?;

        match slot {
            ModuleSlot::Resident(module) => Ok(Cow::Borrowed(module)),
            ModuleSlot::Deferred { loader, .. } => loader().map(Cow::Owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(modules: &[Cow<'_, TypeModule>]) -> Vec<String> {
        modules.iter().map(|m| m.name().to_string()).collect()
    }

    #[test]
    fn test_scan_order_entry_then_references_then_resident() {
        let mut registry = TypeRegistry::new().with_entry("app");
        registry
            .add_module(TypeModule::new("extra"))
            .add_module(TypeModule::new("lib").with_reference("base"))
            .add_module(TypeModule::new("base"))
            .add_module(TypeModule::new("app").with_reference("lib"));

        let modules = registry.reachable_modules();
        assert_eq!(names(&modules), ["app", "lib", "base", "extra"]);
    }

    #[test]
    fn test_module_reached_twice_is_scanned_once() {
        let mut registry = TypeRegistry::new().with_entry("app");
        registry
            .add_module(
                TypeModule::new("app")
                    .with_reference("left")
                    .with_reference("right"),
            )
            .add_module(TypeModule::new("left").with_reference("shared"))
            .add_module(TypeModule::new("right").with_reference("shared"))
            .add_module(TypeModule::new("shared").with_reference("app"));

        let modules = registry.reachable_modules();
        assert_eq!(names(&modules), ["app", "left", "right", "shared"]);
    }

    #[test]
    fn test_failing_and_unknown_modules_are_skipped() {
        let mut registry = TypeRegistry::new().with_entry("app");
        registry
            .add_module(
                TypeModule::new("app")
                    .with_reference("broken")
                    .with_reference("missing")
                    .with_reference("plugin"),
            )
            .add_deferred("broken", || {
                Err(DiscoveryError::load_failed("broken", "bad image"))
            })
            .add_deferred("plugin", || Ok(TypeModule::new("plugin")));

        let modules = registry.reachable_modules();
        assert_eq!(names(&modules), ["app", "plugin"]);
    }

    #[test]
    fn test_deferred_module_not_loaded_unless_referenced() {
        let mut registry = TypeRegistry::new();
        registry
            .add_module(TypeModule::new("core"))
            .add_deferred("lazy", || panic!("loader must not run"));

        let modules = registry.reachable_modules();
        assert_eq!(names(&modules), ["core"]);
    }

    #[test]
    fn test_find_type_searches_resident_modules() {
        let mut registry = TypeRegistry::new();
        registry.add_module(TypeModule::new("core").with_type(TypeDescriptor::new("Node")));

        assert!(registry.find_type("Node").is_some());
        assert!(registry.find_type("Edge").is_none());
        assert_eq!(registry.module_count(), 1);
    }
}
