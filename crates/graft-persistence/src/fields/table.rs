use std::fmt;

use super::container::{Associative, Sequence};

/// Getter pair for one field of `T`.
pub struct Accessor<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T, V> Clone for Accessor<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Accessor<T, V> {}

impl<T, V> Accessor<T, V> {
    pub fn new(get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        Self { get, get_mut }
    }

    #[inline]
    pub fn get<'a>(&self, value: &'a T) -> &'a V {
        (self.get)(value)
    }

    #[inline]
    pub fn get_mut<'a>(&self, value: &'a mut T) -> &'a mut V {
        (self.get_mut)(value)
    }
}

/// How the merge engine treats a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Read-write value-like field, assigned by clone.
    Scalar,
    /// Read-write field of any other type, assigned by clone.
    Value,
    /// Read-only sequence, cleared and refilled in place.
    Sequence,
    /// Read-only keyed container, cleared and refilled in place.
    Map,
    /// Read-only field with no refill capability. Left alone.
    ReadOnly,
    /// Not part of the document. Neither read nor written.
    Ignored,
}

impl FieldMode {
    /// Whether a merge assigns the field.
    pub fn is_assigned(self) -> bool {
        matches!(self, Self::Scalar | Self::Value)
    }

    /// Whether a merge refills the field in place.
    pub fn is_refilled(self) -> bool {
        matches!(self, Self::Sequence | Self::Map)
    }
}

trait FieldAccess<T>: Send + Sync {
    fn transfer(&self, target: &mut T, source: &T);
}

struct AssignField<T, V> {
    access: Accessor<T, V>,
}

impl<T, V: Clone> FieldAccess<T> for AssignField<T, V> {
    fn transfer(&self, target: &mut T, source: &T) {
        *self.access.get_mut(target) = self.access.get(source).clone();
    }
}

struct SequenceField<T, C> {
    access: Accessor<T, C>,
}

impl<T, C: Sequence> FieldAccess<T> for SequenceField<T, C> {
    fn transfer(&self, target: &mut T, source: &T) {
        self.access
            .get_mut(target)
            .refill_items(self.access.get(source));
    }
}

struct MapField<T, M> {
    access: Accessor<T, M>,
}

impl<T, M: Associative> FieldAccess<T> for MapField<T, M> {
    fn transfer(&self, target: &mut T, source: &T) {
        self.access
            .get_mut(target)
            .refill_entries(self.access.get(source));
    }
}

/// One entry of a [`FieldTable`].
pub struct FieldDescriptor<T> {
    name: &'static str,
    mode: FieldMode,
    access: Option<Box<dyn FieldAccess<T> + Send + Sync>>,
}

impl<T> FieldDescriptor<T> {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    /// Copy or refill this field from `source` into `target`.
    ///
    /// Returns `false` for read-only and ignored fields, which are left alone.
    pub fn transfer(&self, target: &mut T, source: &T) -> bool {
        match &self.access {
            Some(access) => {
                access.transfer(target, source);
                true
            }
            None => false,
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Field descriptors for a persistable type, in declaration order.
///
/// Built once per type, usually behind a `OnceLock` in
/// [`Persistable::field_table`](crate::Persistable::field_table).
pub struct FieldTable<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.fields).finish()
    }
}

impl<T: 'static> FieldTable<T> {
    pub fn builder() -> FieldTableBuilder<T> {
        FieldTableBuilder { fields: Vec::new() }
    }
}

impl<T> FieldTable<T> {
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`FieldTable`]. A name added twice keeps the later entry.
pub struct FieldTableBuilder<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: 'static> FieldTableBuilder<T> {
    /// Read-write value-like field (string, number, enum).
    pub fn scalar<V>(self, name: &'static str, access: Accessor<T, V>) -> Self
    where
        V: Clone + 'static,
    {
        self.push(name, FieldMode::Scalar, Some(Box::new(AssignField { access })))
    }

    /// Read-write field of any other type. Shared handles are copied by reference.
    pub fn value<V>(self, name: &'static str, access: Accessor<T, V>) -> Self
    where
        V: Clone + 'static,
    {
        self.push(name, FieldMode::Value, Some(Box::new(AssignField { access })))
    }

    /// Read-only sequence exposed by reference.
    pub fn sequence<C>(self, name: &'static str, access: Accessor<T, C>) -> Self
    where
        C: Sequence + 'static,
    {
        self.push(
            name,
            FieldMode::Sequence,
            Some(Box::new(SequenceField { access })),
        )
    }

    /// Read-only keyed container exposed by reference.
    pub fn map<M>(self, name: &'static str, access: Accessor<T, M>) -> Self
    where
        M: Associative + 'static,
    {
        self.push(name, FieldMode::Map, Some(Box::new(MapField { access })))
    }

    /// Read-only field a merge cannot write.
    pub fn read_only(self, name: &'static str) -> Self {
        self.push(name, FieldMode::ReadOnly, None)
    }

    /// Field excluded from the document.
    pub fn ignored(self, name: &'static str) -> Self {
        self.push(name, FieldMode::Ignored, None)
    }

    pub fn build(self) -> FieldTable<T> {
        FieldTable {
            fields: self.fields,
        }
    }

    fn push(
        mut self,
        name: &'static str,
        mode: FieldMode,
        access: Option<Box<dyn FieldAccess<T> + Send + Sync>>,
    ) -> Self {
        let descriptor = FieldDescriptor { name, mode, access };
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(existing) => *existing = descriptor,
            None => self.fields.push(descriptor),
        }
        self
    }
}
