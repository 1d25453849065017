//! Clear-and-refill capabilities for container fields.
//!
//! A read-only container field is never replaced during a merge. Its
//! contents are cleared and refilled in place, so the container reached
//! through a shared handle stays the one every other holder sees.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

/// An ordered container that can be emptied and appended to.
pub trait Sequence {
    type Item: Clone;

    /// Copy of the current items, in order.
    fn items(&self) -> Vec<Self::Item>;

    fn clear_items(&mut self);

    fn push_item(&mut self, item: Self::Item);

    /// Replace the contents with `source`'s, keeping `self` in place.
    fn refill_items(&mut self, source: &Self)
    where
        Self: Sized,
    {
        // Copy out first: `source` may share storage with `self`.
        let items = source.items();
        self.clear_items();
        for item in items {
            self.push_item(item);
        }
    }
}

/// A keyed container that can be emptied and inserted into.
///
/// A repeated key follows the container's own insert policy.
pub trait Associative {
    type Key: Clone;
    type Value: Clone;

    /// Copy of the current entries, in iteration order.
    fn entries(&self) -> Vec<(Self::Key, Self::Value)>;

    fn clear_entries(&mut self);

    fn insert_entry(&mut self, key: Self::Key, value: Self::Value);

    /// Replace the contents with `source`'s, keeping `self` in place.
    fn refill_entries(&mut self, source: &Self)
    where
        Self: Sized,
    {
        let entries = source.entries();
        self.clear_entries();
        for (key, value) in entries {
            self.insert_entry(key, value);
        }
    }
}

impl<T: Clone> Sequence for Vec<T> {
    type Item = T;

    fn items(&self) -> Vec<T> {
        self.clone()
    }

    fn clear_items(&mut self) {
        self.clear();
    }

    fn push_item(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: Clone> Sequence for VecDeque<T> {
    type Item = T;

    fn items(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn clear_items(&mut self) {
        self.clear();
    }

    fn push_item(&mut self, item: T) {
        self.push_back(item);
    }
}

impl<C: Sequence> Sequence for Rc<RefCell<C>> {
    type Item = C::Item;

    fn items(&self) -> Vec<C::Item> {
        self.borrow().items()
    }

    fn clear_items(&mut self) {
        self.borrow_mut().clear_items();
    }

    fn push_item(&mut self, item: C::Item) {
        self.borrow_mut().push_item(item);
    }
}

impl<C: Sequence> Sequence for Arc<Mutex<C>> {
    type Item = C::Item;

    fn items(&self) -> Vec<C::Item> {
        self.lock().unwrap_or_else(PoisonError::into_inner).items()
    }

    fn clear_items(&mut self) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_items();
    }

    fn push_item(&mut self, item: C::Item) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_item(item);
    }
}

impl<K: Ord + Clone, V: Clone> Associative for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn entries(&self) -> Vec<(K, V)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn clear_entries(&mut self) {
        self.clear();
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K, V, S> Associative for HashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn entries(&self) -> Vec<(K, V)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn clear_entries(&mut self) {
        self.clear();
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<M: Associative> Associative for Rc<RefCell<M>> {
    type Key = M::Key;
    type Value = M::Value;

    fn entries(&self) -> Vec<(M::Key, M::Value)> {
        self.borrow().entries()
    }

    fn clear_entries(&mut self) {
        self.borrow_mut().clear_entries();
    }

    fn insert_entry(&mut self, key: M::Key, value: M::Value) {
        self.borrow_mut().insert_entry(key, value);
    }
}

impl<M: Associative> Associative for Arc<Mutex<M>> {
    type Key = M::Key;
    type Value = M::Value;

    fn entries(&self) -> Vec<(M::Key, M::Value)> {
        self.lock().unwrap_or_else(PoisonError::into_inner).entries()
    }

    fn clear_entries(&mut self) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_entries();
    }

    fn insert_entry(&mut self, key: M::Key, value: M::Value) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert_entry(key, value);
    }
}
