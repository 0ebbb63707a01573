use std::{cmp::Ordering, hash::BuildHasher};

use serde::Serialize;

use crate::error::Result;
use crate::map::OrderedMap;
use crate::value::{FromValue, Value};

/// Describes what an ordered map is. Both [`OrderedMap`] and
/// [`SimpleMap`](crate::SimpleMap) implement it; they differ only in which
/// operations are O(1).
pub trait OrderedStore {
    /// Removes every entry.
    fn clear(&mut self);

    /// The number of entries stored right now.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &str) -> Option<&Value>;

    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Gets the value at `key` as a `T`, or None if it is absent or of
    /// another type.
    fn get_as<'a, T>(&'a self, key: &str) -> Option<T>
    where
        T: FromValue<'a>,
    {
        self.get(key).and_then(T::from_value)
    }

    /// Overwrites an existing key in place, or appends a new one. Returns the
    /// previous value.
    fn set(&mut self, key: String, value: Value) -> Option<Value>;

    /// Removes `key`, returning its value. Absent keys are a no-op.
    fn delete(&mut self, key: &str) -> Option<Value>;

    /// Sets `key` and moves it to the back.
    fn push(&mut self, key: String, value: Value) -> Option<Value>;

    /// Removes and returns the last entry.
    fn pop(&mut self) -> Option<(String, Value)>;

    /// Overwrites an existing key in place, or prepends a new one.
    fn set_front(&mut self, key: String, value: Value) -> Option<Value>;

    /// Sets `key` and moves it to the front.
    fn push_front(&mut self, key: String, value: Value) -> Option<Value>;

    /// Removes and returns the first entry.
    fn pop_front(&mut self) -> Option<(String, Value)>;

    /// The position of `key` in the order.
    fn key_index(&self, key: &str) -> Option<usize>;

    fn keys(&self) -> Vec<&str>;

    fn values(&self) -> Vec<&Value>;

    /// Stable reorder of the entries by key.
    fn sort_keys_by<F>(&mut self, compare: F)
    where
        F: FnMut(&str, &str) -> Ordering;

    fn sort_keys(&mut self) {
        self.sort_keys_by(|a, b| a.cmp(b))
    }

    /// Encodes as a JSON object, keys in order.
    fn to_json(&self) -> Result<Vec<u8>>
    where
        Self: Serialize + Sized,
    {
        Ok(serde_json::to_vec(self)?)
    }

    /// Replaces the contents with the JSON object in `data`.
    fn unmarshal_json(&mut self, data: &[u8]) -> Result<()>
    where
        Self: Sized,
    {
        crate::json::unmarshal_into(self, data)
    }
}

impl<S> OrderedStore for OrderedMap<S>
where
    S: BuildHasher,
{
    fn clear(&mut self) {
        OrderedMap::clear(self)
    }

    fn len(&self) -> usize {
        OrderedMap::len(self)
    }

    fn get(&self, key: &str) -> Option<&Value> {
        OrderedMap::get(self, key)
    }

    fn contains_key(&self, key: &str) -> bool {
        OrderedMap::contains_key(self, key)
    }

    fn set(&mut self, key: String, value: Value) -> Option<Value> {
        OrderedMap::set(self, key, value)
    }

    fn delete(&mut self, key: &str) -> Option<Value> {
        OrderedMap::delete(self, key)
    }

    fn push(&mut self, key: String, value: Value) -> Option<Value> {
        OrderedMap::push(self, key, value)
    }

    fn pop(&mut self) -> Option<(String, Value)> {
        OrderedMap::pop(self)
    }

    fn set_front(&mut self, key: String, value: Value) -> Option<Value> {
        OrderedMap::set_front(self, key, value)
    }

    fn push_front(&mut self, key: String, value: Value) -> Option<Value> {
        OrderedMap::push_front(self, key, value)
    }

    fn pop_front(&mut self) -> Option<(String, Value)> {
        OrderedMap::pop_front(self)
    }

    fn key_index(&self, key: &str) -> Option<usize> {
        OrderedMap::key_index(self, key)
    }

    fn keys(&self) -> Vec<&str> {
        OrderedMap::keys(self)
    }

    fn values(&self) -> Vec<&Value> {
        OrderedMap::values(self)
    }

    fn sort_keys_by<F>(&mut self, compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        OrderedMap::sort_keys_by(self, compare)
    }
}
