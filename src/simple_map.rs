//! An ordered map built from a plain [`HashMap`] and a [`Vec`] of keys.
//!
//! Appending, lookups and popping from the back are O(1), and iteration walks
//! a flat vec. Anything that has to find a key's position (`delete`, `push`
//! of an existing key, the front operations, `key_index`) scans the key list
//! and is O(n). Prefer [`OrderedMap`](crate::OrderedMap) when entries are
//! removed or reordered often.

use std::{cmp::Ordering, collections::HashMap, fmt, iter::FromIterator};

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::json::StoreVisitor;
use crate::ordered::OrderedStore;
use crate::value::Value;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimpleMap {
    values: HashMap<String, Value>,
    keys: Vec<String>,
}

impl SimpleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: HashMap::with_capacity(capacity),
            keys: Vec::with_capacity(capacity),
        }
    }

    /// The first entry, or None if the map is empty.
    pub fn first(&self) -> Option<SimpleElement<'_>> {
        self.element(0)
    }

    /// The last entry, or None if the map is empty.
    pub fn last(&self) -> Option<SimpleElement<'_>> {
        self.keys.len().checked_sub(1).and_then(|i| self.element(i))
    }

    /// The entry for `key`. O(n), as its position has to be searched for.
    pub fn get_element(&self, key: &str) -> Option<SimpleElement<'_>> {
        if !self.values.contains_key(key) {
            return None;
        }
        self.key_index(key).and_then(|i| self.element(i))
    }

    /// Iterates `(key, value)` pairs in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Value)> + '_ {
        self.keys
            .iter()
            .filter_map(move |k| self.values.get(k).map(|v| (k.as_str(), v)))
    }

    fn element(&self, index: usize) -> Option<SimpleElement<'_>> {
        if index < self.keys.len() {
            Some(SimpleElement { map: self, index })
        } else {
            None
        }
    }

    fn remove_key(&mut self, key: &str) {
        if let Some(i) = self.key_index(key) {
            self.keys.remove(i);
        }
    }
}

impl OrderedStore for SimpleMap {
    fn clear(&mut self) {
        self.values.clear();
        self.keys.clear();
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn set(&mut self, key: String, value: Value) -> Option<Value> {
        if let Some(slot) = self.values.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.keys.push(key.clone());
        self.values.insert(key, value)
    }

    /// O(n): the key's position is found by a linear scan.
    fn delete(&mut self, key: &str) -> Option<Value> {
        let removed = self.values.remove(key)?;
        self.remove_key(key);
        Some(removed)
    }

    /// O(n) if the key already exists, as it is deleted first.
    fn push(&mut self, key: String, value: Value) -> Option<Value> {
        let old = self.delete(&key);
        self.keys.push(key.clone());
        self.values.insert(key, value);
        old
    }

    fn pop(&mut self) -> Option<(String, Value)> {
        let key = self.keys.pop()?;
        let value = self.values.remove(&key)?;
        Some((key, value))
    }

    /// O(n) if the key is new, since every key shifts down by one.
    fn set_front(&mut self, key: String, value: Value) -> Option<Value> {
        if let Some(slot) = self.values.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.keys.insert(0, key.clone());
        self.values.insert(key, value)
    }

    fn push_front(&mut self, key: String, value: Value) -> Option<Value> {
        let old = self.delete(&key);
        self.keys.insert(0, key.clone());
        self.values.insert(key, value);
        old
    }

    fn pop_front(&mut self) -> Option<(String, Value)> {
        if self.keys.is_empty() {
            return None;
        }
        let key = self.keys.remove(0);
        let value = self.values.remove(&key)?;
        Some((key, value))
    }

    fn key_index(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    fn keys(&self) -> Vec<&str> {
        self.keys.iter().map(String::as_str).collect()
    }

    fn values(&self) -> Vec<&Value> {
        self.iter().map(|(_, v)| v).collect()
    }

    fn sort_keys_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        self.keys.sort_by(|a, b| compare(a, b));
    }
}

/// Renders as `map[k1:v1 k2:v2]` in the current order.
impl fmt::Display for SimpleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("map[")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", key, value)?;
        }
        f.write_str("]")
    }
}

impl<K, V> FromIterator<(K, V)> for SimpleMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = SimpleMap::new();
        for (key, value) in iter {
            map.set(key.into(), value.into());
        }
        map
    }
}

impl Serialize for SimpleMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SimpleMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(StoreVisitor::new())
    }
}

/// A position in a [`SimpleMap`]. Stepping is O(1); it's just an index into
/// the key list.
#[derive(Clone, Copy, Debug)]
pub struct SimpleElement<'a> {
    map: &'a SimpleMap,
    index: usize,
}

impl<'a> SimpleElement<'a> {
    pub fn key(&self) -> &'a str {
        &self.map.keys[self.index]
    }

    /// The value stored at this element's key.
    pub fn value(&self) -> Option<&'a Value> {
        self.map.values.get(self.key())
    }

    pub fn next(&self) -> Option<SimpleElement<'a>> {
        self.map.element(self.index + 1)
    }

    pub fn prev(&self) -> Option<SimpleElement<'a>> {
        self.index.checked_sub(1).and_then(|i| self.map.element(i))
    }
}
