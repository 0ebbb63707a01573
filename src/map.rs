//! The linked, insertion-ordered map.

use std::{
    cmp::Ordering,
    collections::{hash_map::RandomState, HashMap},
    fmt,
    hash::BuildHasher,
    iter::FromIterator,
    mem,
};

use crate::linked_list::{LinkedList, NodeHandle};
use crate::value::{FromValue, Value};

/// A key and its value, as stored in the order list.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) key: String,
    pub(crate) value: Value,
}

/// A string-keyed map which remembers the order its keys were placed in.
///
/// Lookups go through a [`HashMap`] from key to a handle into an arena-backed
/// doubly linked list, which holds the entries themselves in order. Every
/// single-key operation (`get`, `set`, `delete`, `push`, `pop` and their
/// front variants) is O(1); the two structures are updated together by every
/// mutation so they always contain the same keys.
///
/// | Operation     | Time       |
/// |---------------|------------|
/// | `clear`       | O(1)*      |
/// | `get`         | O(1)       |
/// | `set`         | O(1)       |
/// | `delete`      | O(1)       |
/// | `push`        | O(1)       |
/// | `pop`         | O(1)       |
/// | `set_front`   | O(1)       |
/// | `push_front`  | O(1)       |
/// | `pop_front`   | O(1)       |
/// | `first`/`last`/`get_element` | O(1) |
/// | `key_index`   | O(n)       |
/// | `keys`/`values` | O(n)     |
/// | `sort_keys_by`| O(n log n) |
///
/// \* plus dropping the values.
///
/// Like [`HashMap`] there is no internal synchronization; see
/// `SharedMap` for a lock-wrapped variant.
#[derive(Clone)]
pub struct OrderedMap<S = RandomState> {
    index: HashMap<String, NodeHandle, S>,
    entries: LinkedList<Entry>,
}

impl OrderedMap<RandomState> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Makes a new map with room for `capacity` entries before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<S> OrderedMap<S>
where
    S: BuildHasher,
{
    /// Makes a new map with a specified capacity and hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            entries: LinkedList::with_capacity(capacity),
        }
    }

    /// Removes every entry. The map keeps its allocations.
    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();

        #[cfg(test)]
        self.continuity_test();
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let handle = *self.index.get(key)?;
        self.entries.get(handle).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let handle = *self.index.get(key)?;
        self.entries.get_mut(handle).map(|e| &mut e.value)
    }

    /// Gets the value at `key` converted to `T`. Returns None if the key is
    /// absent or the value holds a different type.
    ///
    /// ```
    /// # use linked_json_map::OrderedMap;
    /// let mut m = OrderedMap::new();
    /// m.set("name", "value");
    /// assert_eq!(Some("value"), m.get_as::<&str>("name"));
    /// assert_eq!(None, m.get_as::<i64>("name"));
    /// ```
    pub fn get_as<'a, T>(&'a self, key: &str) -> Option<T>
    where
        T: FromValue<'a>,
    {
        self.get(key).and_then(T::from_value)
    }

    /// Sets the value for `key`. An existing key keeps its position and has
    /// its value replaced, which is returned. A new key goes to the back.
    pub fn set<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert_with(key.into(), value.into(), LinkedList::push_back)
    }

    /// Like [`set`](Self::set), but a new key goes to the front. An existing
    /// key is only overwritten, never moved.
    pub fn set_front<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert_with(key.into(), value.into(), LinkedList::push_front)
    }

    /// Sets the value for `key` and moves it to the back, as if it had just
    /// been added. Returns the previous value, if any.
    pub fn push<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let key = key.into();
        let old = self.delete(&key);
        self.insert_with(key, value.into(), LinkedList::push_back);
        old
    }

    /// Sets the value for `key` and moves it to the front. Returns the
    /// previous value, if any.
    pub fn push_front<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let key = key.into();
        let old = self.delete(&key);
        self.insert_with(key, value.into(), LinkedList::push_front);
        old
    }

    /// Removes `key`, returning its value. Removing an absent key is a no-op.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        let handle = self.index.remove(key)?;
        let removed = self.entries.remove(handle).map(|e| e.value);

        #[cfg(test)]
        self.continuity_test();

        removed
    }

    /// Removes and returns the last entry.
    pub fn pop(&mut self) -> Option<(String, Value)> {
        let entry = self.entries.pop_back()?;
        self.index.remove(&entry.key);

        #[cfg(test)]
        self.continuity_test();

        Some((entry.key, entry.value))
    }

    /// Removes and returns the first entry.
    pub fn pop_front(&mut self) -> Option<(String, Value)> {
        let entry = self.entries.pop_front()?;
        self.index.remove(&entry.key);

        #[cfg(test)]
        self.continuity_test();

        Some((entry.key, entry.value))
    }

    /// The first entry, to start a forward walk from.
    pub fn first(&self) -> Option<Element<'_, S>> {
        self.element(self.entries.head())
    }

    /// The last entry, to start a backward walk from.
    pub fn last(&self) -> Option<Element<'_, S>> {
        self.element(self.entries.tail())
    }

    /// The entry for `key`, to walk the map from a needle in either
    /// direction.
    ///
    /// ```
    /// # use linked_json_map::OrderedMap;
    /// let m: OrderedMap = vec![("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    /// let mut walked = vec![];
    /// let mut cursor = m.get_element("b");
    /// while let Some(elem) = cursor {
    ///     walked.push(elem.key());
    ///     cursor = elem.next();
    /// }
    /// assert_eq!(vec!["b", "c"], walked);
    /// ```
    pub fn get_element(&self, key: &str) -> Option<Element<'_, S>> {
        self.element(self.index.get(key).copied())
    }

    /// The position of `key` in the order, or None if absent. This is the one
    /// linear-time lookup: it walks the list from the front.
    pub fn key_index(&self, key: &str) -> Option<usize> {
        let target = *self.index.get(key)?;
        self.entries.handles().position(|h| h == target)
    }

    /// All keys, in order.
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(k, _)| k).collect()
    }

    /// All values, in order.
    pub fn values(&self) -> Vec<&Value> {
        self.iter().map(|(_, v)| v).collect()
    }

    pub fn iter(&self) -> Iter<'_, S> {
        Iter {
            map: self,
            front: self.entries.head(),
            back: self.entries.tail(),
            remaining: self.len(),
        }
    }

    /// Reorders the entries by comparing their keys. Values travel with their
    /// keys. The sort is stable, so keys the comparator deems equal keep
    /// their relative order.
    pub fn sort_keys_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        if self.len() < 2 {
            return;
        }

        tracing::trace!(len = self.len(), "sorting keys");

        let mut order: Vec<NodeHandle> = self.entries.handles().collect();
        {
            let entries = &self.entries;
            order.sort_by(|&a, &b| match (entries.get(a), entries.get(b)) {
                (Some(a), Some(b)) => compare(&a.key, &b.key),
                _ => Ordering::Equal,
            });
        }
        self.entries.relink(&order);

        #[cfg(test)]
        self.continuity_test();
    }

    /// Sorts the entries lexicographically by key.
    pub fn sort_keys(&mut self) {
        self.sort_keys_by(|a, b| a.cmp(b))
    }

    fn insert_with(
        &mut self,
        key: String,
        value: Value,
        link: fn(&mut LinkedList<Entry>, Entry) -> NodeHandle,
    ) -> Option<Value> {
        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.entries.get_mut(handle) {
                return Some(mem::replace(&mut entry.value, value));
            }
        }

        let handle = link(
            &mut self.entries,
            Entry {
                key: key.clone(),
                value,
            },
        );
        self.index.insert(key, handle);

        #[cfg(test)]
        self.continuity_test();

        None
    }

    fn element(&self, handle: Option<NodeHandle>) -> Option<Element<'_, S>> {
        let handle = handle?;
        let entry = self.entries.get(handle)?;
        Some(Element {
            map: self,
            handle,
            entry,
        })
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        self.entries.continuity_test();
        assert_eq!(self.index.len(), self.entries.len());

        // every indexed key names a live node holding that same key
        for (key, &handle) in &self.index {
            let entry = self.entries.get(handle).expect("index points at a vacant slot");
            assert_eq!(key, &entry.key);
        }
    }
}

impl<S> Default for OrderedMap<S>
where
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_capacity_and_hasher(0, S::default())
    }
}

/// Two maps are equal when they hold the same entries in the same order.
impl<S1, S2> PartialEq<OrderedMap<S2>> for OrderedMap<S1>
where
    S1: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &OrderedMap<S2>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<S> fmt::Debug for OrderedMap<S>
where
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Renders as `map[k1:v1 k2:v2]` in the current order.
impl<S> fmt::Display for OrderedMap<S>
where
    S: BuildHasher,
{
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

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<S>
where
    K: Into<String>,
    V: Into<Value>,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// Extending uses [`set`](OrderedMap::set) semantics: repeated keys keep their
/// first position and take the last value.
impl<K, V, S> Extend<(K, V)> for OrderedMap<S>
where
    K: Into<String>,
    V: Into<Value>,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// A borrowed view of one entry and its place in the order. Holding an
/// element borrows the map, so it can't outlive a structural change.
pub struct Element<'a, S = RandomState> {
    map: &'a OrderedMap<S>,
    handle: NodeHandle,
    entry: &'a Entry,
}

impl<'a, S> Element<'a, S>
where
    S: BuildHasher,
{
    pub fn key(&self) -> &'a str {
        &self.entry.key
    }

    pub fn value(&self) -> &'a Value {
        &self.entry.value
    }

    /// The following entry, or None if this is the last.
    pub fn next(&self) -> Option<Element<'a, S>> {
        self.map.element(self.map.entries.next(self.handle))
    }

    /// The preceding entry, or None if this is the first.
    pub fn prev(&self) -> Option<Element<'a, S>> {
        self.map.element(self.map.entries.prev(self.handle))
    }
}

impl<'a, S> Clone for Element<'a, S> {
    fn clone(&self) -> Self {
        Element {
            map: self.map,
            handle: self.handle,
            entry: self.entry,
        }
    }
}

impl<'a, S> fmt::Debug for Element<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("key", &self.entry.key)
            .field("value", &self.entry.value)
            .finish()
    }
}

/// Iterator over `(key, value)` pairs in order.
pub struct Iter<'a, S = RandomState> {
    map: &'a OrderedMap<S>,
    front: Option<NodeHandle>,
    back: Option<NodeHandle>,
    remaining: usize,
}

impl<'a, S> Iterator for Iter<'a, S>
where
    S: BuildHasher,
{
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        let entry = self.map.entries.get(handle)?;
        self.front = self.map.entries.next(handle);
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, S> DoubleEndedIterator for Iter<'a, S>
where
    S: BuildHasher,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        let entry = self.map.entries.get(handle)?;
        self.back = self.map.entries.prev(handle);
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }
}

impl<'a, S> ExactSizeIterator for Iter<'a, S> where S: BuildHasher {}

impl<'a, S> IntoIterator for &'a OrderedMap<S>
where
    S: BuildHasher,
{
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator, draining the map front to back.
pub struct IntoIter<S = RandomState>(OrderedMap<S>);

impl<S> Iterator for IntoIter<S>
where
    S: BuildHasher,
{
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<S> DoubleEndedIterator for IntoIter<S>
where
    S: BuildHasher,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop()
    }
}

impl<S> ExactSizeIterator for IntoIter<S> where S: BuildHasher {}

impl<S> IntoIterator for OrderedMap<S>
where
    S: BuildHasher,
{
    type Item = (String, Value);
    type IntoIter = IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedMap;
    use crate::value::Value;

    #[test]
    fn test_keys_in_insertion_order() {
        let mut m = OrderedMap::new();
        for key in &["z", "a", "m", "b"] {
            assert_eq!(None, m.set(*key, 0));
        }
        assert_eq!(vec!["z", "a", "m", "b"], m.keys());
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut m = OrderedMap::new();
        m.set("a", 1);
        m.set("b", 2);
        assert_eq!(Some(Value::from(1)), m.set("a", 10));

        assert_eq!(vec!["a", "b"], m.keys());
        assert_eq!(Some(&Value::from(10)), m.get("a"));
    }

    #[test]
    fn test_push_moves_to_back() {
        let mut m = OrderedMap::new();
        m.set("a", 1);
        m.set("b", 2);
        assert_eq!(Some(Value::from(1)), m.push("a", 3));

        assert_eq!(vec!["b", "a"], m.keys());
        assert_eq!(Some(3), m.get_as::<i64>("a"));

        // pushing a new key is a plain append
        assert_eq!(None, m.push("c", 4));
        assert_eq!(vec!["b", "a", "c"], m.keys());
    }

    /// Deleting "e" must remove "e" and not whatever a stale position would
    /// point at after the earlier deletions.
    #[test]
    fn test_delete_after_overwrite_and_repeat_delete() {
        let mut m = OrderedMap::new();
        m.set("a", 1);
        m.set("d", "2");
        m.set("c", 3);
        m.set("e", 5);
        m.set("b", 6);
        m.set("b", 7);
        assert_eq!(Some(Value::from(3)), m.delete("c"));
        assert_eq!(None, m.delete("c"));
        assert_eq!(Some(Value::from(5)), m.delete("e"));

        assert_eq!(3, m.len());
        assert_eq!(vec!["a", "d", "b"], m.keys());

        assert_eq!(Some(1), m.get_as::<i64>("a"));
        assert_eq!(None, m.get_as::<&str>("a"));
        assert_eq!(Some("2"), m.get_as::<&str>("d"));
        assert_eq!(None, m.get_as::<i64>("d"));
        assert_eq!(Some(7), m.get_as::<i64>("b"));
        assert_eq!(None, m.get("c"));
        assert_eq!(None, m.get("e"));
    }

    #[test]
    fn test_empty_map() {
        let mut m = OrderedMap::new();
        assert_eq!(0, m.len());
        assert!(m.is_empty());
        assert!(m.keys().is_empty());
        assert!(m.values().is_empty());
        assert!(m.first().is_none());
        assert!(m.last().is_none());
        assert_eq!("map[]", m.to_string());
        assert_eq!(None, m.pop());
        assert_eq!(None, m.pop_front());
        assert_eq!(None, m.delete("missing"));
        assert_eq!(None, m.key_index("missing"));
    }

    #[test]
    fn test_front_operations() {
        let mut m = OrderedMap::new();
        m.set("a", 1);
        m.set("b", 2);
        m.set_front("z", 0);
        assert_eq!(vec!["z", "a", "b"], m.keys());

        // set_front only overwrites an existing key
        assert_eq!(Some(Value::from(2)), m.set_front("b", 20));
        assert_eq!(vec!["z", "a", "b"], m.keys());
        assert_eq!(Some(20), m.get_as::<i64>("b"));

        assert_eq!(Some(Value::from(20)), m.push_front("b", 21));
        assert_eq!(vec!["b", "z", "a"], m.keys());
        assert_eq!(Some(0), m.key_index("b"));

        assert_eq!(None, m.push_front("new", 5));
        assert_eq!(Some(0), m.key_index("new"));

        assert_eq!(Some(("new".to_owned(), Value::from(5))), m.pop_front());
        assert_eq!(Some(("a".to_owned(), Value::from(1))), m.pop());
        assert_eq!(vec!["b", "z"], m.keys());
    }

    #[test]
    fn test_pop_until_empty() {
        let mut m: OrderedMap = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(Some(("b".to_owned(), Value::from(2))), m.pop());
        assert_eq!(Some(("a".to_owned(), Value::from(1))), m.pop());
        assert_eq!(None, m.pop());
        assert!(m.first().is_none());

        // the map is usable again after draining
        m.set("c", 3);
        assert_eq!(vec!["c"], m.keys());
    }

    #[test]
    fn test_key_index() {
        let m: OrderedMap = vec![("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(Some(0), m.key_index("a"));
        assert_eq!(Some(2), m.key_index("c"));
        assert_eq!(None, m.key_index("d"));
    }

    #[test]
    fn test_element_walks() {
        let m: OrderedMap = vec![("a", 1), ("b", 2), ("c", 3)].into_iter().collect();

        let mut forward = vec![];
        let mut cursor = m.first();
        while let Some(elem) = cursor {
            forward.push(elem.key());
            cursor = elem.next();
        }
        assert_eq!(vec!["a", "b", "c"], forward);

        let mut backward = vec![];
        let mut cursor = m.last();
        while let Some(elem) = cursor {
            backward.push(elem.key());
            cursor = elem.prev();
        }
        assert_eq!(vec!["c", "b", "a"], backward);

        let b = m.get_element("b").unwrap();
        assert_eq!(&Value::from(2), b.value());
        assert_eq!(Some("a"), b.prev().map(|e| e.key()));
        assert_eq!(Some("c"), b.next().map(|e| e.key()));
        assert!(m.get_element("x").is_none());
    }

    #[test]
    fn test_sort_keys() {
        let mut m: OrderedMap = vec![("c", 3), ("a", 1), ("d", 4), ("b", 2)]
            .into_iter()
            .collect();
        m.sort_keys();

        assert_eq!(vec!["a", "b", "c", "d"], m.keys());
        for (key, value) in &m {
            let expected = match key {
                "a" => 1,
                "b" => 2,
                "c" => 3,
                _ => 4,
            };
            assert_eq!(&Value::from(expected), value);
        }

        m.sort_keys_by(|a, b| b.cmp(a));
        assert_eq!(vec!["d", "c", "b", "a"], m.keys());
        assert_eq!(Some("d"), m.first().map(|e| e.key()));
        assert_eq!(Some("a"), m.last().map(|e| e.key()));
    }

    #[test]
    fn test_sort_keys_is_stable() {
        let mut m: OrderedMap = vec![("bb", 0), ("a", 1), ("cc", 2), ("d", 3)]
            .into_iter()
            .collect();
        m.sort_keys_by(|a, b| a.len().cmp(&b.len()));
        assert_eq!(vec!["a", "d", "bb", "cc"], m.keys());

        let mut single: OrderedMap = vec![("only", 1)].into_iter().collect();
        single.sort_keys();
        assert_eq!(vec!["only"], single.keys());
    }

    #[test]
    fn test_clear() {
        let mut m: OrderedMap = vec![("a", 1), ("b", 2)].into_iter().collect();
        m.clear();
        assert!(m.is_empty());
        assert!(m.first().is_none());
        assert!(m.last().is_none());

        m.set("c", 3);
        assert_eq!(vec!["c"], m.keys());
    }

    #[test]
    fn test_iter_both_ends() {
        let m: OrderedMap = vec![("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        let mut iter = m.iter();
        assert_eq!(3, iter.len());
        assert_eq!(Some("a"), iter.next().map(|(k, _)| k));
        assert_eq!(Some("c"), iter.next_back().map(|(k, _)| k));
        assert_eq!(Some("b"), iter.next().map(|(k, _)| k));
        assert_eq!(None, iter.next_back());
        assert_eq!(None, iter.next());

        let drained: Vec<String> = m.into_iter().map(|(k, _)| k).collect();
        assert_eq!(vec!["a", "b", "c"], drained);
    }

    #[test]
    fn test_display_and_debug() {
        let mut m = OrderedMap::new();
        m.set("b", "x");
        m.set("a", vec![1, 2]);
        m.set("n", ());
        assert_eq!("map[b:x a:[1 2] n:<nil>]", m.to_string());
        assert!(format!("{:?}", m).starts_with("{\"b\": String(\"x\")"));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab: OrderedMap = vec![("a", 1), ("b", 2)].into_iter().collect();
        let ba: OrderedMap = vec![("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_get_mut() {
        let mut m = OrderedMap::new();
        m.set("list", vec![1]);
        if let Some(Value::Array(items)) = m.get_mut("list") {
            items.push(Value::from(2));
        }
        assert_eq!(Some(2), m.get_as::<&[Value]>("list").map(|a| a.len()));
        assert!(m.get_mut("missing").is_none());
    }
}
