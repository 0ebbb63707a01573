use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::Result;
use crate::ordered::OrderedStore;
use crate::value::Value;

/// Wrapper for an ordered map which is shareable across thread boundaries.
/// Every operation takes the lock for its own duration only, so a sequence
/// of calls is not atomic; use [`read`](Self::read) or
/// [`write`](Self::write) to run several steps under one lock.
pub struct SharedMap<M>(Arc<RwLock<M>>)
where
    M: OrderedStore;

impl<M> SharedMap<M>
where
    M: OrderedStore,
{
    /// Wraps a map into a shared accessor, making it safe to move across
    /// thread boundaries.
    pub fn with_map(map: M) -> Self {
        Self(Arc::new(RwLock::new(map)))
    }

    /// Sets a value, keeping the position of an existing key.
    pub fn set<K, V>(&self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0.write().set(key.into(), value.into())
    }

    /// Sets a value and moves its key to the back.
    pub fn push<K, V>(&self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0.write().push(key.into(), value.into())
    }

    /// Get a value from the map. This clones it to minimize the lock time.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// Remove a key from the map, returning its value if it existed.
    pub fn delete(&self, key: &str) -> Option<Value> {
        self.0.write().delete(key)
    }

    pub fn pop(&self) -> Option<(String, Value)> {
        self.0.write().pop()
    }

    pub fn pop_front(&self) -> Option<(String, Value)> {
        self.0.write().pop_front()
    }

    /// A snapshot of the keys, in order.
    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().into_iter().map(str::to_owned).collect()
    }

    /// Clears the map.
    pub fn clear(&self) {
        self.0.write().clear()
    }

    /// The number of entries in the map at present.
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Runs `f` with shared access to the map.
    pub fn read<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.0.read())
    }

    /// Runs `f` with exclusive access to the map.
    pub fn write<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
        f(&mut self.0.write())
    }

    /// Replaces the contents of the map with a decoded JSON object.
    pub fn unmarshal_json(&self, data: &[u8]) -> Result<()> {
        crate::json::unmarshal_into(&mut *self.0.write(), data)
    }
}

impl<M> SharedMap<M>
where
    M: OrderedStore + serde::Serialize,
{
    /// Encodes the map as a JSON object, keys in order.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&*self.0.read())?)
    }
}

impl<M> Clone for SharedMap<M>
where
    M: OrderedStore,
{
    fn clone(&self) -> Self {
        SharedMap(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::{OrderedMap, OrderedStore, SharedMap, SimpleMap};

    #[test]
    fn test_across_threads() {
        let map = SharedMap::with_map(OrderedMap::new());
        map.set("a", 1);

        let thread_map = map.clone();
        let r = thread::spawn(move || {
            thread_map.push("a", 2);
            thread_map.set("b", 3);
            thread_map.get("a")
        })
        .join();

        assert_eq!(Some(2), r.unwrap().and_then(|v| v.as_i64()));
        assert_eq!(vec!["a".to_owned(), "b".to_owned()], map.keys());
        assert_eq!(2, map.len());
    }

    #[test]
    fn test_json_and_closures() {
        let map = SharedMap::with_map(SimpleMap::new());
        map.unmarshal_json(br#"{"y":1,"x":2}"#).unwrap();

        map.write(|m| m.sort_keys());
        assert_eq!(Some(0), map.read(|m| m.key_index("x")));
        assert_eq!(br#"{"x":2,"y":1}"#.to_vec(), map.to_json().unwrap());

        assert_eq!(Some(("y".to_owned(), 1.into())), map.pop());
        assert!(map.delete("x").is_some());
        assert!(map.is_empty());
        assert_eq!(None, map.pop_front());

        map.set("z", true);
        map.clear();
        assert_eq!(0, map.len());
    }
}
