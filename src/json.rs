//! JSON encoding and decoding that keeps object members in document order.
//!
//! Decoding runs a serde visitor directly over `serde_json`'s token stream and
//! pushes each member into the map as it's read, so the map's order is the
//! order the keys appeared in. A repeated key is pushed again: the last value
//! wins and the key takes the position of its last occurrence.

use std::{fmt, hash::BuildHasher, marker::PhantomData, str::FromStr};

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::map::OrderedMap;
use crate::ordered::OrderedStore;
use crate::value::Value;

impl<S> OrderedMap<S>
where
    S: BuildHasher,
{
    /// Encodes the map as a compact JSON object with keys in map order.
    ///
    /// ```
    /// # use linked_json_map::OrderedMap;
    /// let mut m = OrderedMap::new();
    /// m.set("b", 1);
    /// m.set("a", vec!["x", "y"]);
    /// assert_eq!(r#"{"b":1,"a":["x","y"]}"#, m.to_json_string().unwrap());
    /// ```
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Replaces the contents of the map with the JSON object in `data`.
    ///
    /// Input that doesn't start with `{` is rejected before the map is
    /// touched. Otherwise the map is cleared first, so a malformed body
    /// leaves it empty or partially filled.
    pub fn unmarshal_json(&mut self, data: &[u8]) -> Result<()> {
        unmarshal_into(self, data)
    }
}

/// Decodes a JSON object into a new map.
///
/// ```
/// let m = linked_json_map::from_json(br#"{"z":1,"a":{"y":2,"b":3}}"#).unwrap();
/// assert_eq!(vec!["z", "a"], m.keys());
/// ```
pub fn from_json(data: &[u8]) -> Result<OrderedMap> {
    let mut map = OrderedMap::new();
    map.unmarshal_json(data)?;
    Ok(map)
}

impl FromStr for OrderedMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        from_json(s.as_bytes())
    }
}

pub(crate) fn unmarshal_into<M>(store: &mut M, data: &[u8]) -> Result<()>
where
    M: OrderedStore,
{
    let start = data
        .iter()
        .position(|&b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r'));

    match start.map(|pos| data[pos]) {
        Some(b'{') => {}
        _ => {
            let found = match start {
                Some(pos) => format!(
                    "{:?}",
                    String::from_utf8_lossy(&data[pos..]).chars().next().unwrap_or_default()
                ),
                None => "end of input".to_owned(),
            };
            tracing::debug!(%found, "rejecting JSON that isn't an object");
            return Err(Error::ExpectedObject { found });
        }
    }

    store.clear();

    let mut de = serde_json::Deserializer::from_slice(data);
    DecodeInto(store)
        .deserialize(&mut de)
        .and_then(|()| de.end())
        .map_err(|e| {
            tracing::debug!(error = %e, "failed to decode JSON object");
            Error::from(e)
        })
}

/// Pushes every member of the object being visited into `store`.
fn decode_members<'de, M, A>(store: &mut M, mut access: A) -> std::result::Result<(), A::Error>
where
    M: OrderedStore,
    A: MapAccess<'de>,
{
    while let Some(key) = access.next_key::<String>()? {
        let value: Value = access.next_value()?;
        if store.contains_key(&key) {
            tracing::trace!(%key, "duplicate key in JSON object, keeping the last one");
        }
        store.push(key, value);
    }
    Ok(())
}

/// Visits a JSON object into a fresh store.
pub(crate) struct StoreVisitor<M>(PhantomData<M>);

impl<M> StoreVisitor<M> {
    pub(crate) fn new() -> Self {
        StoreVisitor(PhantomData)
    }
}

impl<'de, M> Visitor<'de> for StoreVisitor<M>
where
    M: OrderedStore + Default,
{
    type Value = M;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut store = M::default();
        decode_members(&mut store, access)?;
        Ok(store)
    }
}

/// Visits a JSON object into an existing store.
struct DecodeInto<'a, M>(&'a mut M);

impl<'de, 'a, M> DeserializeSeed<'de> for DecodeInto<'a, M>
where
    M: OrderedStore,
{
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, 'a, M> Visitor<'de> for DecodeInto<'a, M>
where
    M: OrderedStore,
{
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        decode_members(self.0, access)
    }
}

impl<S> Serialize for OrderedMap<S>
where
    S: BuildHasher,
{
    fn serialize<Ser>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, S> Deserialize<'de> for OrderedMap<S>
where
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(StoreVisitor::new())
    }
}

impl Serialize for Value {
    fn serialize<Ser>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(m) => m.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, access: A) -> std::result::Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = OrderedMap::new();
        decode_members(&mut map, access)?;
        Ok(Value::Object(map))
    }
}
