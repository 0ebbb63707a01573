//! The dynamically typed datum stored against each key.

use std::fmt;

use serde_json::Number;

use crate::map::OrderedMap;

/// Anything a JSON document can hold. Objects nest as [`OrderedMap`]s so that
/// member order survives at every depth.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(OrderedMap),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The value as an i64, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    /// The value as a u64, if it is a non-negative integer that fits.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    /// The value as an f64. Integers convert, possibly losing precision.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&OrderedMap> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut OrderedMap> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// Renders the way a loosely typed `print` would: strings bare, null as
/// `<nil>`, arrays as `[a b c]` and objects as `map[k:v ...]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(m) => write!(f, "{}", m),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::from(f64::from(n))
    }
}

/// Non-finite floats have no JSON spelling and become [`Value::Null`].
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<OrderedMap> for Value {
    fn from(m: OrderedMap) -> Self {
        Value::Object(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Borrowing conversions used by [`OrderedMap::get_as`]. A conversion fails
/// with None when the stored variant doesn't match the requested type.
pub trait FromValue<'a>: Sized {
    fn from_value(value: &'a Value) -> Option<Self>;
}

impl<'a> FromValue<'a> for &'a Value {
    fn from_value(value: &'a Value) -> Option<Self> {
        Some(value)
    }
}

impl<'a> FromValue<'a> for bool {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<'a> FromValue<'a> for &'a str {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> FromValue<'a> for &'a Number {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_number()
    }
}

impl<'a> FromValue<'a> for i64 {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_i64()
    }
}

impl<'a> FromValue<'a> for u64 {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_u64()
    }
}

impl<'a> FromValue<'a> for f64 {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_f64()
    }
}

impl<'a> FromValue<'a> for &'a [Value] {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_array()
    }
}

impl<'a> FromValue<'a> for &'a OrderedMap {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

#[cfg(test)]
mod tests {
    use super::{FromValue, Value};
    use crate::map::OrderedMap;

    #[test]
    fn test_display() {
        let mut inner = OrderedMap::new();
        inner.set("x", 1);
        inner.set("y", "why");

        let v = Value::from(vec![
            Value::from(2),
            Value::Null,
            Value::from(inner),
            Value::from(1.5),
            Value::from(true),
        ]);
        assert_eq!("[2 <nil> map[x:1 y:why] 1.5 true]", v.to_string());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::Null, Value::from(f64::NAN));
        assert_eq!(Value::Null, Value::from(None::<i32>));
        assert_eq!(Some(7), Value::from(Some(7u8)).as_u64());
        assert_eq!(Some(-3), Value::from(-3).as_i64());
        assert_eq!(None, Value::from(-3).as_u64());
        assert_eq!(Some(2.0), Value::from(2).as_f64());
        assert_eq!(Some("s"), Value::from("s").as_str());
        assert!(Value::default().is_null());
    }

    #[test]
    fn test_from_value_mismatch() {
        let s = Value::from("2");
        assert_eq!(Some("2"), <&str>::from_value(&s));
        assert_eq!(None, i64::from_value(&s));
        assert_eq!(None, bool::from_value(&s));

        let n = Value::from(1.25);
        assert_eq!(None, i64::from_value(&n));
        assert_eq!(Some(1.25), f64::from_value(&n));
    }

    #[test]
    fn test_mutable_accessors() {
        let mut v = Value::from(vec![1, 2]);
        if let Some(items) = v.as_array_mut() {
            items.push(Value::from(3));
        }
        assert_eq!(Some(3), v.as_array().map(|a| a.len()));

        let mut o = Value::from(OrderedMap::new());
        if let Some(m) = o.as_object_mut() {
            m.set("k", "v");
        }
        assert_eq!(Some(1), o.as_object().map(|m| m.len()));
    }
}
