//! A string-keyed map that remembers insertion order, and encodes to and
//! decodes from JSON objects without ever reordering their members.
//!
//! ```
//! use linked_json_map::OrderedMap;
//!
//! let input = r#"{"an":"article","empty":null,"sub":{"x":1,"y":2},"bool":false,"array":[1,2,3]}"#;
//! let mut m: OrderedMap = input.parse().unwrap();
//! assert_eq!(vec!["an", "empty", "sub", "bool", "array"], m.keys());
//! assert_eq!(input, m.to_json_string().unwrap());
//!
//! // set keeps the position of existing keys
//! m.set("an", "bar");
//! m.set("truth", true);
//! m.delete("sub");
//!
//! // push moves the key to the end
//! m.push("an", false);
//! assert_eq!(
//!     r#"{"empty":null,"bool":false,"array":[1,2,3],"truth":true,"an":false}"#,
//!     m.to_json_string().unwrap()
//! );
//! ```
//!
//! Two implementations share the [`OrderedStore`] contract: [`OrderedMap`],
//! where every single-key operation is O(1), and [`SimpleMap`], which keeps a
//! flat key list and pays O(n) for deletes and front insertions. Neither is
//! synchronized; [`SharedMap`] wraps either one in a lock.

mod error;
mod json;
mod linked_list;
mod map;
mod ordered;
#[cfg(feature = "shared_map")]
mod shared_map;
mod simple_map;
mod value;

pub use error::{Error, Result};
pub use json::from_json;
pub use map::{Element, IntoIter, Iter, OrderedMap};
pub use ordered::OrderedStore;
#[cfg(feature = "shared_map")]
pub use shared_map::SharedMap;
pub use simple_map::{SimpleElement, SimpleMap};
pub use value::{FromValue, Value};

/// Re-exported so callers can name the numeric payload of [`Value::Number`].
pub use serde_json::Number;
