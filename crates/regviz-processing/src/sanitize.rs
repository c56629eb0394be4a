//! JSON-safety sanitization.
//!
//! JSON has no representation for NaN or infinity. Every payload leaving the
//! system goes through [`Sanitize`], which replaces non-finite floats with
//! null and leaves everything else alone. Applying it twice is the same as
//! applying it once.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Map a float to `None` unless it is finite.
#[inline]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Recursively replace non-finite floats with null.
pub trait Sanitize {
    #[must_use]
    fn sanitize(self) -> Self;
}

impl Sanitize for Option<f64> {
    fn sanitize(self) -> Self {
        self.and_then(finite)
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(self) -> Self {
        self.into_iter().map(Sanitize::sanitize).collect()
    }
}

impl<T: Sanitize> Sanitize for Option<Vec<T>> {
    fn sanitize(self) -> Self {
        self.map(Sanitize::sanitize)
    }
}

impl<K: Ord, V: Sanitize> Sanitize for BTreeMap<K, V> {
    fn sanitize(self) -> Self {
        self.into_iter().map(|(k, v)| (k, v.sanitize())).collect()
    }
}

impl<K: Eq + Hash, V: Sanitize> Sanitize for HashMap<K, V> {
    fn sanitize(self) -> Self {
        self.into_iter().map(|(k, v)| (k, v.sanitize())).collect()
    }
}

impl Sanitize for serde_json::Value {
    fn sanitize(self) -> Self {
        use serde_json::Value;
        match self {
            Value::Number(n) => match n.as_f64() {
                Some(v) if !v.is_finite() => Value::Null,
                _ => Value::Number(n),
            },
            Value::Array(items) => Value::Array(items.into_iter().map(Sanitize::sanitize).collect()),
            Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.sanitize())).collect())
            }
            other => other,
        }
    }
}

/// Build a JSON number from a float, or null if it is not finite.
pub fn json_number(value: f64) -> serde_json::Value {
    finite(value)
        .and_then(serde_json::Number::from_f64)
        .map_or(serde_json::Value::Null, serde_json::Value::Number)
}
