//! Ordered/associative container of values.

use indexmap::IndexMap;

use crate::error::{PrototypeError, PrototypeResult};
use crate::value::Value;

/// Key of an [`Array`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrayKey {
    Index(i64),
    Name(String),
}

impl From<i64> for ArrayKey {
    fn from(value: i64) -> Self {
        Self::Index(value)
    }
}

impl From<&str> for ArrayKey {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for ArrayKey {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl core::fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ArrayKey::Index(i) => write!(f, "{i}"),
            ArrayKey::Name(n) => f.write_str(n),
        }
    }
}

/// An insertion-ordered map from [`ArrayKey`] to [`Value`].
///
/// Used both as a list (`push` assigns the next integer index) and as a
/// dictionary (`insert` with a name).
#[derive(Debug, Clone)]
pub struct Array {
    entries: IndexMap<ArrayKey, Value>,
    // `None` once an entry sits at `i64::MAX`: there is no next index.
    next_index: Option<i64>,
}

impl Default for Array {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            next_index: Some(0),
        }
    }
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` under the next free integer index and returns that key.
    ///
    /// Fails once an entry occupies `i64::MAX`.
    pub fn push(&mut self, value: impl Into<Value>) -> PrototypeResult<ArrayKey> {
        let index = self.next_index.ok_or(PrototypeError::IndexExhausted)?;
        let key = ArrayKey::Index(index);
        self.next_index = index.checked_add(1);
        self.entries.insert(key.clone(), value.into());
        Ok(key)
    }

    /// Inserts `value` under `key`, replacing in place (and keeping the
    /// original position) if the key already exists.
    pub fn insert(&mut self, key: impl Into<ArrayKey>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if let ArrayKey::Index(i) = key {
            self.next_index = match (self.next_index, i.checked_add(1)) {
                (Some(next), Some(after)) => Some(next.max(after)),
                _ => None,
            };
        }
        self.entries.insert(key, value.into())
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &ArrayKey) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter()
    }

    /// Builds a new array with the same keys, order and index counter,
    /// mapping every value through `f`. Stops at the first error.
    pub fn try_map_values<E, F>(&self, mut f: F) -> Result<Array, E>
    where
        F: FnMut(&Value) -> Result<Value, E>,
    {
        let entries = self
            .entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), f(v)?)))
            .collect::<Result<IndexMap<_, _>, E>>()?;
        Ok(Array {
            entries,
            next_index: self.next_index,
        })
    }
}

/// Arrays are equal when they hold equal entries in the same order.
impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let entries: IndexMap<_, _> = (0i64..)
            .zip(iter)
            .map(|(i, value)| (ArrayKey::Index(i), value))
            .collect();
        let next_index = i64::try_from(entries.len()).ok();
        Array { entries, next_index }
    }
}

impl FromIterator<(ArrayKey, Value)> for Array {
    fn from_iter<I: IntoIterator<Item = (ArrayKey, Value)>>(iter: I) -> Self {
        let mut array = Array::new();
        for (key, value) in iter {
            array.insert(key, value);
        }
        array
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_continues_after_highest_explicit_index() {
        let mut array = Array::new();
        array.push(1).unwrap();
        array.insert(10, 2);
        array.push(3).unwrap();

        let keys: Vec<_> = array.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![ArrayKey::Index(0), ArrayKey::Index(10), ArrayKey::Index(11)]
        );
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut array = Array::new();
        array.insert("a", 1);
        array.insert("b", 2);
        let previous = array.insert("a", 3);

        assert_eq!(previous, Some(Value::Int(1)));
        let keys: Vec<_> = array.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(array.get(&"a".into()), Some(&Value::Int(3)));
    }

    #[test]
    fn try_map_values_preserves_shape() {
        let mut array = Array::new();
        array.insert("x", 1);
        array.push(2).unwrap();

        let doubled = array
            .try_map_values(|v| match v {
                Value::Int(i) => Ok::<_, ()>(Value::Int(i * 2)),
                other => Ok(other.clone()),
            })
            .unwrap();

        assert_eq!(doubled.keys().collect::<Vec<_>>(), array.keys().collect::<Vec<_>>());
        assert_eq!(doubled.get(&"x".into()), Some(&Value::Int(2)));
        assert_eq!(doubled.get(&ArrayKey::Index(0)), Some(&Value::Int(4)));
    }

    #[test]
    fn try_map_values_stops_at_first_error() {
        let array: Array = [Value::Int(1), Value::Null, Value::Int(3)].into_iter().collect();
        let mut visited = 0;
        let result = array.try_map_values(|v| {
            visited += 1;
            if v.is_null() { Err("null") } else { Ok(v.clone()) }
        });
        assert_eq!(result, Err("null"));
        assert_eq!(visited, 2);
    }

    #[test]
    fn push_refuses_when_the_last_index_is_taken() {
        let mut array = Array::new();
        array.insert(i64::MAX, 1);

        assert!(matches!(array.push(2), Err(PrototypeError::IndexExhausted)));
        assert_eq!(array.len(), 1);
        assert_eq!(array.get(&ArrayKey::Index(i64::MAX)), Some(&Value::Int(1)));

        // Named keys are still accepted.
        array.insert("name", 3);
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn push_fills_up_to_the_last_index() {
        let mut array = Array::new();
        array.insert(i64::MAX - 1, 1);

        assert_eq!(array.push(2).unwrap(), ArrayKey::Index(i64::MAX));
        assert!(array.push(3).is_err());
    }

    #[test]
    fn equality_respects_order() {
        let ab: Array = [("a".into(), Value::Int(1)), ("b".into(), Value::Int(2))]
            .into_iter()
            .collect();
        let ba: Array = [("b".into(), Value::Int(2)), ("a".into(), Value::Int(1))]
            .into_iter()
            .collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn large_named_arrays_build_by_key() {
        let array: Array = (0..50_000)
            .map(|i| (ArrayKey::Name(format!("k{i}")), Value::Int(i)))
            .collect();
        assert_eq!(array.len(), 50_000);
        assert_eq!(array.get(&"k49999".into()), Some(&Value::Int(49_999)));
        assert_eq!(array.keys().next(), Some(&ArrayKey::Name("k0".to_string())));
    }
}
