//! Helpers for reshaping reply payloads into local records.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Lower-case every top-level key of a JSON object.
///
/// Nested objects are left untouched. When two keys collide after lowering,
/// the one visited last wins.
#[must_use]
pub fn lowercase_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

/// Split `KEY<sep>VALUE` tokens into a map, splitting each token once.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a token that does not contain `separator`.
pub fn split_token<S>(values: &[S], separator: char) -> Result<BTreeMap<String, String>>
where
    S: AsRef<str>,
{
    values
        .iter()
        .map(|token| {
            let token = token.as_ref();
            token
                .split_once(separator)
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| {
                    Error::InvalidInput(format!("expected KEY{separator}VALUE, got `{token}`"))
                })
        })
        .collect()
}

/// Read the `id` field of a payload.
#[must_use]
pub fn payload_id(data: &Map<String, Value>) -> Option<&str> {
    data.get("id").and_then(Value::as_str)
}

/// Ensure the payload describes the object the caller asked for.
///
/// # Errors
///
/// Returns [`Error::Consistency`] when the payload `id` differs from `expected`
/// or is missing.
pub fn ensure_id(expected: &str, data: &Map<String, Value>) -> Result<()> {
    match payload_id(data) {
        Some(found) if found == expected => Ok(()),
        found => Err(Error::Consistency {
            expected: expected.to_string(),
            found: found.unwrap_or("<missing>").to_string(),
        }),
    }
}

/// Lazy, single-pass iterator deserializing reply entries one at a time.
///
/// The entries are already in memory; only record construction is deferred.
#[derive(Debug)]
pub struct Records<T> {
    entries: std::vec::IntoIter<Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Records<T> {
    /// Wrap the entries of a reply list.
    #[must_use]
    pub fn new(entries: Vec<Value>) -> Self {
        Self {
            entries: entries.into_iter(),
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Iterator for Records<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries
            .next()
            .map(|entry| serde_json::from_value(entry).map_err(Error::from))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T: DeserializeOwned> ExactSizeIterator for Records<T> {}
