//! Convenience builder for RPC parameter objects.
//!
//! Methods of the podman interface take named parameters. This helper collects
//! them into the JSON object carried by [`crate::RpcRequest`].

use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// Builder for assembling named call parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Parameters {
    fields: Map<String, Value>,
}

impl Parameters {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Append a required parameter.
    pub fn push<T>(&mut self, key: &str, value: T)
    where
        T: Into<Value>,
    {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Append a parameter when the value is present.
    pub fn push_opt<T>(&mut self, key: &str, value: Option<T>)
    where
        T: Into<Value>,
    {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Append a structured parameter by serializing it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedData`] if the value cannot be represented as JSON.
    pub fn push_serialized<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    /// Return the collected parameters as a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Parameters;
    use serde_json::{json, Value};

    #[test]
    fn push_opt_skips_none() {
        let mut params = Parameters::new();
        params.push_opt("message", Option::<String>::None);
        assert!(params.is_empty());
    }

    #[test]
    fn push_keeps_explicit_null() {
        let mut params = Parameters::new();
        params.push("message", Value::Null);
        assert_eq!(params.into_value(), json!({"message": null}));
    }

    #[test]
    fn push_serialized_nests_structures() {
        let mut params = Parameters::new();
        params.push("name", "abc");
        params.push("force", true);
        params
            .push_serialized("changes", &["CMD /bin/sh", "ENV A=1"])
            .unwrap();
        assert_eq!(
            params.into_value(),
            json!({"name": "abc", "force": true, "changes": ["CMD /bin/sh", "ENV A=1"]})
        );
    }
}
