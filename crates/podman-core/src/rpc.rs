//! Connector and session traits wrapping the remote transport.
//!
//! The transport itself lives outside this workspace. A connector is the client
//! factory: every call to [`RpcConnector::connect`] yields a fresh session that
//! is used for one scope and then closed.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single remote procedure call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Interface-qualified method name (e.g. `io.podman.ListImages`)
    pub method: String,
    /// Named parameters, always a JSON object
    pub parameters: Value,
}

impl RpcRequest {
    /// Create a request for the given method.
    #[must_use]
    pub fn new(method: impl Into<String>, parameters: Value) -> Self {
        Self {
            method: method.into(),
            parameters,
        }
    }
}

/// An acquired handle to the podman service.
///
/// Implementations release their resources when dropped; [`RpcSession::close`]
/// is the graceful path.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait RpcSession: Send {
    /// Issue one call and return the reply parameters object.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Rpc`] when the service reports an error, or a
    /// transport error when the call cannot be completed.
    async fn call(&mut self, request: RpcRequest) -> Result<Value>;

    /// Release the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails while shutting down.
    async fn close(&mut self) -> Result<()>;
}

/// Factory producing scoped sessions.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait RpcConnector: Send + Sync {
    /// Open a new session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Connection`] when the service cannot be reached.
    async fn connect(&self) -> Result<Box<dyn RpcSession>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_method_and_parameters() {
        let request = RpcRequest::new("io.podman.TagImage", json!({"name": "abc", "tagged": "v1"}));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "io.podman.TagImage");
        assert_eq!(value["parameters"]["tagged"], "v1");
    }
}
