//! Shared client handle and scoped sessions.
//!
//! [`PodmanClient`] is cheap to clone and is what every projection keeps a copy
//! of. Each remote call runs inside a [`Session`] that is closed when the scope
//! ends, whether the call succeeded or not.

use crate::config::PodmanClientConfig;
use crate::params::Parameters;
use crate::rpc::{RpcConnector, RpcRequest, RpcSession};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Client factory shared by the podman resource models.
#[derive(Clone)]
pub struct PodmanClient {
    connector: Arc<dyn RpcConnector>,
    config: Arc<PodmanClientConfig>,
}

impl PodmanClient {
    /// Create a client with the default configuration.
    pub fn new(connector: impl RpcConnector + 'static) -> Self {
        Self::with_config(connector, PodmanClientConfig::default())
    }

    /// Create a client with an explicit configuration.
    pub fn with_config(connector: impl RpcConnector + 'static, config: PodmanClientConfig) -> Self {
        Self::from_shared(Arc::new(connector), config)
    }

    /// Create a client around an already shared connector.
    #[must_use]
    pub fn from_shared(connector: Arc<dyn RpcConnector>, config: PodmanClientConfig) -> Self {
        Self {
            connector,
            config: Arc::new(config),
        }
    }

    /// Return the client configuration.
    #[must_use]
    pub fn config(&self) -> &PodmanClientConfig {
        &self.config
    }

    /// Acquire a new session.
    ///
    /// # Errors
    ///
    /// Propagates the connector error unchanged.
    pub async fn session(&self) -> Result<Session> {
        debug!(uri = %self.config.uri, "Opening podman session");
        let inner = self.connector.connect().await?;
        Ok(Session {
            inner: Some(inner),
            config: Arc::clone(&self.config),
        })
    }

    /// Run one call in its own session and extract `field` from the reply.
    ///
    /// # Errors
    ///
    /// Propagates connector and remote errors; returns
    /// [`Error::MalformedData`] when the reply lacks `field` or it has the
    /// wrong shape.
    pub async fn call<T>(&self, method: &str, parameters: Parameters, field: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut session = self.session().await?;
        let outcome = session.call(method, parameters, field).await;
        session.finish(outcome).await
    }
}

impl fmt::Debug for PodmanClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodmanClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// One scoped acquisition of the podman service.
///
/// Dropping a session without calling [`Session::close`] or
/// [`Session::finish`] still releases the transport handle.
pub struct Session {
    inner: Option<Box<dyn RpcSession>>,
    config: Arc<PodmanClientConfig>,
}

impl Session {
    /// Issue `method` and extract `field` from the reply.
    ///
    /// # Errors
    ///
    /// Propagates remote errors; returns [`Error::MalformedData`] when the
    /// reply lacks `field` or it cannot be deserialized.
    pub async fn call<T>(&mut self, method: &str, parameters: Parameters, field: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let qualified = self.config.qualify(method);
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| Error::Connection(format!("session closed before {qualified}")))?;

        debug!(method = %qualified, "Sending podman request");
        let reply = inner
            .call(RpcRequest::new(qualified.as_str(), parameters.into_value()))
            .await?;
        take_field(reply, &qualified, field)
    }

    /// Close the session.
    ///
    /// # Errors
    ///
    /// Returns the transport error raised while closing.
    pub async fn close(mut self) -> Result<()> {
        match self.inner.take() {
            Some(mut inner) => inner.close().await,
            None => Ok(()),
        }
    }

    /// Close the session and return `outcome`.
    ///
    /// A failed `outcome` takes precedence over a failure to close.
    ///
    /// # Errors
    ///
    /// Returns the error from `outcome`, or the close error when `outcome` succeeded.
    pub async fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        let closed = self.close().await;
        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!(error = %close_err, "Failed to close podman session after error");
                Err(err)
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.inner.take().is_some() {
            debug!("Podman session dropped without close");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.inner.is_some())
            .finish_non_exhaustive()
    }
}

fn take_field<T>(reply: Value, method: &str, field: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let Value::Object(mut reply) = reply else {
        return Err(Error::MalformedData(format!(
            "{method} reply is not an object"
        )));
    };
    let value = reply
        .remove(field)
        .ok_or_else(|| Error::MalformedData(format!("{method} reply missing `{field}`")))?;
    serde_json::from_value(value)
        .map_err(|e| Error::MalformedData(format!("{method} reply field `{field}`: {e}")))
}
