//! Configuration structures for podman clients.
//!
//! This module provides the configuration handed to a [`crate::PodmanClient`]:
//! where the service lives, which RPC interface to address, and the defaults
//! applied by operations that fill in values on the caller's behalf.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;
use validator::Validate;

/// Default address of the podman RPC socket.
pub const DEFAULT_URI: &str = "unix:/run/podman/io.podman";

/// Default RPC interface prefixed to every method name.
pub const DEFAULT_INTERFACE: &str = "io.podman";

/// Default maximum number of search hits requested from registries.
pub const DEFAULT_SEARCH_LIMIT: u32 = 25;

/// Default network mode for containers created from an image.
pub const DEFAULT_NET_MODE: &str = "bridge";

/// Default working directory for containers created from an image.
pub const DEFAULT_WORK_DIR: &str = "/tmp";

/// Configuration for a podman client instance.
///
/// `remote_uri` and `identity_file` are read by connectors that tunnel to a
/// remote host. The client itself ignores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PodmanClientConfig {
    /// Address of the podman service (e.g. `unix:/run/podman/io.podman`)
    #[validate(url)]
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Address of a remote host tunnelled to `uri`, if any
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_uri: Option<String>,

    /// SSH identity used by connectors that tunnel to `remote_uri`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<PathBuf>,

    /// RPC interface name
    #[validate(length(min = 1))]
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Default limit for registry searches
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Values forced into container configurations built from images
    #[validate(nested)]
    #[serde(default)]
    pub container_defaults: ContainerDefaults,
}

fn default_uri() -> String {
    DEFAULT_URI.to_string()
}

fn default_interface() -> String {
    DEFAULT_INTERFACE.to_string()
}

const fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

impl PodmanClientConfig {
    /// Create a new client configuration for the given service address.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is invalid or validation fails.
    pub fn new(uri: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            uri: uri.into(),
            ..Self::default()
        };
        config.validate_config()?;
        Ok(config)
    }

    /// Set the remote host address.
    #[must_use]
    pub fn with_remote_uri(mut self, remote_uri: impl Into<String>) -> Self {
        self.remote_uri = Some(remote_uri.into());
        self
    }

    /// Set the SSH identity file.
    #[must_use]
    pub fn with_identity_file(mut self, path: PathBuf) -> Self {
        self.identity_file = Some(path);
        self
    }

    /// Set the RPC interface name.
    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    /// Set the default search limit.
    #[must_use]
    pub const fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set the container defaults.
    #[must_use]
    pub fn with_container_defaults(mut self, defaults: ContainerDefaults) -> Self {
        self.container_defaults = defaults;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] describing every field that failed.
    pub fn validate_config(&self) -> Result<(), Error> {
        self.validate()?;
        Ok(())
    }

    /// Parse the service URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the URI cannot be parsed.
    pub fn parse_uri(&self) -> Result<Url, Error> {
        Ok(Url::parse(&self.uri)?)
    }

    /// Qualify a bare method name with the configured interface.
    #[must_use]
    pub fn qualify(&self, method: &str) -> String {
        format!("{}.{method}", self.interface)
    }
}

impl Default for PodmanClientConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            remote_uri: None,
            identity_file: None,
            interface: default_interface(),
            search_limit: default_search_limit(),
            container_defaults: ContainerDefaults::default(),
        }
    }
}

/// Defaults applied when creating a container from an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContainerDefaults {
    /// Network mode
    #[validate(length(min = 1))]
    #[serde(default = "default_net_mode")]
    pub net_mode: String,

    /// Network name
    #[validate(length(min = 1))]
    #[serde(default = "default_net_mode")]
    pub network: String,

    /// Working directory
    #[validate(length(min = 1))]
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

fn default_net_mode() -> String {
    DEFAULT_NET_MODE.to_string()
}

fn default_work_dir() -> String {
    DEFAULT_WORK_DIR.to_string()
}

impl ContainerDefaults {
    /// Set the network mode and network name.
    #[must_use]
    pub fn with_network(mut self, net_mode: impl Into<String>, network: impl Into<String>) -> Self {
        self.net_mode = net_mode.into();
        self.network = network.into();
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<String>) -> Self {
        self.work_dir = work_dir.into();
        self
    }
}

impl Default for ContainerDefaults {
    fn default() -> Self {
        Self {
            net_mode: default_net_mode(),
            network: default_net_mode(),
            work_dir: default_work_dir(),
        }
    }
}
