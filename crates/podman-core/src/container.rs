//! Container projection and creation configuration.

use crate::client::PodmanClient;
use crate::record::ensure_id;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Local projection of one remote container.
#[derive(Clone)]
pub struct Container {
    client: PodmanClient,
    id: String,
    data: Map<String, Value>,
}

impl Container {
    /// Build the projection, checking that `data` describes container `id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Consistency`] when the payload id differs.
    pub fn new(client: PodmanClient, id: impl Into<String>, data: Map<String, Value>) -> Result<Self> {
        let id = id.into();
        ensure_id(&id, &data)?;
        Ok(Self { client, id, data })
    }

    /// Container id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Look up a detail field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// All detail fields.
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The client this projection issues calls through.
    #[must_use]
    pub const fn client(&self) -> &PodmanClient {
        &self.client
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// Caller-supplied options for creating a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateOptions {
    /// Container name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hostname inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// User to run as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Allocate a pseudo-TTY.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tty: bool,
    /// Keep stdin open.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interactive: bool,
    /// Published ports (`host:container`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publish: Vec<String>,
    /// Bind mounts (`src:dest[:options]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Any further fields understood by the service.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateOptions {
    /// Set the container name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Allocate a pseudo-TTY.
    #[must_use]
    pub const fn with_tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    /// Keep stdin open.
    #[must_use]
    pub const fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Publish a port.
    #[must_use]
    pub fn with_publish(mut self, mapping: impl Into<String>) -> Self {
        self.publish.push(mapping.into());
        self
    }

    /// Add a bind mount.
    #[must_use]
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.push(volume.into());
        self
    }

    /// Set an arbitrary field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Configuration passed to `CreateContainer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Id of the source image.
    pub image_id: String,
    /// Image reference.
    pub image: String,
    /// Command to run.
    #[serde(default)]
    pub command: Vec<String>,
    /// Environment variables.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Container labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Network mode.
    pub net_mode: String,
    /// Network name.
    pub network: String,
    /// Working directory.
    pub work_dir: String,
    /// Caller-supplied options.
    #[serde(flatten)]
    pub options: CreateOptions,
}

impl ContainerConfig {
    /// Start a configuration for `image_id` carrying the caller's options.
    ///
    /// Every other field is empty until the caller fills it in.
    #[must_use]
    pub fn new(image_id: impl Into<String>, options: CreateOptions) -> Self {
        Self {
            image_id: image_id.into(),
            image: String::new(),
            command: Vec::new(),
            env: BTreeMap::new(),
            labels: BTreeMap::new(),
            net_mode: String::new(),
            network: String::new(),
            work_dir: String::new(),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::MockRpcConnector;
    use crate::Error;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn container_rejects_mismatched_id() {
        let client = PodmanClient::new(MockRpcConnector::new());
        let err = Container::new(client, "c1", object(json!({"id": "c2"}))).unwrap_err();
        assert!(matches!(err, Error::Consistency { .. }));
    }

    #[test]
    fn container_exposes_details() {
        let client = PodmanClient::new(MockRpcConnector::new());
        let container = Container::new(
            client,
            "c1",
            object(json!({"id": "c1", "names": "web", "status": "configured"})),
        )
        .unwrap();
        assert_eq!(container.id(), "c1");
        assert_eq!(container.get("names"), Some(&json!("web")));
        assert!(container.get("missing").is_none());
    }

    #[test]
    fn container_config_flattens_options() {
        let options = CreateOptions::default()
            .with_name("web")
            .with_tty(true)
            .with_publish("8080:80")
            .with_field("memory", 1024);
        let mut config = ContainerConfig::new("sha-1", options);
        config.image = "docker.io/library/nginx:latest".to_string();
        config.env.insert("A".to_string(), "1".to_string());

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["image_id"], "sha-1");
        assert_eq!(value["name"], "web");
        assert_eq!(value["tty"], true);
        assert_eq!(value["publish"], json!(["8080:80"]));
        assert_eq!(value["memory"], 1024);
        assert_eq!(value["env"], json!({"A": "1"}));
        assert!(value.get("interactive").is_none());
        assert!(value.get("volumes").is_none());
    }
}
