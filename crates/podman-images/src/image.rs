//! Projection of a single stored image.

use crate::models::{parse_timestamp, HistoryDetail, ImageInspect};
use crate::Result;
use chrono::{DateTime, Utc};
use podman_core::record::{ensure_id, payload_id};
use podman_core::{
    lowercase_keys, split_token, Container, ContainerConfig, CreateOptions, Error, Parameters,
    PodmanClient, Records,
};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Index;
use tracing::info;

/// Fields of [`ContainerConfig`] that `create` always fills from the image.
const IMAGE_DERIVED_FIELDS: &[&str] = &[
    "image_id", "command", "env", "image", "labels", "net_mode", "network", "work_dir",
];

/// Local projection of one remote image.
///
/// Holds the payload it was built from (usually a `ListImages` entry) and
/// exposes every key through [`Image::get`] and indexing.
#[derive(Clone)]
pub struct Image {
    client: PodmanClient,
    id: String,
    data: Map<String, Value>,
}

impl Image {
    /// Build the projection, checking that `data` describes image `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Consistency`] when the payload id differs from `id`.
    pub fn new(client: PodmanClient, id: impl Into<String>, data: Map<String, Value>) -> Result<Self> {
        let id = id.into();
        ensure_id(&id, &data)?;
        Ok(Self { client, id, data })
    }

    /// Build the projection from a payload, taking the id from the payload itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedData`] when the payload has no string `id`.
    pub fn from_record(client: PodmanClient, data: Map<String, Value>) -> Result<Self> {
        let id = payload_id(&data)
            .ok_or_else(|| Error::MalformedData("image record missing `id`".to_string()))?
            .to_string();
        Ok(Self { client, id, data })
    }

    /// Image id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Look up a payload field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns true if the payload has `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// All payload fields.
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Consume the projection, returning its payload.
    #[must_use]
    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    /// Repository tags.
    #[must_use]
    pub fn repo_tags(&self) -> Vec<&str> {
        self.str_list("repoTags")
    }

    /// Repository digests.
    #[must_use]
    pub fn repo_digests(&self) -> Vec<&str> {
        self.str_list("repoDigests")
    }

    /// Parent image id.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.get("parentId").and_then(Value::as_str)
    }

    /// Creation time, when present in a recognized format.
    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.get("created")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> Option<i64> {
        self.get("size").and_then(Value::as_i64)
    }

    /// Virtual size in bytes.
    #[must_use]
    pub fn virtual_size(&self) -> Option<i64> {
        self.get("virtualSize").and_then(Value::as_i64)
    }

    /// Number of containers using the image.
    #[must_use]
    pub fn containers(&self) -> Option<i64> {
        self.get("containers").and_then(Value::as_i64)
    }

    /// Whether other images are built on top of this one.
    #[must_use]
    pub fn is_parent(&self) -> bool {
        self.get("isParent").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Labels attached to the image.
    #[must_use]
    pub fn labels(&self) -> Option<&Map<String, Value>> {
        self.get("labels").and_then(Value::as_object)
    }

    fn str_list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn name_param(&self) -> Parameters {
        let mut params = Parameters::new();
        params.push("name", self.id.as_str());
        params
    }

    /// Fetch the full inspect payload.
    ///
    /// # Errors
    ///
    /// Propagates remote errors; returns [`Error::MalformedData`] if the
    /// payload is not a JSON object of the expected shape.
    pub async fn inspect(&self) -> Result<ImageInspect> {
        let raw: String = self
            .client
            .call("InspectImage", self.name_param(), "image")
            .await?;

        let Value::Object(payload) = serde_json::from_str::<Value>(&raw)? else {
            return Err(Error::MalformedData(format!(
                "inspect payload for image {} is not an object",
                self.id
            )));
        };
        serde_json::from_value(Value::Object(lowercase_keys(payload))).map_err(Error::from)
    }

    /// Create a container from this image.
    ///
    /// Command, environment, image reference, and labels come from
    /// [`Image::inspect`]; network and working directory come from the client's
    /// container defaults. Those fields override anything in `options`.
    ///
    /// The container is created and fetched in one session, after the inspect
    /// session has closed. The two are not atomic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] when the image has no repository tags and
    /// [`Error::InvalidInput`] for malformed environment or label entries.
    /// Remote errors are propagated.
    pub async fn create(&self, options: CreateOptions) -> Result<Container> {
        let details = self.inspect().await?;
        let config = self.container_config(&details, options)?;

        info!(image = %self.id, reference = %config.image, "Creating container from image");
        let mut session = self.client.session().await?;
        let outcome = async {
            let mut params = Parameters::new();
            params.push_serialized("create", &config)?;
            let id: String = session.call("CreateContainer", params, "container").await?;

            let mut params = Parameters::new();
            params.push("name", id.as_str());
            let details: Map<String, Value> =
                session.call("GetContainer", params, "container").await?;
            Ok::<_, Error>((id, details))
        }
        .await;
        let (id, details) = session.finish(outcome).await?;

        Container::new(self.client.clone(), id, details)
    }

    /// Alias of [`Image::create`].
    ///
    /// # Errors
    ///
    /// See [`Image::create`].
    pub async fn container(&self, options: CreateOptions) -> Result<Container> {
        self.create(options).await
    }

    fn container_config(
        &self,
        details: &ImageInspect,
        mut options: CreateOptions,
    ) -> Result<ContainerConfig> {
        let image = details.repotags.first().ok_or_else(|| {
            Error::Precondition(format!("image {} has no repository tags", self.id))
        })?;

        options
            .extra
            .retain(|key, _| !IMAGE_DERIVED_FIELDS.contains(&key.as_str()));

        let defaults = &self.client.config().container_defaults;
        let mut config = ContainerConfig::new(self.id.as_str(), options);
        config.command = details.containerconfig.cmd()?;
        config.env = split_token(&details.containerconfig.env()?, '=')?;
        config.image.clone_from(image);
        config.labels = split_token(&details.labels, '=')?;
        config.net_mode.clone_from(&defaults.net_mode);
        config.network.clone_from(&defaults.network);
        config.work_dir.clone_from(&defaults.work_dir);
        Ok(config)
    }

    /// Write the image to `dest` on the service host.
    ///
    /// Returns the id reported by the service.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn export(&self, dest: &str, compressed: bool) -> Result<String> {
        info!(image = %self.id, dest, compressed, "Exporting image");
        let mut params = self.name_param();
        params.push("destination", dest);
        params.push("compress", compressed);
        self.client.call("ExportImage", params, "image").await
    }

    /// Layer history, in the order the service returns it.
    ///
    /// # Errors
    ///
    /// Propagates remote errors; individual entries that fail to parse are
    /// reported by the iterator.
    pub async fn history(&self) -> Result<Records<HistoryDetail>> {
        let entries: Vec<Value> = self
            .client
            .call("HistoryImage", self.name_param(), "history")
            .await?;
        Ok(Records::new(entries))
    }

    /// Copy the image to `target`.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn push(&self, target: &str, tlsverify: bool) -> Result<String> {
        info!(image = %self.id, target, tlsverify, "Pushing image");
        let mut params = self.name_param();
        params.push("tag", target);
        params.push("tlsverify", tlsverify);
        self.client.call("PushImage", params, "image").await
    }

    /// Delete the image. With `force`, containers using it are stopped first.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn remove(&self, force: bool) -> Result<String> {
        info!(image = %self.id, force, "Removing image");
        let mut params = self.name_param();
        params.push("force", force);
        self.client.call("RemoveImage", params, "image").await
    }

    /// Add `tag` to the image.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn tag(&self, tag: &str) -> Result<String> {
        info!(image = %self.id, tag, "Tagging image");
        let mut params = self.name_param();
        params.push("tagged", tag);
        self.client.call("TagImage", params, "image").await
    }
}

impl Index<&str> for Image {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if the payload has no such key.
    fn index(&self, key: &str) -> &Value {
        match self.data.get(key) {
            Some(value) => value,
            None => panic!("image {} has no field `{key}`", self.id),
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}
