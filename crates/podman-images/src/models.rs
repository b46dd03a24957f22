//! Typed records exchanged with the image methods of the podman interface.

use chrono::{DateTime, Utc};
use podman_core::Error;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Deserialize `null` as the type's default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize labels given either as `KEY=VALUE` strings or as an object.
///
/// Objects are flattened into `KEY=VALUE` strings in key order.
pub fn deserialize_label_tokens<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(token) => Ok(token),
                other => Err(D::Error::custom(format!(
                    "label entry must be a string, got {other}"
                ))),
            })
            .collect(),
        Some(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(value) => format!("{key}={value}"),
                other => format!("{key}={other}"),
            })
            .collect()),
        Some(other) => Err(D::Error::custom(format!(
            "labels must be a list or an object, got {other}"
        ))),
    }
}

/// Parse a timestamp sent by the service.
///
/// Accepts RFC 3339 and the layout of Go's `time.Time.String()`
/// (`2006-01-02 15:04:05.999999999 -0700 MST`), ignoring any trailing
/// monotonic clock reading. Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    let mut fields = value.split_whitespace();
    let stamp = [fields.next()?, fields.next()?, fields.next()?].join(" ");
    DateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S%.f %z")
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Result of `InspectImage`, keyed by lower-cased top-level field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageInspect {
    /// Image id, empty when the payload omits it.
    #[serde(default)]
    pub id: String,
    /// Configuration baked into the image, with its original key case.
    #[serde(default, deserialize_with = "null_as_default")]
    pub containerconfig: InspectContainerConfig,
    /// Repository tags, in remote order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub repotags: Vec<String>,
    /// Labels as `KEY=VALUE` strings.
    #[serde(default, deserialize_with = "deserialize_label_tokens")]
    pub labels: Vec<String>,
    /// Every other top-level field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageInspect {
    /// Look up a top-level field not covered by the typed members.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// The `containerconfig` section of an inspect payload.
///
/// Keys keep the case sent by the service; the accessors match them
/// case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InspectContainerConfig(pub Map<String, Value>);

impl InspectContainerConfig {
    /// Look up a field ignoring ASCII case.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).or_else(|| {
            self.0
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
                .map(|(_, value)| value)
        })
    }

    /// Default command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedData`] if the field is not a list of strings.
    pub fn cmd(&self) -> crate::Result<Vec<String>> {
        self.strings("cmd")
    }

    /// Entrypoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedData`] if the field is not a list of strings.
    pub fn entrypoint(&self) -> crate::Result<Vec<String>> {
        self.strings("entrypoint")
    }

    /// Environment as `KEY=VALUE` strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedData`] if the field is not a list of strings.
    pub fn env(&self) -> crate::Result<Vec<String>> {
        self.strings("env")
    }

    /// Working directory, if set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&str> {
        self.get("workingdir").and_then(Value::as_str)
    }

    fn strings(&self, key: &str) -> crate::Result<Vec<String>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::MalformedData(format!("containerconfig `{key}`: {e}"))),
        }
    }
}

/// One entry of `HistoryImage`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDetail {
    /// Layer id.
    pub id: String,
    /// Creation time as sent by the service. See [`HistoryDetail::created_at`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Instruction that produced the layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Tags pointing at the layer.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Layer size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    /// Commit comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryDetail {
    /// Creation time, when present in a recognized format.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(parse_timestamp)
    }
}

/// One hit of `SearchImage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageSearchResult {
    /// Image name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Registry that returned the hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    /// Star count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_count: Option<i64>,
    /// Official image flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_official: Option<bool>,
    /// Automated build flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_automated: Option<bool>,
    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Arguments forwarded to `BuildImage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    /// Dockerfiles to build, in order.
    pub dockerfiles: Vec<String>,
    /// Name of the resulting image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Extra tags applied to the result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_tags: Vec<String>,
    /// Build context directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_dir: Option<String>,
    /// `ARG` values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_args: BTreeMap<String, String>,
    /// Labels as `KEY=VALUE` strings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label: Vec<String>,
    /// Annotations as `KEY=VALUE` strings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    /// Pull policy (`always`, `missing`, `never`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_policy: Option<String>,
    /// Ignore cached layers.
    #[serde(default)]
    pub nocache: bool,
    /// Squash new layers into one.
    #[serde(default)]
    pub squash: bool,
    /// Cache intermediate layers.
    #[serde(default)]
    pub layers: bool,
    /// Suppress build output.
    #[serde(default)]
    pub quiet: bool,
}

impl BuildRequest {
    /// Start a build of a single Dockerfile.
    #[must_use]
    pub fn new(dockerfile: impl Into<String>) -> Self {
        Self {
            dockerfiles: vec![dockerfile.into()],
            ..Self::default()
        }
    }

    /// Append another Dockerfile.
    #[must_use]
    pub fn with_dockerfile(mut self, dockerfile: impl Into<String>) -> Self {
        self.dockerfiles.push(dockerfile.into());
        self
    }

    /// Name the resulting image.
    #[must_use]
    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.additional_tags.push(tag.into());
        self
    }

    /// Set the build context directory.
    #[must_use]
    pub fn with_context_dir(mut self, dir: impl Into<String>) -> Self {
        self.context_dir = Some(dir.into());
        self
    }

    /// Set a build argument.
    #[must_use]
    pub fn with_build_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.build_args.insert(key.into(), value.into());
        self
    }

    /// Add a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label.push(label.into());
        self
    }

    /// Add an annotation.
    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Set the pull policy.
    #[must_use]
    pub fn with_pull_policy(mut self, policy: impl Into<String>) -> Self {
        self.pull_policy = Some(policy.into());
        self
    }

    /// Ignore cached layers.
    #[must_use]
    pub const fn with_no_cache(mut self, nocache: bool) -> Self {
        self.nocache = nocache;
        self
    }

    /// Squash new layers.
    #[must_use]
    pub const fn with_squash(mut self, squash: bool) -> Self {
        self.squash = squash;
        self
    }

    /// Cache intermediate layers.
    #[must_use]
    pub const fn with_layers(mut self, layers: bool) -> Self {
        self.layers = layers;
        self
    }

    /// Suppress build output.
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Check that the request names something to build.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when no Dockerfile is given.
    pub fn validate(&self) -> crate::Result<()> {
        if self.dockerfiles.iter().all(|file| file.trim().is_empty()) {
            return Err(Error::InvalidInput(
                "build requires at least one Dockerfile".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reply of `BuildImage`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildResponse {
    /// Id of the built image.
    pub id: String,
    /// Build output lines.
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<String>,
}

/// Arguments forwarded to `ImportImage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportImageRequest {
    /// Path or URL of the tarball, interpreted by the service.
    pub source: String,
    /// Name to store the image under.
    pub reference: String,
    /// Commit message.
    pub message: Option<String>,
    /// Dockerfile instructions applied on import (e.g. `CMD /bin/sh`).
    pub changes: Vec<String>,
}

impl ImportImageRequest {
    /// Import `source` as `reference`.
    #[must_use]
    pub fn new(source: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            reference: reference.into(),
            message: None,
            changes: Vec::new(),
        }
    }

    /// Set the commit message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Append a Dockerfile instruction.
    #[must_use]
    pub fn with_change(mut self, change: impl Into<String>) -> Self {
        self.changes.push(change.into());
        self
    }
}
