//! Facade over the image store.

use crate::image::Image;
use crate::models::{BuildRequest, BuildResponse, ImageSearchResult, ImportImageRequest};
use crate::Result;
use podman_core::{Parameters, PodmanClient, Records};
use serde_json::{Map, Value};
use tracing::info;

/// Collection-level operations on the image store.
#[derive(Debug, Clone)]
pub struct Images {
    client: PodmanClient,
}

impl Images {
    /// Create the facade over a shared client.
    #[must_use]
    pub const fn new(client: PodmanClient) -> Self {
        Self { client }
    }

    /// The client this facade issues calls through.
    #[must_use]
    pub const fn client(&self) -> &PodmanClient {
        &self.client
    }

    /// List every image in the store, in the order the service returns them.
    ///
    /// Each call issues a fresh `ListImages`.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn list(&self) -> Result<ImageIter> {
        let records: Vec<Map<String, Value>> = self
            .client
            .call("ListImages", Parameters::new(), "images")
            .await?;
        Ok(ImageIter {
            client: self.client.clone(),
            records: records.into_iter(),
        })
    }

    /// Build an image.
    ///
    /// # Errors
    ///
    /// Returns [`podman_core::Error::InvalidInput`] when the request names no Dockerfile.
    /// Remote errors are propagated.
    pub async fn build(&self, request: &BuildRequest) -> Result<BuildResponse> {
        request.validate()?;
        info!(dockerfiles = ?request.dockerfiles, output = ?request.output, "Building image");
        let mut params = Parameters::new();
        params.push_serialized("build", request)?;
        self.client.call("BuildImage", params, "image").await
    }

    /// Delete images not used by any container, returning their ids.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn delete_unused(&self) -> Result<Vec<String>> {
        info!("Deleting unused images");
        self.client
            .call("DeleteUnusedImages", Parameters::new(), "images")
            .await
    }

    /// Import a tarball into the store.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn import_image(&self, request: &ImportImageRequest) -> Result<String> {
        info!(source = %request.source, reference = %request.reference, "Importing image");
        let mut params = Parameters::new();
        params.push("source", request.source.as_str());
        params.push("reference", request.reference.as_str());
        params.push("message", request.message.clone());
        params.push("changes", request.changes.clone());
        self.client.call("ImportImage", params, "image").await
    }

    /// Copy an image from a registry into the store, returning its id.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn pull(&self, source: &str) -> Result<String> {
        info!(source, "Pulling image");
        let mut params = Parameters::new();
        params.push("name", source);
        self.client.call("PullImage", params, "id").await
    }

    /// Search registries using the configured default limit.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn search(&self, term: &str) -> Result<Records<ImageSearchResult>> {
        self.search_with_limit(term, self.client.config().search_limit)
            .await
    }

    /// Search registries for `term`, asking for at most `limit` hits.
    ///
    /// # Errors
    ///
    /// Propagates remote errors.
    pub async fn search_with_limit(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Records<ImageSearchResult>> {
        let mut params = Parameters::new();
        params.push("name", term);
        params.push("limit", limit);
        let hits: Vec<Value> = self.client.call("SearchImage", params, "images").await?;
        Ok(Records::new(hits))
    }

    /// Find an image by id with a linear scan of [`Images::list`].
    ///
    /// Returns `Ok(None)` when no image matches.
    ///
    /// # Errors
    ///
    /// Propagates remote errors and malformed list entries met before a match.
    pub async fn get(&self, id: &str) -> Result<Option<Image>> {
        for image in self.list().await? {
            let image = image?;
            if image.id() == id {
                return Ok(Some(image));
            }
        }
        Ok(None)
    }
}

/// Lazy iterator over the entries of one `ListImages` reply.
#[derive(Debug)]
pub struct ImageIter {
    client: PodmanClient,
    records: std::vec::IntoIter<Map<String, Value>>,
}

impl Iterator for ImageIter {
    type Item = Result<Image>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .next()
            .map(|record| Image::from_record(self.client.clone(), record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for ImageIter {}
