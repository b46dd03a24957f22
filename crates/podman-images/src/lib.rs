//! Image models for the podman RPC service.
//!
//! Provides the [`Image`] projection of a single stored image and the
//! [`Images`] facade over the image store, both issuing calls through a shared
//! [`podman_core::PodmanClient`].

#![deny(missing_docs)]

pub mod image;
pub mod images;
pub mod models;

pub use image::Image;
pub use images::{ImageIter, Images};
pub use models::{
    BuildRequest, BuildResponse, HistoryDetail, ImageInspect, ImageSearchResult,
    ImportImageRequest, InspectContainerConfig,
};

/// Convenient result alias using the shared podman error type.
pub type Result<T> = podman_core::Result<T>;
