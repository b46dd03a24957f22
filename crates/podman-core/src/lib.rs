//! # podman-core
//!
//! Core types and RPC plumbing for the podman client data models.
//!
//! This crate provides the error taxonomy, configuration, the connector/session
//! seam used to reach a podman service, and the record helpers shared by the
//! resource crates.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy shared by every podman client crate
//! - [`config`] - Client configuration and validation
//! - [`rpc`] - Connector and session traits wrapping the remote transport
//! - [`client`] - The shared [`PodmanClient`] and its scoped [`Session`]
//! - [`params`] - Builder for RPC parameter objects
//! - [`record`] - Key normalization, token splitting, and lazy record iteration
//! - [`container`] - Container projection and creation configuration

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod container;
pub mod error;
pub mod params;
pub mod record;
pub mod rpc;

// Re-export commonly used types
pub use client::{PodmanClient, Session};
pub use config::{ContainerDefaults, PodmanClientConfig};
pub use container::{Container, ContainerConfig, CreateOptions};
pub use error::{Error, Result};
pub use params::Parameters;
pub use record::{lowercase_keys, split_token, Records};
pub use rpc::{RpcConnector, RpcRequest, RpcSession};
