//! Integration tests for parsing podman image replies.
//!
//! These tests drive the public API through a connector that answers from JSON
//! fixtures captured from a podman service.

use async_trait::async_trait;
use podman_core::{
    Error, PodmanClient, Result, RpcConnector, RpcRequest, RpcSession,
};
use podman_images::{HistoryDetail, Image, Images};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture from disk.
fn load_fixture(name: &str) -> Value {
    let fixture_path = fixtures_dir().join(name);
    let raw = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&raw)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {name}: {e}"))
}

#[derive(Default)]
struct Journal {
    calls: Vec<String>,
    closed: usize,
}

/// Connector answering each method with a canned reply.
struct FixtureConnector {
    replies: Arc<HashMap<String, Value>>,
    journal: Arc<Mutex<Journal>>,
}

impl FixtureConnector {
    fn new(replies: HashMap<String, Value>) -> (Self, Arc<Mutex<Journal>>) {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let connector = Self {
            replies: Arc::new(replies),
            journal: Arc::clone(&journal),
        };
        (connector, journal)
    }
}

#[async_trait]
impl RpcConnector for FixtureConnector {
    async fn connect(&self) -> Result<Box<dyn RpcSession>> {
        Ok(Box::new(FixtureSession {
            replies: Arc::clone(&self.replies),
            journal: Arc::clone(&self.journal),
        }))
    }
}

struct FixtureSession {
    replies: Arc<HashMap<String, Value>>,
    journal: Arc<Mutex<Journal>>,
}

#[async_trait]
impl RpcSession for FixtureSession {
    async fn call(&mut self, request: RpcRequest) -> Result<Value> {
        self.journal.lock().unwrap().calls.push(request.method.clone());
        self.replies
            .get(&request.method)
            .cloned()
            .ok_or_else(|| Error::rpc(request.method, "org.varlink.service.MethodNotFound"))
    }

    async fn close(&mut self) -> Result<()> {
        self.journal.lock().unwrap().closed += 1;
        Ok(())
    }
}

fn fixture_client() -> (PodmanClient, Arc<Mutex<Journal>>) {
    let inspect = load_fixture("inspect_image.json");
    let mut replies = HashMap::new();
    replies.insert(
        "io.podman.ListImages".to_string(),
        load_fixture("list_images.json"),
    );
    replies.insert(
        "io.podman.InspectImage".to_string(),
        json!({"image": inspect.to_string()}),
    );
    replies.insert(
        "io.podman.HistoryImage".to_string(),
        load_fixture("history_image.json"),
    );
    let (connector, journal) = FixtureConnector::new(replies);
    (PodmanClient::new(connector), journal)
}

const ALPINE_ID: &str = "3fd9065eaf02feaf94d68376da52541925650b81698c53c6824d92ff63f98353";

async fn alpine(images: &Images) -> Image {
    images
        .get(ALPINE_ID)
        .await
        .unwrap()
        .expect("Should have the alpine image")
}

#[tokio::test]
async fn test_list_fixture() {
    let (client, journal) = fixture_client();
    let images = Images::new(client);

    let listed: Vec<Image> = images
        .list()
        .await
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(listed.len(), 2, "Expected 2 images in test data");
    assert_eq!(listed[0].id(), ALPINE_ID);
    assert_eq!(listed[0].repo_tags(), vec!["docker.io/library/alpine:latest"]);
    assert_eq!(listed[0].size(), Some(4_413_370));
    assert_eq!(listed[0].containers(), Some(1));
    assert_eq!(listed[0].parent_id(), Some(""));

    let fedora = &listed[1];
    assert_eq!(fedora.repo_tags().len(), 2);
    assert!(fedora.repo_digests().is_empty());
    assert_eq!(
        fedora.labels().and_then(|labels| labels.get("vendor")),
        Some(&json!("Fedora Project"))
    );
    assert!(fedora.created().is_some());

    let journal = journal.lock().unwrap();
    assert_eq!(journal.calls, vec!["io.podman.ListImages"]);
    assert_eq!(journal.closed, 1);
}

#[tokio::test]
async fn test_inspect_fixture() {
    let (client, _journal) = fixture_client();
    let images = Images::new(client);
    let image = alpine(&images).await;

    let details = image.inspect().await.unwrap();
    assert_eq!(details.id, ALPINE_ID);
    assert_eq!(details.repotags, vec!["docker.io/library/alpine:latest"]);
    assert!(details.labels.is_empty());
    assert_eq!(details.containerconfig.cmd().unwrap(), vec!["/bin/sh"]);
    assert_eq!(details.containerconfig.env().unwrap().len(), 1);
    assert!(details.containerconfig.0.contains_key("WorkingDir"));
    assert_eq!(details.get("os"), Some(&json!("linux")));
    assert_eq!(details.get("architecture"), Some(&json!("amd64")));
    assert!(details.get("Os").is_none());
    assert!(details.get("history").is_some_and(Value::is_array));
}

#[tokio::test]
async fn test_history_fixture() {
    let (client, journal) = fixture_client();
    let images = Images::new(client);
    let image = alpine(&images).await;

    let history: Vec<HistoryDetail> = image
        .history()
        .await
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, ALPINE_ID);
    assert_eq!(history[0].tags, vec!["docker.io/library/alpine:latest"]);
    assert_eq!(history[1].id, "<missing>");
    assert!(history[1].tags.is_empty());
    assert_eq!(history[1].size, Some(4_413_370));
    assert!(history[0].created_at() > history[1].created_at());
    assert!(history[1].created_at().is_some());

    let journal = journal.lock().unwrap();
    assert_eq!(
        journal.calls,
        vec!["io.podman.ListImages", "io.podman.HistoryImage"]
    );
    assert_eq!(journal.closed, 2);
}

#[tokio::test]
async fn test_unknown_method_passes_through() {
    let (client, journal) = fixture_client();
    let images = Images::new(client);

    let err = images.pull("docker.io/library/alpine").await.unwrap_err();
    assert_eq!(
        err,
        Error::rpc("io.podman.PullImage", "org.varlink.service.MethodNotFound")
    );
    assert_eq!(journal.lock().unwrap().closed, 1);
}

#[tokio::test]
async fn test_get_missing_image() {
    let (client, _journal) = fixture_client();
    let images = Images::new(client);
    assert!(images.get("does-not-exist").await.unwrap().is_none());
}
