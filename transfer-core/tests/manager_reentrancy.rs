//! Exercises the `TransferManager`'s single-run-at-a-time guard: a second
//! `transfer()` call made while one is still in flight must fail fast with
//! `TransferError::AlreadyRunning` rather than racing the first call's
//! progress counters.

use std::sync::Arc;
use std::time::Duration;

use transfer_core::plugins::{AnyPlugin, Deduplicator, PluginKind, PluginMeta, PluginRegistry};
use transfer_core::{TransferError, TransferManager, TransferManagerOptions};
use transfer_spec::{Config, ServerConfig, TransferOptions, Workflow};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A deduplicator that never matches, registered under the default name so
/// `TransferOptions::default()` resolves it without extra configuration.
struct NeverDuplicate;
impl PluginMeta for NeverDuplicate {
    fn name(&self) -> &str { "standard-deduplicator" }
    fn version(&self) -> &str { "1.0.0" }
    fn kind(&self) -> PluginKind { PluginKind::Deduplicator }
    fn is_enabled(&self) -> bool { true }
    fn enable(&self) {}
}
impl Deduplicator for NeverDuplicate {
    fn is_duplicate(&self, _candidate: &Workflow, _existing: &[Workflow]) -> bool { false }
    fn reason(&self, _candidate: &Workflow) -> Option<String> { None }
}

async fn manager_against(source: &MockServer, target: &MockServer) -> TransferManager {
    let config = Config {
        source: ServerConfig::new(source.uri(), "sk_source").unwrap(),
        target: ServerConfig::new(target.uri(), "sk_target").unwrap(),
    };
    let registry = Arc::new(PluginRegistry::new());
    registry.register(AnyPlugin::Deduplicator(Arc::new(NeverDuplicate))).unwrap();
    TransferManager::new(config, TransferManagerOptions { logger: None, plugin_registry: Some(registry) }).unwrap()
}

#[tokio::test]
async fn second_concurrent_transfer_is_rejected() {
    let source = MockServer::start().await;
    let target = MockServer::start().await;

    // /healthz resolves immediately so connectivity passes quickly; the
    // SOURCE workflow fetch is held open long enough to overlap the
    // second `transfer()` call.
    Mock::given(method("GET")).and(path("/healthz")).respond_with(ResponseTemplate::new(200)).mount(&source).await;
    Mock::given(method("GET")).and(path("/healthz")).respond_with(ResponseTemplate::new(200)).mount(&target).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)).set_body_json(serde_json::json!({"data": []})))
        .mount(&source)
        .await;
    Mock::given(method("GET")).and(path("/api/v1/workflows")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []}))).mount(&target).await;

    let manager = Arc::new(manager_against(&source, &target).await);

    let first = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.transfer(TransferOptions::default()).await })
    };
    // Give the first call time to pass connectivity checks and start its
    // SOURCE fetch before the second call is issued.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = manager.transfer(TransferOptions::default()).await;
    assert!(matches!(second, Err(TransferError::AlreadyRunning)));

    let first_result = first.await.unwrap();
    assert!(first_result.is_ok());
}

#[tokio::test]
async fn manager_accepts_a_new_transfer_once_the_first_completes() {
    let source = MockServer::start().await;
    let target = MockServer::start().await;

    Mock::given(method("GET")).and(path("/healthz")).respond_with(ResponseTemplate::new(200)).mount(&source).await;
    Mock::given(method("GET")).and(path("/healthz")).respond_with(ResponseTemplate::new(200)).mount(&target).await;
    Mock::given(method("GET")).and(path("/api/v1/workflows")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []}))).mount(&source).await;
    Mock::given(method("GET")).and(path("/api/v1/workflows")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []}))).mount(&target).await;

    let manager = manager_against(&source, &target).await;

    manager.transfer(TransferOptions::default()).await.unwrap();
    // The guard must have released after the first call returned.
    manager.transfer(TransferOptions::default()).await.unwrap();
}
