//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use infraview_core::InformerMessage;
use infraview_core::config::{AppConfig, ResourceDefinition};
use infraview_core::operation::CreateInput;
use infraview_informer::{InformerReceiver, ResourceInformer};
use infraview_plugin::{MemoryBackend, ResourceProvider};

/// A provider and informer wired to one in-memory backend.
pub struct TestHost {
    /// Hook-wrapped resource access
    pub provider: ResourceProvider,
    /// Subscription and channel surface
    pub informer: ResourceInformer,
    /// Backend shared with the provider
    pub backend: Arc<MemoryBackend>,
    shutdown: watch::Sender<bool>,
    pump: JoinHandle<()>,
}

impl TestHost {
    /// Serves `events` (namespaced) and `nodes` (cluster scoped).
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.hooks.timeout_ms = 500;
        config.informer.channel_buffer_size = 64;
        config.backend.resources = vec![
            ResourceDefinition::namespaced("events"),
            ResourceDefinition::cluster("nodes"),
        ];

        let (events_tx, events_rx) = mpsc::channel(config.informer.event_queue_size);
        let backend = Arc::new(
            MemoryBackend::new(config.backend.resources.iter().cloned()).with_events(events_tx),
        );
        let provider = ResourceProvider::new(backend.clone(), &config.hooks);
        let informer = ResourceInformer::new(&config.informer);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let dispatcher = informer.dispatcher().clone();
        let pump = tokio::spawn(async move { dispatcher.run(events_rx, shutdown_rx).await });

        Self {
            provider,
            informer,
            backend,
            shutdown,
            pump,
        }
    }

    /// Stops the dispatcher pump and waits for it.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        self.pump.await.expect("informer pump panicked");
    }
}

/// Builds a create request for an event object.
pub fn event(name: &str, reason: &str) -> CreateInput {
    CreateInput {
        name: name.to_string(),
        input: json!({ "reason": reason, "count": 1 }),
    }
}

/// Builds an event body for updates.
pub fn event_body(reason: &str, count: u64) -> Value {
    json!({ "reason": reason, "count": count })
}

/// Waits up to a second for the next informer message.
pub async fn next_message<T: Clone>(rx: &mut InformerReceiver<T>) -> InformerMessage<T> {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for informer message")
        .expect("informer channel closed")
}
