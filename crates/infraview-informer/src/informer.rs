//! Resource informer: the subscription and channel surface one host connection uses.

use std::sync::Arc;

use infraview_core::config::InformerConfig;
use infraview_core::events::{InformerAddPayload, InformerDeletePayload, InformerUpdatePayload};
use infraview_core::{AppResult, InformerAction};

use crate::dispatcher::InformerDispatcher;
use crate::receiver::InformerReceiver;
use crate::subscription::SubscriptionRegistry;

/// Informer facade owning one subscriber's registry and dispatcher.
#[derive(Debug, Clone)]
pub struct ResourceInformer {
    subscriptions: Arc<SubscriptionRegistry>,
    dispatcher: Arc<InformerDispatcher>,
}

impl ResourceInformer {
    /// Creates an informer with no subscriptions.
    pub fn new(config: &InformerConfig) -> Self {
        let subscriptions = Arc::new(SubscriptionRegistry::new());
        let dispatcher = Arc::new(InformerDispatcher::new(subscriptions.clone(), config));
        Self {
            subscriptions,
            dispatcher,
        }
    }

    /// Subscribes to actions on a resource in a namespace.
    pub fn subscribe(
        &self,
        resource_id: &str,
        namespace_id: &str,
        actions: impl IntoIterator<Item = InformerAction>,
    ) -> AppResult<()> {
        self.subscriptions.subscribe(resource_id, namespace_id, actions)
    }

    /// Unsubscribes from actions on a resource in a namespace.
    pub fn unsubscribe(
        &self,
        resource_id: &str,
        namespace_id: &str,
        actions: impl IntoIterator<Item = InformerAction>,
    ) -> AppResult<()> {
        self.subscriptions.unsubscribe(resource_id, namespace_id, actions)
    }

    /// Drops every subscription in a namespace.
    pub fn unsubscribe_all(&self, namespace_id: &str) -> AppResult<()> {
        self.subscriptions.unsubscribe_all(namespace_id)
    }

    /// Returns a new endpoint for added messages.
    pub fn add_channel(&self) -> InformerReceiver<InformerAddPayload> {
        self.dispatcher.add_channel()
    }

    /// Returns a new endpoint for updated messages.
    pub fn update_channel(&self) -> InformerReceiver<InformerUpdatePayload> {
        self.dispatcher.update_channel()
    }

    /// Returns a new endpoint for deleted messages.
    pub fn delete_channel(&self) -> InformerReceiver<InformerDeletePayload> {
        self.dispatcher.delete_channel()
    }

    /// Returns the dispatcher, e.g. to spawn its event pump.
    pub fn dispatcher(&self) -> &Arc<InformerDispatcher> {
        &self.dispatcher
    }

    /// Returns the subscription registry.
    pub fn subscriptions(&self) -> &Arc<SubscriptionRegistry> {
        &self.subscriptions
    }
}
