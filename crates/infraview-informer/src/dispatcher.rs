//! Informer dispatcher: routes backend change events to per-action channels.
//!
//! Each action owns a bounded `broadcast` channel. Sending never blocks:
//! - with no receiver attached the message is discarded (no backlog);
//! - a slow receiver loses its oldest messages instead of stalling dispatch.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, trace};

use infraview_core::config::InformerConfig;
use infraview_core::events::{InformerAddPayload, InformerDeletePayload, InformerUpdatePayload};
use infraview_core::{ChangeEvent, InformerAction, InformerMessage};

use crate::receiver::InformerReceiver;
use crate::subscription::SubscriptionRegistry;

/// Publishes subscribed change events.
#[derive(Debug)]
pub struct InformerDispatcher {
    /// Subscriptions consulted on every event.
    subscriptions: Arc<SubscriptionRegistry>,
    /// Added channel.
    added: broadcast::Sender<InformerMessage<InformerAddPayload>>,
    /// Updated channel.
    updated: broadcast::Sender<InformerMessage<InformerUpdatePayload>>,
    /// Deleted channel.
    deleted: broadcast::Sender<InformerMessage<InformerDeletePayload>>,
}

impl InformerDispatcher {
    /// Creates a dispatcher whose channels buffer `channel_buffer_size` messages.
    pub fn new(subscriptions: Arc<SubscriptionRegistry>, config: &InformerConfig) -> Self {
        let capacity = config.channel_buffer_size.max(1);
        Self {
            subscriptions,
            added: broadcast::channel(capacity).0,
            updated: broadcast::channel(capacity).0,
            deleted: broadcast::channel(capacity).0,
        }
    }

    /// Dispatches one change event.
    ///
    /// Returns `true` if the event's action was subscribed and a message was
    /// published, whether or not any receiver was attached.
    pub fn dispatch(&self, event: ChangeEvent) -> bool {
        let action = event.action();
        if !self
            .subscriptions
            .is_subscribed(event.resource_id(), event.namespace_id(), action)
        {
            trace!(
                action = %action,
                resource = %event.resource_id(),
                namespace = %event.namespace_id(),
                "Change event not subscribed"
            );
            return false;
        }

        let receivers = match event {
            ChangeEvent::Added {
                resource_id,
                namespace_id,
                payload,
            } => publish(&self.added, message(resource_id, namespace_id, action, payload)),
            ChangeEvent::Updated {
                resource_id,
                namespace_id,
                payload,
            } => publish(&self.updated, message(resource_id, namespace_id, action, payload)),
            ChangeEvent::Deleted {
                resource_id,
                namespace_id,
                payload,
            } => publish(&self.deleted, message(resource_id, namespace_id, action, payload)),
        };

        debug!(action = %action, receivers, "Informer message dispatched");
        true
    }

    /// Pumps backend change events until the queue closes or shutdown is signalled.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<ChangeEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("Informer dispatcher started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Informer dispatcher received shutdown signal");
                        break;
                    }
                }
                event = events.recv() => match event {
                    Some(event) => {
                        self.dispatch(event);
                    }
                    None => {
                        info!("Change event queue closed");
                        break;
                    }
                }
            }
        }

        info!("Informer dispatcher stopped");
    }

    /// Returns a new endpoint for added messages.
    pub fn add_channel(&self) -> InformerReceiver<InformerAddPayload> {
        InformerReceiver::new(InformerAction::Added, self.added.subscribe())
    }

    /// Returns a new endpoint for updated messages.
    pub fn update_channel(&self) -> InformerReceiver<InformerUpdatePayload> {
        InformerReceiver::new(InformerAction::Updated, self.updated.subscribe())
    }

    /// Returns a new endpoint for deleted messages.
    pub fn delete_channel(&self) -> InformerReceiver<InformerDeletePayload> {
        InformerReceiver::new(InformerAction::Deleted, self.deleted.subscribe())
    }

    /// Returns the subscription registry.
    pub fn subscriptions(&self) -> &Arc<SubscriptionRegistry> {
        &self.subscriptions
    }
}

fn message<T>(
    resource_id: String,
    namespace_id: String,
    action: InformerAction,
    payload: T,
) -> InformerMessage<T> {
    InformerMessage {
        resource_id,
        namespace_id,
        action,
        payload,
        timestamp: Utc::now(),
    }
}

/// Sends without blocking; returns how many receivers got the message.
fn publish<T>(sender: &broadcast::Sender<InformerMessage<T>>, msg: InformerMessage<T>) -> usize {
    sender.send(msg).unwrap_or(0)
}
