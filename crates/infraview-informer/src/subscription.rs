//! Subscription registry: which actions are wanted for each resource and namespace.

use std::collections::BTreeSet;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use infraview_core::{AppError, AppResult, InformerAction};

/// Subscription key: resource kind and namespace.
type SubscriptionKey = (String, String);

/// Registry of informer subscriptions for one subscriber.
///
/// Every mutation runs under the shard lock of the affected entry, so a
/// concurrent dispatch never observes a half-updated action set.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    /// (resource, namespace) → subscribed actions.
    subscriptions: DashMap<SubscriptionKey, BTreeSet<InformerAction>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds actions to the subscription for a resource and namespace.
    pub fn subscribe(
        &self,
        resource_id: &str,
        namespace_id: &str,
        actions: impl IntoIterator<Item = InformerAction>,
    ) -> AppResult<()> {
        validate(resource_id)?;

        let mut actions = actions.into_iter().peekable();
        if actions.peek().is_none() {
            return Ok(());
        }

        let mut entry = self
            .subscriptions
            .entry(key(resource_id, namespace_id))
            .or_default();
        entry.extend(actions);

        debug!(
            resource = %resource_id,
            namespace = %namespace_id,
            actions = ?entry.value(),
            "Subscribed"
        );
        Ok(())
    }

    /// Removes actions from the subscription for a resource and namespace.
    ///
    /// Removing an action that is not subscribed is a no-op.
    pub fn unsubscribe(
        &self,
        resource_id: &str,
        namespace_id: &str,
        actions: impl IntoIterator<Item = InformerAction>,
    ) -> AppResult<()> {
        validate(resource_id)?;

        if let Entry::Occupied(mut entry) = self.subscriptions.entry(key(resource_id, namespace_id))
        {
            for action in actions {
                entry.get_mut().remove(&action);
            }
            if entry.get().is_empty() {
                entry.remove();
            }
        }

        debug!(resource = %resource_id, namespace = %namespace_id, "Unsubscribed");
        Ok(())
    }

    /// Removes every subscription in a namespace, whatever the resource.
    pub fn unsubscribe_all(&self, namespace_id: &str) -> AppResult<()> {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(_, ns), _| ns != namespace_id);

        debug!(
            namespace = %namespace_id,
            removed = before.saturating_sub(self.subscriptions.len()),
            "Unsubscribed namespace"
        );
        Ok(())
    }

    /// Returns `true` if the action is subscribed for the resource and namespace.
    pub fn is_subscribed(&self, resource_id: &str, namespace_id: &str, action: InformerAction) -> bool {
        self.subscriptions
            .get(&key(resource_id, namespace_id))
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Returns the subscribed actions for a resource and namespace.
    pub fn actions(&self, resource_id: &str, namespace_id: &str) -> Vec<InformerAction> {
        self.subscriptions
            .get(&key(resource_id, namespace_id))
            .map(|actions| actions.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of (resource, namespace) pairs with a subscription.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

fn key(resource_id: &str, namespace_id: &str) -> SubscriptionKey {
    (resource_id.to_string(), namespace_id.to_string())
}

fn validate(resource_id: &str) -> AppResult<()> {
    if resource_id.trim().is_empty() {
        return Err(AppError::validation("Resource id must not be empty"));
    }
    Ok(())
}
