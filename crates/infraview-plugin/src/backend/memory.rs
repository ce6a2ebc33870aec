//! In-memory resource backend.
//!
//! Objects are JSON documents stored per `(resource, namespace)` and keyed
//! by name. Every successful create, update and delete is reported as a
//! [`ChangeEvent`] on an optional bounded queue. The queue is written with
//! `try_send`; when it is full the event is dropped with a warning.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use infraview_core::config::{ResourceDefinition, ResourceScope};
use infraview_core::operation::{
    CreateInput, CreateResult, DeleteInput, DeleteResult, FindInput, FindResult, GetInput,
    GetResult, ListInput, ListResult, UpdateInput, UpdateResult,
};
use infraview_core::types::{PageRequest, SortField};
use infraview_core::{AppError, AppResult, ChangeEvent, ResourceProviderInput};

use super::ResourceBackend;

/// Storage key: resource kind and namespace.
type ObjectKey = (String, String);

/// Thread-safe in-memory backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Resource id → scope.
    definitions: DashMap<String, ResourceScope>,
    /// (resource, namespace) → name → object.
    objects: DashMap<ObjectKey, BTreeMap<String, Value>>,
    /// Change event queue.
    events: Option<mpsc::Sender<ChangeEvent>>,
}

impl MemoryBackend {
    /// Creates a backend serving the given resource kinds.
    pub fn new(definitions: impl IntoIterator<Item = ResourceDefinition>) -> Self {
        let backend = Self::default();
        for definition in definitions {
            backend.define(definition);
        }
        backend
    }

    /// Reports changes on the given queue.
    pub fn with_events(mut self, events: mpsc::Sender<ChangeEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Adds or replaces a resource kind.
    pub fn define(&self, definition: ResourceDefinition) {
        self.definitions.insert(definition.id, definition.scope);
    }

    /// Returns the number of objects stored for a resource and namespace.
    pub fn object_count(&self, resource_id: &str, namespace_id: &str) -> usize {
        self.objects
            .get(&key(resource_id, namespace_id))
            .map(|bucket| bucket.len())
            .unwrap_or(0)
    }

    fn emit(&self, event: ChangeEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(
                    resource = %event.resource_id(),
                    namespace = %event.namespace_id(),
                    action = %event.action(),
                    "Change event queue full, dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Change event queue closed");
            }
        }
    }

    fn snapshot(&self, resource_id: &str, namespace_id: &str) -> Vec<Value> {
        self.objects
            .get(&key(resource_id, namespace_id))
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default()
    }
}

fn key(resource_id: &str, namespace_id: &str) -> ObjectKey {
    (resource_id.to_string(), namespace_id.to_string())
}

/// Normalizes an object body and stamps its identity into `metadata`.
fn stamp(body: Value, name: &str, namespace_id: &str) -> AppResult<Value> {
    if name.is_empty() {
        return Err(AppError::validation("Object name must not be empty"));
    }

    let mut object = match body {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        _ => {
            return Err(AppError::validation(format!(
                "Object '{name}' must be a JSON object"
            )));
        }
    };

    let metadata = object
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(metadata) = metadata else {
        return Err(AppError::validation(format!(
            "Object '{name}' has a non-object metadata field"
        )));
    };
    metadata.insert("name".to_string(), Value::String(name.to_string()));
    if !namespace_id.is_empty() {
        metadata.insert(
            "namespace".to_string(),
            Value::String(namespace_id.to_string()),
        );
    }

    Ok(Value::Object(object))
}

/// Orders items and cuts the requested page. Returns the page and the total.
fn order_and_page(
    mut items: Vec<Value>,
    order: &[SortField],
    pagination: Option<PageRequest>,
) -> (Vec<Value>, usize) {
    if !order.is_empty() {
        items.sort_by(|a, b| {
            order
                .iter()
                .map(|field| field.compare(a, b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let total = items.len();
    let items = match pagination {
        Some(page) => page.apply(items),
        None => items,
    };
    (items, total)
}

fn not_found(resource_id: &str, namespace_id: &str, name: &str) -> AppError {
    AppError::not_found(format!(
        "{resource_id} '{name}' not found in namespace '{namespace_id}'"
    ))
}

#[async_trait]
impl ResourceBackend for MemoryBackend {
    fn scope(&self, resource_id: &str) -> Option<ResourceScope> {
        self.definitions.get(resource_id).map(|scope| *scope)
    }

    async fn get(&self, ctx: &ResourceProviderInput<GetInput>) -> AppResult<GetResult> {
        self.objects
            .get(&key(&ctx.resource_id, &ctx.namespace_id))
            .and_then(|bucket| bucket.get(&ctx.input.id).cloned())
            .map(|result| GetResult { result })
            .ok_or_else(|| not_found(&ctx.resource_id, &ctx.namespace_id, &ctx.input.id))
    }

    async fn list(&self, ctx: &ResourceProviderInput<ListInput>) -> AppResult<ListResult> {
        let items = self.snapshot(&ctx.resource_id, &ctx.namespace_id);
        let (result, total) = order_and_page(items, &ctx.input.order, ctx.input.pagination);
        Ok(ListResult { result, total })
    }

    async fn find(&self, ctx: &ResourceProviderInput<FindInput>) -> AppResult<FindResult> {
        let matches: Vec<Value> = self
            .snapshot(&ctx.resource_id, &ctx.namespace_id)
            .into_iter()
            .filter(|item| ctx.input.conditions.iter().all(|c| c.matches(item)))
            .collect();
        let (result, total) = order_and_page(matches, &ctx.input.order, ctx.input.pagination);
        Ok(FindResult { result, total })
    }

    async fn create(&self, ctx: &ResourceProviderInput<CreateInput>) -> AppResult<CreateResult> {
        let name = &ctx.input.name;
        let object = stamp(ctx.input.input.clone(), name, &ctx.namespace_id)?;

        // Events are queued under the bucket guard so they follow apply order.
        let mut bucket = self
            .objects
            .entry(key(&ctx.resource_id, &ctx.namespace_id))
            .or_default();
        if bucket.contains_key(name) {
            return Err(AppError::conflict(format!(
                "{} '{}' already exists in namespace '{}'",
                ctx.resource_id, name, ctx.namespace_id
            )));
        }
        bucket.insert(name.clone(), object.clone());
        self.emit(ChangeEvent::added(
            &ctx.resource_id,
            &ctx.namespace_id,
            name,
            object.clone(),
        ));
        drop(bucket);

        Ok(CreateResult { result: object })
    }

    async fn update(&self, ctx: &ResourceProviderInput<UpdateInput>) -> AppResult<UpdateResult> {
        let name = &ctx.input.id;
        let object = stamp(ctx.input.input.clone(), name, &ctx.namespace_id)?;

        let mut bucket = self
            .objects
            .get_mut(&key(&ctx.resource_id, &ctx.namespace_id))
            .ok_or_else(|| not_found(&ctx.resource_id, &ctx.namespace_id, name))?;
        let slot = bucket
            .get_mut(name)
            .ok_or_else(|| not_found(&ctx.resource_id, &ctx.namespace_id, name))?;
        let previous = std::mem::replace(slot, object.clone());
        self.emit(ChangeEvent::updated(
            &ctx.resource_id,
            &ctx.namespace_id,
            name,
            previous,
            object.clone(),
        ));
        drop(bucket);

        Ok(UpdateResult { result: object })
    }

    async fn delete(&self, ctx: &ResourceProviderInput<DeleteInput>) -> AppResult<DeleteResult> {
        let name = &ctx.input.id;
        let object_key = key(&ctx.resource_id, &ctx.namespace_id);

        let removed = {
            let mut bucket = self
                .objects
                .get_mut(&object_key)
                .ok_or_else(|| not_found(&ctx.resource_id, &ctx.namespace_id, name))?;
            let removed = bucket
                .remove(name)
                .ok_or_else(|| not_found(&ctx.resource_id, &ctx.namespace_id, name))?;
            self.emit(ChangeEvent::deleted(
                &ctx.resource_id,
                &ctx.namespace_id,
                name,
                removed.clone(),
            ));
            removed
        };
        self.objects.remove_if(&object_key, |_, bucket| bucket.is_empty());

        Ok(DeleteResult { result: removed })
    }
}
