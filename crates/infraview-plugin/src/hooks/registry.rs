//! Hook registry: hooks are filed per operation kind and phase, in
//! registration order.
//!
//! Each `(kind, phase)` bucket is guarded by its own map shard, so
//! registering a create hook never contends with lookups for get hooks.
//! Ids are unique within a bucket; registering a taken id is rejected.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use infraview_core::{AppError, AppResult, HookPhase, OperationKind};

use super::definitions::{Hook, HookRegistration, RegisteredHook};

/// Bucket key.
type HookKey = (OperationKind, HookPhase);

/// Registry of hooks organized by operation kind and phase.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// (kind, phase) → hooks in FIFO registration order.
    buckets: DashMap<HookKey, Vec<RegisteredHook>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Registers a hook for an operation kind. The phase is taken from the hook.
    ///
    /// Fails with [`infraview_core::ErrorKind::DuplicateHook`] when the id is
    /// already registered for the same kind and phase; the existing hook stays.
    pub fn register(
        &self,
        kind: OperationKind,
        id: impl Into<String>,
        hook: Hook,
    ) -> AppResult<HookRegistration> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AppError::validation("Hook id must not be empty"));
        }

        let registration = HookRegistration {
            kind,
            phase: hook.phase(),
            id,
        };

        let mut entries = self
            .buckets
            .entry((registration.kind, registration.phase))
            .or_default();

        if entries.iter().any(|e| e.registration.id == registration.id) {
            return Err(AppError::duplicate_hook(format!(
                "Hook '{}' is already registered for {} {}",
                registration.id, registration.phase, registration.kind
            )));
        }

        entries.push(RegisteredHook {
            registration: registration.clone(),
            hook,
        });
        let position = entries.len();
        drop(entries);

        info!(
            kind = %registration.kind,
            phase = %registration.phase,
            hook = %registration.id,
            position = position,
            "Hook registered"
        );

        Ok(registration)
    }

    /// Removes a hook. Returns whether it was present.
    pub fn unregister(&self, kind: OperationKind, phase: HookPhase, id: &str) -> bool {
        let Entry::Occupied(mut bucket) = self.buckets.entry((kind, phase)) else {
            return false;
        };

        let before = bucket.get().len();
        bucket.get_mut().retain(|e| e.registration.id != id);
        let removed = bucket.get().len() != before;

        if bucket.get().is_empty() {
            bucket.remove();
        }

        if removed {
            info!(kind = %kind, phase = %phase, hook = %id, "Hook unregistered");
        }
        removed
    }

    /// Returns the hooks for a kind and phase in registration order.
    ///
    /// The returned list is a snapshot; registrations made afterwards do not
    /// affect an executor already iterating it.
    pub fn lookup(&self, kind: OperationKind, phase: HookPhase) -> Vec<RegisteredHook> {
        self.buckets
            .get(&(kind, phase))
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Returns whether a hook id is registered for a kind and phase.
    pub fn contains(&self, kind: OperationKind, phase: HookPhase, id: &str) -> bool {
        self.buckets
            .get(&(kind, phase))
            .map(|entries| entries.iter().any(|e| e.registration.id == id))
            .unwrap_or(false)
    }

    /// Returns the number of hooks registered for a kind and phase.
    pub fn hook_count(&self, kind: OperationKind, phase: HookPhase) -> usize {
        self.buckets
            .get(&(kind, phase))
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Returns every non-empty bucket, ordered by kind then phase.
    pub fn registered_buckets(&self) -> Vec<(OperationKind, HookPhase)> {
        OperationKind::ALL
            .into_iter()
            .flat_map(|kind| [(kind, HookPhase::Pre), (kind, HookPhase::Post)])
            .filter(|key| self.buckets.contains_key(key))
            .collect()
    }
}
