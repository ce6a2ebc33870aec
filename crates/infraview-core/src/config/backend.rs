//! Resource backend configuration.

use serde::{Deserialize, Serialize};

/// Whether a resource kind lives inside namespaces or at cluster scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceScope {
    /// Objects live inside a namespace; a namespace id is required.
    Namespaced,
    /// Objects are global; the namespace id may be empty.
    Cluster,
}

/// A resource kind served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource identifier, e.g. `events`.
    pub id: String,
    /// Scope of the resource kind.
    #[serde(default = "default_scope")]
    pub scope: ResourceScope,
}

impl ResourceDefinition {
    /// Creates a namespaced resource definition.
    pub fn namespaced(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope: ResourceScope::Namespaced,
        }
    }

    /// Creates a cluster-scoped resource definition.
    pub fn cluster(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope: ResourceScope::Cluster,
        }
    }
}

/// Backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Resource kinds the backend serves.
    #[serde(default = "default_resources")]
    pub resources: Vec<ResourceDefinition>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            resources: default_resources(),
        }
    }
}

fn default_scope() -> ResourceScope {
    ResourceScope::Namespaced
}

fn default_resources() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition::namespaced("events")]
}
