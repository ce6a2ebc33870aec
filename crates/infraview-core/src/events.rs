//! Resource change events and the informer messages built from them.
//!
//! A backend reports every mutation it observes as a [`ChangeEvent`]. The
//! informer turns subscribed events into [`InformerMessage`] values and
//! pushes them to the host on one channel per [`InformerAction`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of change kinds a subscriber may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InformerAction {
    /// An object was created.
    Added,
    /// An object was modified.
    Updated,
    /// An object was removed.
    Deleted,
}

impl InformerAction {
    /// All informer actions.
    pub const ALL: [InformerAction; 3] = [Self::Added, Self::Updated, Self::Deleted];

    /// Returns the string name of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for InformerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of an [`InformerAction::Added`] message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformerAddPayload {
    /// Name of the object.
    pub id: String,
    /// The new object.
    pub data: Value,
}

/// Payload of an [`InformerAction::Updated`] message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformerUpdatePayload {
    /// Name of the object.
    pub id: String,
    /// The object before the change.
    pub old_data: Value,
    /// The object after the change.
    pub new_data: Value,
}

/// Payload of an [`InformerAction::Deleted`] message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformerDeletePayload {
    /// Name of the object.
    pub id: String,
    /// The object as it was before deletion.
    pub data: Value,
}

/// A message delivered to the host on an informer channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformerMessage<T> {
    /// Resource kind that changed.
    pub resource_id: String,
    /// Namespace of the changed object.
    pub namespace_id: String,
    /// Change kind.
    pub action: InformerAction,
    /// Action specific payload.
    pub payload: T,
    /// When the message was built.
    pub timestamp: DateTime<Utc>,
}

/// A change observed by a resource backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// An object was created.
    Added {
        /// Resource kind.
        resource_id: String,
        /// Namespace of the object.
        namespace_id: String,
        /// Created object.
        payload: InformerAddPayload,
    },
    /// An object was modified.
    Updated {
        /// Resource kind.
        resource_id: String,
        /// Namespace of the object.
        namespace_id: String,
        /// Old and new object.
        payload: InformerUpdatePayload,
    },
    /// An object was removed.
    Deleted {
        /// Resource kind.
        resource_id: String,
        /// Namespace of the object.
        namespace_id: String,
        /// Removed object.
        payload: InformerDeletePayload,
    },
}

impl ChangeEvent {
    /// Builds an add event.
    pub fn added(
        resource_id: impl Into<String>,
        namespace_id: impl Into<String>,
        id: impl Into<String>,
        data: Value,
    ) -> Self {
        Self::Added {
            resource_id: resource_id.into(),
            namespace_id: namespace_id.into(),
            payload: InformerAddPayload {
                id: id.into(),
                data,
            },
        }
    }

    /// Builds an update event.
    pub fn updated(
        resource_id: impl Into<String>,
        namespace_id: impl Into<String>,
        id: impl Into<String>,
        old_data: Value,
        new_data: Value,
    ) -> Self {
        Self::Updated {
            resource_id: resource_id.into(),
            namespace_id: namespace_id.into(),
            payload: InformerUpdatePayload {
                id: id.into(),
                old_data,
                new_data,
            },
        }
    }

    /// Builds a delete event.
    pub fn deleted(
        resource_id: impl Into<String>,
        namespace_id: impl Into<String>,
        id: impl Into<String>,
        data: Value,
    ) -> Self {
        Self::Deleted {
            resource_id: resource_id.into(),
            namespace_id: namespace_id.into(),
            payload: InformerDeletePayload {
                id: id.into(),
                data,
            },
        }
    }

    /// Returns the informer action this event maps to.
    pub fn action(&self) -> InformerAction {
        match self {
            Self::Added { .. } => InformerAction::Added,
            Self::Updated { .. } => InformerAction::Updated,
            Self::Deleted { .. } => InformerAction::Deleted,
        }
    }

    /// Returns the resource kind of the changed object.
    pub fn resource_id(&self) -> &str {
        match self {
            Self::Added { resource_id, .. }
            | Self::Updated { resource_id, .. }
            | Self::Deleted { resource_id, .. } => resource_id,
        }
    }

    /// Returns the namespace of the changed object.
    pub fn namespace_id(&self) -> &str {
        match self {
            Self::Added { namespace_id, .. }
            | Self::Updated { namespace_id, .. }
            | Self::Deleted { namespace_id, .. } => namespace_id,
        }
    }
}
