//! Operation data model shared by the resource facade and the hook pipeline.
//!
//! Each CRUD operation has a strongly typed input and result. The closed
//! unions [`OperationInput`] and [`OperationOutput`] carry them through the
//! hook registry, which stores hooks per [`OperationKind`] and [`HookPhase`].
//! [`OperationPayload`] links every typed input back to its kind and result
//! so callers can register typed hooks without matching on the unions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FilterField, PageRequest, SortField};

/// The closed set of resource operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Fetch a single resource.
    Get,
    /// List resources in a namespace.
    List,
    /// Find resources matching conditions.
    Find,
    /// Create a resource.
    Create,
    /// Update an existing resource.
    Update,
    /// Delete an existing resource.
    Delete,
}

impl OperationKind {
    /// All operation kinds, in declaration order.
    pub const ALL: [OperationKind; 6] = [
        Self::Get,
        Self::List,
        Self::Find,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    /// Returns the string name of this operation kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Find => "find",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// When a hook runs relative to the backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPhase {
    /// Before the backend is invoked.
    Pre,
    /// After the backend returned.
    Post,
}

impl HookPhase {
    /// Returns the string name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity envelope carried by every operation and hook invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceProviderInput<I> {
    /// The operation specific input.
    pub input: I,
    /// Resource kind, e.g. `events`.
    pub resource_id: String,
    /// Namespace scope. Empty for cluster scope.
    pub namespace_id: String,
}

impl<I> ResourceProviderInput<I> {
    /// Creates a new envelope.
    pub fn new(resource_id: impl Into<String>, namespace_id: impl Into<String>, input: I) -> Self {
        Self {
            input,
            resource_id: resource_id.into(),
            namespace_id: namespace_id.into(),
        }
    }

    /// Replaces the inner input, keeping the identity tuple.
    pub fn map<J>(self, f: impl FnOnce(I) -> J) -> ResourceProviderInput<J> {
        ResourceProviderInput {
            input: f(self.input),
            resource_id: self.resource_id,
            namespace_id: self.namespace_id,
        }
    }

    /// Returns whether this envelope targets cluster scope.
    pub fn is_cluster_scoped(&self) -> bool {
        self.namespace_id.is_empty()
    }
}

// ── Inputs ──

/// Input for a get operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetInput {
    /// Name of the resource object.
    pub id: String,
}

/// Input for a list operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListInput {
    /// Ordering applied before pagination.
    #[serde(default)]
    pub order: Vec<SortField>,
    /// Page window. `None` returns everything.
    #[serde(default)]
    pub pagination: Option<PageRequest>,
}

/// Input for a find operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindInput {
    /// Conditions an object must satisfy, combined with AND.
    #[serde(default)]
    pub conditions: Vec<FilterField>,
    /// Ordering applied before pagination.
    #[serde(default)]
    pub order: Vec<SortField>,
    /// Page window. `None` returns every match.
    #[serde(default)]
    pub pagination: Option<PageRequest>,
}

/// Input for a create operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateInput {
    /// Name of the object to create.
    pub name: String,
    /// Object body.
    #[serde(default)]
    pub input: Value,
}

/// Input for an update operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateInput {
    /// Name of the object to update.
    pub id: String,
    /// Replacement object body.
    #[serde(default)]
    pub input: Value,
}

/// Input for a delete operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteInput {
    /// Name of the object to delete.
    pub id: String,
}

// ── Results ──

/// Result of a get operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResult {
    /// The object.
    pub result: Value,
}

/// Result of a list operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    /// Objects on the requested page.
    pub result: Vec<Value>,
    /// Number of objects before pagination.
    pub total: usize,
}

/// Result of a find operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindResult {
    /// Matching objects on the requested page.
    pub result: Vec<Value>,
    /// Number of matches before pagination.
    pub total: usize,
}

/// Result of a create operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateResult {
    /// The stored object.
    pub result: Value,
}

/// Result of an update operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// The stored object after the update.
    pub result: Value,
}

/// Result of a delete operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// The object as it was before deletion.
    pub result: Value,
}

/// Operation input tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "input", rename_all = "snake_case")]
pub enum OperationInput {
    /// Get input.
    Get(GetInput),
    /// List input.
    List(ListInput),
    /// Find input.
    Find(FindInput),
    /// Create input.
    Create(CreateInput),
    /// Update input.
    Update(UpdateInput),
    /// Delete input.
    Delete(DeleteInput),
}

/// Operation result tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum OperationOutput {
    /// Get result.
    Get(GetResult),
    /// List result.
    List(ListResult),
    /// Find result.
    Find(FindResult),
    /// Create result.
    Create(CreateResult),
    /// Update result.
    Update(UpdateResult),
    /// Delete result.
    Delete(DeleteResult),
}

impl OperationInput {
    /// Returns the operation kind of this input.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Get(_) => OperationKind::Get,
            Self::List(_) => OperationKind::List,
            Self::Find(_) => OperationKind::Find,
            Self::Create(_) => OperationKind::Create,
            Self::Update(_) => OperationKind::Update,
            Self::Delete(_) => OperationKind::Delete,
        }
    }
}

impl OperationOutput {
    /// Returns the operation kind of this result.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Get(_) => OperationKind::Get,
            Self::List(_) => OperationKind::List,
            Self::Find(_) => OperationKind::Find,
            Self::Create(_) => OperationKind::Create,
            Self::Update(_) => OperationKind::Update,
            Self::Delete(_) => OperationKind::Delete,
        }
    }
}

/// Links a typed operation input to its kind, its result type, and the
/// matching variants of [`OperationInput`] and [`OperationOutput`].
pub trait OperationPayload: Clone + Send + Sync + 'static {
    /// The typed result produced by this operation.
    type Output: Clone + Send + Sync + 'static;

    /// The operation kind this input belongs to.
    const KIND: OperationKind;

    /// Wraps the typed input into the tagged union.
    fn into_input(self) -> OperationInput;

    /// Extracts the typed input. Returns the union back on a kind mismatch.
    fn from_input(input: OperationInput) -> Result<Self, OperationInput>;

    /// Wraps the typed result into the tagged union.
    fn into_output(output: Self::Output) -> OperationOutput;

    /// Extracts the typed result. Returns the union back on a kind mismatch.
    fn from_output(output: OperationOutput) -> Result<Self::Output, OperationOutput>;
}

/// Implements [`OperationPayload`] for an input/result pair.
macro_rules! operation_payload {
    ($variant:ident, $input:ty, $output:ty) => {
        impl OperationPayload for $input {
            type Output = $output;

            const KIND: OperationKind = OperationKind::$variant;

            fn into_input(self) -> OperationInput {
                OperationInput::$variant(self)
            }

            fn from_input(input: OperationInput) -> Result<Self, OperationInput> {
                match input {
                    OperationInput::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }

            fn into_output(output: Self::Output) -> OperationOutput {
                OperationOutput::$variant(output)
            }

            fn from_output(output: OperationOutput) -> Result<Self::Output, OperationOutput> {
                match output {
                    OperationOutput::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }

        impl From<$input> for OperationInput {
            fn from(input: $input) -> Self {
                OperationInput::$variant(input)
            }
        }

        impl From<$output> for OperationOutput {
            fn from(output: $output) -> Self {
                OperationOutput::$variant(output)
            }
        }
    };
}

operation_payload!(Get, GetInput, GetResult);
operation_payload!(List, ListInput, ListResult);
operation_payload!(Find, FindInput, FindResult);
operation_payload!(Create, CreateInput, CreateResult);
operation_payload!(Update, UpdateInput, UpdateResult);
operation_payload!(Delete, DeleteInput, DeleteResult);
