//! Resource backend contract.
//!
//! A backend performs the actual CRUD work for the resource kinds it knows.
//! The provider facade validates requests against [`ResourceBackend::scope`]
//! and then calls exactly one backend method per operation.

pub mod memory;

use async_trait::async_trait;

use infraview_core::config::ResourceScope;
use infraview_core::operation::{
    CreateInput, CreateResult, DeleteInput, DeleteResult, FindInput, FindResult, GetInput,
    GetResult, ListInput, ListResult, UpdateInput, UpdateResult,
};
use infraview_core::{AppResult, OperationInput, OperationOutput, ResourceProviderInput};

pub use memory::MemoryBackend;

/// Operations a resource backend must provide.
#[async_trait]
pub trait ResourceBackend: Send + Sync + std::fmt::Debug {
    /// Returns the scope of a resource kind, or `None` if the kind is unknown.
    fn scope(&self, resource_id: &str) -> Option<ResourceScope>;

    /// Returns a single object.
    async fn get(&self, ctx: &ResourceProviderInput<GetInput>) -> AppResult<GetResult>;

    /// Lists objects in a namespace.
    async fn list(&self, ctx: &ResourceProviderInput<ListInput>) -> AppResult<ListResult>;

    /// Finds objects matching conditions.
    async fn find(&self, ctx: &ResourceProviderInput<FindInput>) -> AppResult<FindResult>;

    /// Creates an object.
    async fn create(&self, ctx: &ResourceProviderInput<CreateInput>) -> AppResult<CreateResult>;

    /// Updates an object.
    async fn update(&self, ctx: &ResourceProviderInput<UpdateInput>) -> AppResult<UpdateResult>;

    /// Deletes an object.
    async fn delete(&self, ctx: &ResourceProviderInput<DeleteInput>) -> AppResult<DeleteResult>;
}

/// Routes a tagged operation to the matching backend method.
pub async fn invoke(
    backend: &dyn ResourceBackend,
    ctx: ResourceProviderInput<OperationInput>,
) -> AppResult<OperationOutput> {
    let ResourceProviderInput {
        input,
        resource_id,
        namespace_id,
    } = ctx;

    match input {
        OperationInput::Get(input) => backend
            .get(&ResourceProviderInput::new(resource_id, namespace_id, input))
            .await
            .map(Into::into),
        OperationInput::List(input) => backend
            .list(&ResourceProviderInput::new(resource_id, namespace_id, input))
            .await
            .map(Into::into),
        OperationInput::Find(input) => backend
            .find(&ResourceProviderInput::new(resource_id, namespace_id, input))
            .await
            .map(Into::into),
        OperationInput::Create(input) => backend
            .create(&ResourceProviderInput::new(resource_id, namespace_id, input))
            .await
            .map(Into::into),
        OperationInput::Update(input) => backend
            .update(&ResourceProviderInput::new(resource_id, namespace_id, input))
            .await
            .map(Into::into),
        OperationInput::Delete(input) => backend
            .delete(&ResourceProviderInput::new(resource_id, namespace_id, input))
            .await
            .map(Into::into),
    }
}
