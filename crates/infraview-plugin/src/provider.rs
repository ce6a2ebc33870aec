//! Resource provider: the six CRUD entry points.
//!
//! Every call validates the identity tuple, runs the pre-hooks, invokes the
//! backend with the (possibly rewritten) input, then runs the post-hooks
//! over the backend outcome.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use infraview_core::config::{HookConfig, ResourceScope};
use infraview_core::operation::{
    CreateInput, CreateResult, DeleteInput, DeleteResult, FindInput, FindResult, GetInput,
    GetResult, ListInput, ListResult, UpdateInput, UpdateResult,
};
use infraview_core::{AppError, AppResult, OperationKind, OperationPayload, ResourceProviderInput};

use crate::backend::{self, ResourceBackend};
use crate::hooks::definitions::{Hook, HookRegistration, PostHookAction, PreHookAction};
use crate::hooks::executor::HookExecutor;
use crate::hooks::registry::HookRegistry;
use crate::traits::{TypedPostHook, TypedPreHook};

/// Hook-wrapped access to a resource backend.
#[derive(Debug, Clone)]
pub struct ResourceProvider {
    /// The resource backend.
    backend: Arc<dyn ResourceBackend>,
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Hook executor.
    executor: HookExecutor,
}

impl ResourceProvider {
    /// Creates a provider with an empty hook registry.
    pub fn new(backend: Arc<dyn ResourceBackend>, config: &HookConfig) -> Self {
        Self::with_registry(backend, Arc::new(HookRegistry::new()), config)
    }

    /// Creates a provider sharing an existing hook registry.
    pub fn with_registry(
        backend: Arc<dyn ResourceBackend>,
        registry: Arc<HookRegistry>,
        config: &HookConfig,
    ) -> Self {
        let executor = HookExecutor::new(registry.clone(), config);
        Self {
            backend,
            registry,
            executor,
        }
    }

    /// Returns a single resource in the given namespace.
    pub async fn get(
        &self,
        resource_id: &str,
        namespace_id: &str,
        input: GetInput,
    ) -> AppResult<GetResult> {
        self.execute(resource_id, namespace_id, input).await
    }

    /// Lists resources in the given namespace.
    pub async fn list(
        &self,
        resource_id: &str,
        namespace_id: &str,
        input: ListInput,
    ) -> AppResult<ListResult> {
        self.execute(resource_id, namespace_id, input).await
    }

    /// Returns the resources in the given namespace matching a set of conditions.
    pub async fn find(
        &self,
        resource_id: &str,
        namespace_id: &str,
        input: FindInput,
    ) -> AppResult<FindResult> {
        self.execute(resource_id, namespace_id, input).await
    }

    /// Creates a resource in the given namespace.
    pub async fn create(
        &self,
        resource_id: &str,
        namespace_id: &str,
        input: CreateInput,
    ) -> AppResult<CreateResult> {
        self.execute(resource_id, namespace_id, input).await
    }

    /// Updates an existing resource in the given namespace.
    pub async fn update(
        &self,
        resource_id: &str,
        namespace_id: &str,
        input: UpdateInput,
    ) -> AppResult<UpdateResult> {
        self.execute(resource_id, namespace_id, input).await
    }

    /// Deletes an existing resource in the given namespace.
    pub async fn delete(
        &self,
        resource_id: &str,
        namespace_id: &str,
        input: DeleteInput,
    ) -> AppResult<DeleteResult> {
        self.execute(resource_id, namespace_id, input).await
    }

    /// Runs any operation through validation, hooks and the backend.
    pub async fn execute<I: OperationPayload>(
        &self,
        resource_id: &str,
        namespace_id: &str,
        input: I,
    ) -> AppResult<I::Output> {
        let ctx = ResourceProviderInput::new(resource_id, namespace_id, input.into_input());
        self.validate(&ctx)?;

        // Pre-hooks may rewrite the identity; the backend only sees valid ones.
        let ctx = self.executor.run_pre(ctx).await?;
        self.validate(&ctx)?;

        debug!(
            kind = %I::KIND,
            resource = %ctx.resource_id,
            namespace = %ctx.namespace_id,
            "Invoking backend"
        );
        let outcome = backend::invoke(self.backend.as_ref(), ctx.clone()).await;

        let output = self.executor.run_post(outcome, &ctx).await?;
        I::from_output(output).map_err(|other| {
            AppError::internal(format!(
                "{} operation produced a {} result",
                I::KIND,
                other.kind()
            ))
        })
    }

    fn validate<T>(&self, ctx: &ResourceProviderInput<T>) -> AppResult<()> {
        let resource_id = &ctx.resource_id;
        if resource_id.trim().is_empty() {
            return Err(AppError::validation("Resource id must not be empty"));
        }

        match self.backend.scope(resource_id) {
            None => Err(AppError::validation(format!(
                "Unknown resource '{resource_id}'"
            ))),
            Some(ResourceScope::Namespaced) if ctx.is_cluster_scoped() => {
                Err(AppError::validation(format!(
                    "Resource '{resource_id}' is namespaced; a namespace id is required"
                )))
            }
            Some(_) => Ok(()),
        }
    }

    /// Registers a hook of either phase for an operation kind.
    pub fn register_hook(
        &self,
        kind: OperationKind,
        id: impl Into<String>,
        hook: Hook,
    ) -> AppResult<HookRegistration> {
        self.registry.register(kind, id, hook)
    }

    /// Registers a closure pre-hook over a typed input, e.g. `CreateInput`.
    pub fn register_pre_hook<I, F, Fut>(
        &self,
        id: impl Into<String>,
        handler: F,
    ) -> AppResult<HookRegistration>
    where
        I: OperationPayload,
        F: Fn(ResourceProviderInput<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PreHookAction<I>> + Send + 'static,
    {
        self.registry
            .register(I::KIND, id, Hook::pre(TypedPreHook::<I>::new(handler)))
    }

    /// Registers a closure post-hook over a typed result, keyed by its input type.
    pub fn register_post_hook<I, F, Fut>(
        &self,
        id: impl Into<String>,
        handler: F,
    ) -> AppResult<HookRegistration>
    where
        I: OperationPayload,
        F: Fn(AppResult<I::Output>, ResourceProviderInput<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PostHookAction<I::Output>> + Send + 'static,
    {
        self.registry
            .register(I::KIND, id, Hook::post(TypedPostHook::<I>::new(handler)))
    }

    /// Returns the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}
