//! Typed closure hooks.
//!
//! Hook authors usually care about one operation. These adapters let them
//! write a closure over the typed input (`CreateInput`, `ListResult`, ...)
//! and take care of unwrapping and rewrapping the tagged unions the
//! registry works with.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use infraview_core::{
    AppError, AppResult, OperationInput, OperationOutput, OperationPayload, ResourceProviderInput,
};

use crate::hooks::definitions::{PostHook, PostHookAction, PreHook, PreHookAction};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type PreHookFn<I> =
    Arc<dyn Fn(ResourceProviderInput<I>) -> BoxFuture<PreHookAction<I>> + Send + Sync>;

type PostHookFn<I> = Arc<
    dyn Fn(
            AppResult<<I as OperationPayload>::Output>,
            ResourceProviderInput<I>,
        ) -> BoxFuture<PostHookAction<<I as OperationPayload>::Output>>
        + Send
        + Sync,
>;

/// A pre-hook built from a closure over a typed operation input.
pub struct TypedPreHook<I: OperationPayload> {
    /// Handler function.
    handler: PreHookFn<I>,
    _marker: PhantomData<fn(I)>,
}

impl<I: OperationPayload> TypedPreHook<I> {
    /// Creates a new typed pre-hook.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(ResourceProviderInput<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PreHookAction<I>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |ctx| Box::pin(handler(ctx))),
            _marker: PhantomData,
        }
    }
}

impl<I: OperationPayload> fmt::Debug for TypedPreHook<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedPreHook")
            .field("kind", &I::KIND)
            .field("handler", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl<I: OperationPayload> PreHook for TypedPreHook<I> {
    async fn run(&self, ctx: ResourceProviderInput<OperationInput>) -> PreHookAction {
        let ResourceProviderInput {
            input,
            resource_id,
            namespace_id,
        } = ctx;

        let input = match I::from_input(input) {
            Ok(input) => input,
            Err(other) => {
                return PreHookAction::halt(format!(
                    "hook expects {} input, got {}",
                    I::KIND,
                    other.kind()
                ));
            }
        };

        let typed = ResourceProviderInput {
            input,
            resource_id,
            namespace_id,
        };

        match (self.handler)(typed).await {
            PreHookAction::Continue(next) => PreHookAction::Continue(next.map(I::into_input)),
            PreHookAction::Halt { reason } => PreHookAction::Halt { reason },
        }
    }
}

/// A post-hook built from a closure over a typed operation result.
pub struct TypedPostHook<I: OperationPayload> {
    /// Handler function.
    handler: PostHookFn<I>,
    _marker: PhantomData<fn(I)>,
}

impl<I: OperationPayload> TypedPostHook<I> {
    /// Creates a new typed post-hook.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(AppResult<I::Output>, ResourceProviderInput<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PostHookAction<I::Output>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |outcome, ctx| Box::pin(handler(outcome, ctx))),
            _marker: PhantomData,
        }
    }
}

impl<I: OperationPayload> fmt::Debug for TypedPostHook<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedPostHook")
            .field("kind", &I::KIND)
            .field("handler", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl<I: OperationPayload> PostHook for TypedPostHook<I> {
    async fn run(
        &self,
        outcome: AppResult<OperationOutput>,
        ctx: &ResourceProviderInput<OperationInput>,
    ) -> PostHookAction {
        let input = match I::from_input(ctx.input.clone()) {
            Ok(input) => input,
            Err(other) => {
                return PostHookAction::Override(AppError::internal(format!(
                    "hook expects {} input, got {}",
                    I::KIND,
                    other.kind()
                )));
            }
        };

        let outcome = match outcome {
            Ok(output) => match I::from_output(output) {
                Ok(typed) => Ok(typed),
                Err(other) => {
                    return PostHookAction::Override(AppError::internal(format!(
                        "hook expects {} result, got {}",
                        I::KIND,
                        other.kind()
                    )));
                }
            },
            Err(err) => Err(err),
        };

        let typed = ResourceProviderInput::new(ctx.resource_id.clone(), ctx.namespace_id.clone(), input);

        match (self.handler)(outcome, typed).await {
            PostHookAction::Continue(next) => PostHookAction::Continue(next.map(I::into_output)),
            PostHookAction::Override(err) => PostHookAction::Override(err),
        }
    }
}
