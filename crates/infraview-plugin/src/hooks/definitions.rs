//! Hook traits, hook actions, and registration records.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use infraview_core::{
    AppError, AppResult, HookPhase, OperationInput, OperationKind, OperationOutput,
    ResourceProviderInput,
};

/// What a pre-hook tells the executor to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum PreHookAction<I = OperationInput> {
    /// Continue with the given, possibly rewritten, input.
    Continue(ResourceProviderInput<I>),
    /// Halt the chain; the backend is never invoked.
    Halt {
        /// Reason reported to the caller.
        reason: String,
    },
}

impl<I> PreHookAction<I> {
    /// Creates a halt action.
    pub fn halt(reason: impl Into<String>) -> Self {
        Self::Halt {
            reason: reason.into(),
        }
    }
}

/// What a post-hook tells the executor to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum PostHookAction<R = OperationOutput> {
    /// Continue with the given, possibly rewritten, outcome.
    Continue(AppResult<R>),
    /// Stop the chain and replace the outcome with this error.
    Override(AppError),
}

impl<R> PostHookAction<R> {
    /// Creates an override action carrying a [`AppError::hook_override`] error.
    pub fn override_with(reason: impl Into<String>) -> Self {
        Self::Override(AppError::hook_override(reason))
    }
}

/// A hook run before the backend call.
///
/// The hook owns the envelope for the duration of the call and hands it
/// back through [`PreHookAction::Continue`], so rewrites chain naturally.
#[async_trait]
pub trait PreHook: Send + Sync + fmt::Debug {
    /// Runs the hook.
    async fn run(&self, ctx: ResourceProviderInput<OperationInput>) -> PreHookAction;
}

/// A hook run after the backend call.
#[async_trait]
pub trait PostHook: Send + Sync + fmt::Debug {
    /// Runs the hook against the current outcome and the input the backend saw.
    async fn run(
        &self,
        outcome: AppResult<OperationOutput>,
        ctx: &ResourceProviderInput<OperationInput>,
    ) -> PostHookAction;
}

/// A hook of either phase. The variant fixes the phase for the hook's lifetime.
#[derive(Debug, Clone)]
pub enum Hook {
    /// A pre-hook.
    Pre(Arc<dyn PreHook>),
    /// A post-hook.
    Post(Arc<dyn PostHook>),
}

impl Hook {
    /// Wraps a pre-hook.
    pub fn pre(hook: impl PreHook + 'static) -> Self {
        Self::Pre(Arc::new(hook))
    }

    /// Wraps a post-hook.
    pub fn post(hook: impl PostHook + 'static) -> Self {
        Self::Post(Arc::new(hook))
    }

    /// Returns the phase this hook runs in.
    pub fn phase(&self) -> HookPhase {
        match self {
            Self::Pre(_) => HookPhase::Pre,
            Self::Post(_) => HookPhase::Post,
        }
    }
}

/// Identity of a registered hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookRegistration {
    /// Operation the hook is attached to.
    pub kind: OperationKind,
    /// Phase the hook runs in.
    pub phase: HookPhase,
    /// Identifier, unique within its kind/phase bucket.
    pub id: String,
}

impl fmt::Display for HookRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.phase, self.id)
    }
}

/// A hook together with its registration record.
#[derive(Debug, Clone)]
pub struct RegisteredHook {
    /// Registration identity.
    pub registration: HookRegistration,
    /// The hook itself.
    pub hook: Hook,
}

impl RegisteredHook {
    /// Returns the hook id.
    pub fn id(&self) -> &str {
        &self.registration.id
    }
}
