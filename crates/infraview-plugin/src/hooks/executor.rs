//! Hook executor: runs a bucket's hooks in registration order.
//!
//! Pre-hooks:
//! - Each hook receives the envelope produced by the previous one.
//! - The first `Halt` stops the chain and becomes a `HookAbort` error; the
//!   backend is never called.
//!
//! Post-hooks:
//! - Each hook receives the outcome produced by the previous one.
//! - The first `Override` stops the chain and its error is the final result.
//!
//! Every invocation is bounded by the configured timeout. A timed-out hook
//! counts as a failure of its phase.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use infraview_core::config::HookConfig;
use infraview_core::{
    AppError, AppResult, HookPhase, OperationInput, OperationKind, OperationOutput,
    ResourceProviderInput,
};

use super::definitions::{Hook, PostHookAction, PreHookAction};
use super::registry::HookRegistry;

/// Runs registered hooks around backend calls.
#[derive(Debug, Clone)]
pub struct HookExecutor {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Upper bound for a single hook invocation.
    timeout: Duration,
}

impl HookExecutor {
    /// Creates a new hook executor.
    pub fn new(registry: Arc<HookRegistry>, config: &HookConfig) -> Self {
        Self {
            registry,
            timeout: config.timeout(),
        }
    }

    /// Runs the pre-hooks for the envelope's operation kind.
    pub async fn run_pre(
        &self,
        ctx: ResourceProviderInput<OperationInput>,
    ) -> AppResult<ResourceProviderInput<OperationInput>> {
        let kind = ctx.input.kind();
        let hooks = self.registry.lookup(kind, HookPhase::Pre);
        if hooks.is_empty() {
            return Ok(ctx);
        }

        debug!(kind = %kind, hook_count = hooks.len(), "Running pre-hooks");

        let mut ctx = ctx;
        for entry in &hooks {
            let Hook::Pre(hook) = &entry.hook else {
                continue;
            };

            let action = match tokio::time::timeout(self.timeout, hook.run(ctx)).await {
                Ok(action) => action,
                Err(_) => PreHookAction::halt(format!(
                    "timed out after {} ms",
                    self.timeout.as_millis()
                )),
            };

            match action {
                PreHookAction::Continue(next) => {
                    ensure_kind(kind, next.input.kind(), entry.id())?;
                    ctx = next;
                }
                PreHookAction::Halt { reason } => {
                    debug!(
                        kind = %kind,
                        hook = %entry.id(),
                        reason = %reason,
                        "Pre-hook halted operation"
                    );
                    return Err(AppError::hook_abort(format!(
                        "Operation blocked by hook '{}': {}",
                        entry.id(),
                        reason
                    )));
                }
            }
        }

        Ok(ctx)
    }

    /// Runs the post-hooks for the envelope's operation kind over a backend outcome.
    pub async fn run_post(
        &self,
        outcome: AppResult<OperationOutput>,
        ctx: &ResourceProviderInput<OperationInput>,
    ) -> AppResult<OperationOutput> {
        let kind = ctx.input.kind();
        let hooks = self.registry.lookup(kind, HookPhase::Post);
        if hooks.is_empty() {
            return outcome;
        }

        debug!(kind = %kind, hook_count = hooks.len(), "Running post-hooks");

        let mut outcome = outcome;
        for entry in &hooks {
            let Hook::Post(hook) = &entry.hook else {
                continue;
            };

            let action = match tokio::time::timeout(self.timeout, hook.run(outcome, ctx)).await {
                Ok(action) => action,
                Err(_) => PostHookAction::override_with(format!(
                    "Post-hook '{}' timed out after {} ms",
                    entry.id(),
                    self.timeout.as_millis()
                )),
            };

            match action {
                PostHookAction::Continue(next) => {
                    if let Ok(output) = &next {
                        ensure_kind(kind, output.kind(), entry.id())?;
                    }
                    outcome = next;
                }
                PostHookAction::Override(err) => {
                    debug!(
                        kind = %kind,
                        hook = %entry.id(),
                        error = %err,
                        "Post-hook overrode result"
                    );
                    return Err(err);
                }
            }
        }

        outcome
    }
}

/// A hook may rewrite an operation's data but never its kind.
fn ensure_kind(expected: OperationKind, actual: OperationKind, hook: &str) -> AppResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(AppError::internal(format!(
            "Hook '{hook}' changed operation kind from {expected} to {actual}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use infraview_core::ErrorKind;
    use infraview_core::operation::{GetInput, GetResult};

    use super::*;
    use crate::hooks::definitions::{PostHook, PreHook};

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Debug)]
    struct Recorder {
        name: &'static str,
        log: Log,
        halt: bool,
    }

    #[async_trait]
    impl PreHook for Recorder {
        async fn run(&self, mut ctx: ResourceProviderInput<OperationInput>) -> PreHookAction {
            self.log.lock().unwrap().push(self.name.to_string());
            if self.halt {
                return PreHookAction::halt("denied");
            }
            if let OperationInput::Get(input) = &mut ctx.input {
                input.id.push_str(self.name);
            }
            PreHookAction::Continue(ctx)
        }
    }

    #[async_trait]
    impl PostHook for Recorder {
        async fn run(
            &self,
            outcome: AppResult<OperationOutput>,
            _ctx: &ResourceProviderInput<OperationInput>,
        ) -> PostHookAction {
            self.log.lock().unwrap().push(self.name.to_string());
            if self.halt {
                return PostHookAction::override_with(format!("{} rejected", self.name));
            }
            PostHookAction::Continue(outcome)
        }
    }

    #[derive(Debug)]
    struct Sleeper;

    #[async_trait]
    impl PreHook for Sleeper {
        async fn run(&self, ctx: ResourceProviderInput<OperationInput>) -> PreHookAction {
            tokio::time::sleep(Duration::from_secs(60)).await;
            PreHookAction::Continue(ctx)
        }
    }

    #[derive(Debug)]
    struct KindSwapper;

    #[async_trait]
    impl PreHook for KindSwapper {
        async fn run(&self, ctx: ResourceProviderInput<OperationInput>) -> PreHookAction {
            PreHookAction::Continue(ctx.map(|_| OperationInput::Delete(Default::default())))
        }
    }

    fn recorder(name: &'static str, log: &Log, halt: bool) -> Recorder {
        Recorder {
            name,
            log: log.clone(),
            halt,
        }
    }

    fn executor(registry: &Arc<HookRegistry>) -> HookExecutor {
        HookExecutor::new(registry.clone(), &HookConfig { timeout_ms: 100 })
    }

    fn get_ctx() -> ResourceProviderInput<OperationInput> {
        ResourceProviderInput::new("events", "default", OperationInput::Get(GetInput::default()))
    }

    #[tokio::test]
    async fn test_pre_hooks_chain_in_order() {
        let registry = Arc::new(HookRegistry::new());
        let log = Log::default();
        for name in ["a", "b", "c"] {
            registry
                .register(OperationKind::Get, name, Hook::pre(recorder(name, &log, false)))
                .unwrap();
        }

        let ctx = executor(&registry).run_pre(get_ctx()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(ctx.input, OperationInput::Get(GetInput { id: "abc".into() }));
    }

    #[tokio::test]
    async fn test_pre_hook_halt_skips_rest() {
        let registry = Arc::new(HookRegistry::new());
        let log = Log::default();
        registry
            .register(OperationKind::Get, "h1", Hook::pre(recorder("h1", &log, false)))
            .unwrap();
        registry
            .register(OperationKind::Get, "h2", Hook::pre(recorder("h2", &log, true)))
            .unwrap();
        registry
            .register(OperationKind::Get, "h3", Hook::pre(recorder("h3", &log, false)))
            .unwrap();

        let err = executor(&registry).run_pre(get_ctx()).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::HookAbort);
        assert!(err.message.contains("'h2'"));
        assert_eq!(*log.lock().unwrap(), vec!["h1", "h2"]);
    }

    #[tokio::test]
    async fn test_post_hook_override_skips_rest() {
        let registry = Arc::new(HookRegistry::new());
        let log = Log::default();
        registry
            .register(OperationKind::Get, "h1", Hook::post(recorder("h1", &log, false)))
            .unwrap();
        registry
            .register(OperationKind::Get, "h2", Hook::post(recorder("h2", &log, true)))
            .unwrap();
        registry
            .register(OperationKind::Get, "h3", Hook::post(recorder("h3", &log, false)))
            .unwrap();

        let outcome = Ok(OperationOutput::Get(GetResult {
            result: json!({"ok": true}),
        }));
        let err = executor(&registry)
            .run_post(outcome, &get_ctx())
            .await
            .unwrap_err();

        assert_eq!(err, AppError::hook_override("h2 rejected"));
        assert_eq!(*log.lock().unwrap(), vec!["h1", "h2"]);
    }

    #[tokio::test]
    async fn test_post_hooks_see_backend_error() {
        let registry = Arc::new(HookRegistry::new());
        let log = Log::default();
        registry
            .register(OperationKind::Get, "h1", Hook::post(recorder("h1", &log, false)))
            .unwrap();

        let err = executor(&registry)
            .run_post(Err(AppError::backend("down")), &get_ctx())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Backend);
        assert_eq!(*log.lock().unwrap(), vec!["h1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pre_hook_timeout_aborts() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register(OperationKind::Get, "slow", Hook::pre(Sleeper))
            .unwrap();

        let err = executor(&registry).run_pre(get_ctx()).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::HookAbort);
        assert!(err.message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_pre_hook_cannot_change_kind() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register(OperationKind::Get, "swap", Hook::pre(KindSwapper))
            .unwrap();

        let err = executor(&registry).run_pre(get_ctx()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
