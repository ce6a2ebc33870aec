//! Hook system: registry, executor, and hook definitions.

pub mod definitions;
pub mod executor;
pub mod registry;

pub use definitions::{
    Hook, HookRegistration, PostHook, PostHookAction, PreHook, PreHookAction, RegisteredHook,
};
pub use executor::HookExecutor;
pub use registry::HookRegistry;
