//! # infraview-plugin
//!
//! Resource plugin layer for InfraView. Provides:
//!
//! - The resource provider facade (get, list, find, create, update, delete)
//! - Hook registry keyed by operation kind and phase
//! - Hook executor with Continue/Halt (pre) and Continue/Override (post) semantics
//! - Typed closure adapters for writing hooks against one operation
//! - The resource backend contract and an in-memory backend

pub mod backend;
pub mod hooks;
pub mod prelude;
pub mod provider;
pub mod traits;

pub use backend::{MemoryBackend, ResourceBackend};
pub use hooks::executor::HookExecutor;
pub use hooks::registry::HookRegistry;
pub use provider::ResourceProvider;
