//! Common imports for hook authors and backend implementers.

pub use infraview_core::operation::{
    CreateInput, CreateResult, DeleteInput, DeleteResult, FindInput, FindResult, GetInput,
    GetResult, ListInput, ListResult, UpdateInput, UpdateResult,
};
pub use infraview_core::{
    AppError, AppResult, ErrorKind, HookPhase, OperationInput, OperationKind, OperationOutput,
    ResourceProviderInput,
};

pub use crate::backend::ResourceBackend;
pub use crate::hooks::definitions::{Hook, PostHook, PostHookAction, PreHook, PreHookAction};
pub use crate::provider::ResourceProvider;
