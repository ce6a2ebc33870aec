//! # infraview-core
//!
//! Core crate for the InfraView resource plugin layer. Contains the
//! operation data model shared by the hook pipeline and the resource
//! facade, the change events consumed by the informer, configuration
//! schemas, query helper types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other InfraView crates.

pub mod config;
pub mod error;
pub mod events;
pub mod operation;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use events::{ChangeEvent, InformerAction, InformerMessage};
pub use operation::{
    HookPhase, OperationInput, OperationKind, OperationOutput, OperationPayload,
    ResourceProviderInput,
};
pub use result::AppResult;
