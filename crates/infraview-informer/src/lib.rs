//! # infraview-informer
//!
//! Change-notification engine for InfraView. Provides:
//!
//! - Subscription registry keyed by resource and namespace
//! - Dispatcher turning backend change events into informer messages
//! - One broadcast channel per informer action, with lag-tolerant receivers
//! - The `ResourceInformer` facade used by a host connection

pub mod dispatcher;
pub mod informer;
pub mod receiver;
pub mod subscription;

pub use dispatcher::InformerDispatcher;
pub use informer::ResourceInformer;
pub use receiver::InformerReceiver;
pub use subscription::SubscriptionRegistry;
