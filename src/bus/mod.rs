//! The event bus: named, typed topics with synchronous dispatch.
//!
//! Subscribing returns a [`SubscriptionId`], the reversible handle that
//! is the only way to undo the subscription. Chain topics specialize the
//! bus for staged-pipeline construction: their handlers register
//! modifiers into a [`Chain`](crate::chain::Chain) that
//! [`EventBus::dispatch`] builds and executes per event.

pub mod hub;
pub mod subscription;
pub mod topic;

pub use hub::{ChainHandler, EventBus, NotifyHandler};
pub use subscription::SubscriptionId;
pub use topic::{ChainTopic, Topic, TopicKey, TopicKind};
