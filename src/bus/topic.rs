//! Topic handles.
//!
//! A topic is a named, typed channel. Handles are zero-sized-ish `Copy`
//! values declared as constants (see `events::topics`); the bus
//! materializes per-topic state lazily on first subscribe. Two topics
//! collide only when name, payload type, and flavor all match.

use std::any::TypeId;
use std::marker::PhantomData;

/// Whether a topic carries plain notifications or chain construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopicKind {
    Notify,
    Chain,
}

/// Untyped key identifying one topic inside the bus.
///
/// Obtained from [`Topic::key`] / [`ChainTopic::key`]; condition
/// subscription sets store these so they can unsubscribe without
/// carrying the payload type around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TopicKey {
    type_id: TypeId,
    name: &'static str,
    kind: TopicKind,
}

impl TopicKey {
    /// The topic name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Handle for a plain notification topic with payload `E`.
///
/// Subscribers receive `&mut E` and are invoked synchronously, in
/// subscription order, on the publisher's stack.
pub struct Topic<E> {
    name: &'static str,
    _payload: PhantomData<fn(E)>,
}

impl<E> Topic<E> {
    /// Define a topic by name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    /// The topic name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// The untyped bus key for this topic.
    #[must_use]
    pub fn key(self) -> TopicKey
    where
        E: 'static,
    {
        TopicKey {
            type_id: TypeId::of::<E>(),
            name: self.name,
            kind: TopicKind::Notify,
        }
    }
}

impl<E> Clone for Topic<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Topic<E> {}

impl<E> std::fmt::Debug for Topic<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Topic({})", self.name)
    }
}

/// Handle for a chain topic with payload `E`.
///
/// Subscribers receive the event read-only plus the in-flight
/// [`Chain`](crate::chain::Chain) and declare future work by registering
/// modifiers instead of mutating the event directly.
pub struct ChainTopic<E> {
    name: &'static str,
    _payload: PhantomData<fn(E)>,
}

impl<E> ChainTopic<E> {
    /// Define a chain topic by name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    /// The topic name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// The untyped bus key for this topic.
    #[must_use]
    pub fn key(self) -> TopicKey
    where
        E: 'static,
    {
        TopicKey {
            type_id: TypeId::of::<E>(),
            name: self.name,
            kind: TopicKind::Chain,
        }
    }
}

impl<E> Clone for ChainTopic<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ChainTopic<E> {}

impl<E> std::fmt::Debug for ChainTopic<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChainTopic({})", self.name)
    }
}
