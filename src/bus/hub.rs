//! The event bus.
//!
//! A bus is an owned value, constructed with [`EventBus::new`] and passed
//! everywhere explicitly - there is no hidden global, so tests build
//! isolated buses. Publishing is synchronous: every live handler for the
//! topic runs on the caller's stack, in subscription order, before
//! `publish` returns. The bus provides no queueing, retries, or
//! cross-process delivery.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::chain::{Chain, ChainError, Stage};
use crate::core::EngineError;

use super::subscription::SubscriptionId;
use super::topic::{ChainTopic, Topic, TopicKey};

/// Handler for a plain notification topic.
///
/// Receives the bus so it can publish follow-up notifications or
/// unsubscribe itself from inside its own dispatch.
pub type NotifyHandler<E> = dyn FnMut(&EventBus, &mut E) -> Result<(), EngineError>;

/// Handler for a chain topic.
///
/// Receives the event read-only plus the chain under construction, and
/// declares future work by registering modifiers rather than mutating
/// the event directly.
pub type ChainHandler<E> = dyn FnMut(&EventBus, &E, &mut Chain<E>) -> Result<(), EngineError>;

struct Subscriber<H: ?Sized> {
    id: SubscriptionId,
    dead: Rc<Cell<bool>>,
    handler: Rc<RefCell<H>>,
}

impl<H: ?Sized> Clone for Subscriber<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            dead: Rc::clone(&self.dead),
            handler: Rc::clone(&self.handler),
        }
    }
}

struct Slot<H: ?Sized> {
    subs: Vec<Subscriber<H>>,
}

impl<H: ?Sized> Slot<H> {
    fn new() -> Self {
        Self { subs: Vec::new() }
    }

    fn snapshot(&self) -> Vec<Subscriber<H>> {
        self.subs.iter().filter(|s| !s.dead.get()).cloned().collect()
    }
}

/// Type-erased per-topic state, so unsubscribe and compaction work
/// without knowing the payload type.
trait TopicSlot {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn mark_dead(&mut self, id: SubscriptionId) -> bool;
    fn compact(&mut self);
    fn live_count(&self) -> usize;
}

impl<H: ?Sized + 'static> TopicSlot for Slot<H> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn mark_dead(&mut self, id: SubscriptionId) -> bool {
        match self.subs.iter().find(|s| s.id == id && !s.dead.get()) {
            Some(sub) => {
                sub.dead.set(true);
                true
            }
            None => false,
        }
    }

    fn compact(&mut self) {
        self.subs.retain(|s| !s.dead.get());
    }

    fn live_count(&self) -> usize {
        self.subs.iter().filter(|s| !s.dead.get()).count()
    }
}

/// A type-safe publish/subscribe hub.
///
/// Topics are lazily materialized on first subscribe. The bus uses
/// interior mutability and is intentionally `!Send`: it models the
/// single-threaded, synchronous core, and cross-thread use requires
/// external discipline.
pub struct EventBus {
    topics: RefCell<FxHashMap<TopicKey, Box<dyn TopicSlot>>>,
    next_id: Cell<u64>,
    /// Depth of in-progress dispatches; compaction is deferred while > 0
    /// so a handler can unsubscribe (itself included) mid-pass.
    depth: Cell<u32>,
    dirty: RefCell<Vec<TopicKey>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RefCell::new(FxHashMap::default()),
            next_id: Cell::new(0),
            depth: Cell::new(0),
            dirty: RefCell::new(Vec::new()),
        }
    }

    fn allocate_id(&self) -> SubscriptionId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        SubscriptionId::new(id)
    }

    /// Subscribe a handler to a notification topic.
    ///
    /// Handlers run in subscription order. The returned id is the only
    /// credential that can reverse this call.
    pub fn subscribe<E: 'static>(
        &self,
        topic: Topic<E>,
        handler: impl FnMut(&EventBus, &mut E) -> Result<(), EngineError> + 'static,
    ) -> SubscriptionId {
        let handler: Rc<RefCell<NotifyHandler<E>>> = Rc::new(RefCell::new(handler));
        self.push_subscriber::<NotifyHandler<E>>(topic.key(), handler)
    }

    /// Subscribe a chain-building handler to a chain topic.
    ///
    /// The handler declares future work by registering modifiers into
    /// the chain [`dispatch`](Self::dispatch) is assembling, without
    /// executing anything immediately.
    pub fn subscribe_chain<E: 'static>(
        &self,
        topic: ChainTopic<E>,
        handler: impl FnMut(&EventBus, &E, &mut Chain<E>) -> Result<(), EngineError> + 'static,
    ) -> SubscriptionId {
        let handler: Rc<RefCell<ChainHandler<E>>> = Rc::new(RefCell::new(handler));
        self.push_subscriber::<ChainHandler<E>>(topic.key(), handler)
    }

    fn push_subscriber<H: ?Sized + 'static>(
        &self,
        key: TopicKey,
        handler: Rc<RefCell<H>>,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        let mut topics = self.topics.borrow_mut();
        let slot = topics
            .entry(key)
            .or_insert_with(|| Box::new(Slot::<H>::new()));
        let slot = slot
            .as_any_mut()
            .downcast_mut::<Slot<H>>()
            .expect("slot shape is fixed by the topic key");
        slot.subs.push(Subscriber {
            id,
            dead: Rc::new(Cell::new(false)),
            handler,
        });
        tracing::trace!(topic = key.name(), id = id.raw(), "subscribed");
        id
    }

    /// Remove exactly the handler the id was issued for.
    ///
    /// Returns `false` (a defined no-op) for an unknown or already
    /// removed id. Safe to call from inside a handler, including on the
    /// handler itself: the in-flight pass skips it and the bookkeeping
    /// is compacted once the outermost dispatch finishes.
    pub fn unsubscribe<E: 'static>(&self, topic: Topic<E>, id: SubscriptionId) -> bool {
        self.revoke(topic.key(), id)
    }

    /// [`unsubscribe`](Self::unsubscribe) for chain topics.
    pub fn unsubscribe_chain<E: 'static>(&self, topic: ChainTopic<E>, id: SubscriptionId) -> bool {
        self.revoke(topic.key(), id)
    }

    /// Untyped unsubscribe by topic key.
    ///
    /// Condition subscription sets record `(TopicKey, SubscriptionId)`
    /// pairs so they can release everything without carrying payload
    /// types around.
    pub fn revoke(&self, key: TopicKey, id: SubscriptionId) -> bool {
        let mut topics = self.topics.borrow_mut();
        let Some(slot) = topics.get_mut(&key) else {
            return false;
        };
        if !slot.mark_dead(id) {
            return false;
        }
        if self.depth.get() == 0 {
            slot.compact();
        } else {
            self.dirty.borrow_mut().push(key);
        }
        tracing::trace!(topic = key.name(), id = id.raw(), "unsubscribed");
        true
    }

    /// Publish a notification, invoking every live handler synchronously
    /// in subscription order on the caller's stack.
    ///
    /// Dispatch runs over a snapshot taken at publish time: handlers
    /// subscribed mid-pass miss the in-flight event, handlers removed
    /// mid-pass are skipped. Propagation is fail-fast - the first
    /// handler error stops dispatch and is returned; remaining handlers
    /// do not run.
    ///
    /// Publishing a *different* topic from inside a handler is
    /// supported. A handler that reentrantly triggers its own dispatch
    /// is unsupported and surfaces as [`EngineError::Internal`].
    pub fn publish<E: 'static>(&self, topic: Topic<E>, event: &mut E) -> Result<(), EngineError> {
        let snapshot = self.snapshot::<NotifyHandler<E>>(topic.key());
        if snapshot.is_empty() {
            return Ok(());
        }
        tracing::debug!(topic = topic.name(), handlers = snapshot.len(), "publish");

        self.depth.set(self.depth.get() + 1);
        let mut result = Ok(());
        for sub in &snapshot {
            if sub.dead.get() {
                continue;
            }
            let Ok(mut handler) = sub.handler.try_borrow_mut() else {
                result = Err(self.reentry_error(topic.name(), sub.id));
                break;
            };
            if let Err(error) = handler(self, event) {
                result = Err(error);
                break;
            }
        }
        self.finish_dispatch();
        result
    }

    /// Build and run a staged chain for one event.
    ///
    /// Constructs a single-use [`Chain`] over `stages`, runs every live
    /// chain handler (snapshot, subscription order, fail-fast - the same
    /// rules as [`publish`](Self::publish)) to collect modifier
    /// registrations, then executes the chain and returns the final
    /// event. Handler and modifier failures both surface as
    /// [`ChainError`] carrying the event as it stood.
    pub fn dispatch<E: 'static>(
        &self,
        topic: ChainTopic<E>,
        stages: &[Stage],
        event: E,
    ) -> Result<E, ChainError<E>> {
        let mut chain = match Chain::new(stages) {
            Ok(chain) => chain,
            Err(error) => {
                return Err(ChainError {
                    event,
                    stage: None,
                    source: None,
                    error,
                })
            }
        };

        let snapshot = self.snapshot::<ChainHandler<E>>(topic.key());
        tracing::debug!(topic = topic.name(), handlers = snapshot.len(), "dispatch");

        self.depth.set(self.depth.get() + 1);
        let mut failure = None;
        for sub in &snapshot {
            if sub.dead.get() {
                continue;
            }
            let Ok(mut handler) = sub.handler.try_borrow_mut() else {
                failure = Some(self.reentry_error(topic.name(), sub.id));
                break;
            };
            if let Err(error) = handler(self, &event, &mut chain) {
                failure = Some(error);
                break;
            }
        }
        self.finish_dispatch();

        if let Some(error) = failure {
            return Err(ChainError {
                event,
                stage: None,
                source: None,
                error,
            });
        }
        chain.execute(event)
    }

    fn snapshot<H: ?Sized + 'static>(&self, key: TopicKey) -> Vec<Subscriber<H>> {
        let topics = self.topics.borrow();
        topics
            .get(&key)
            .and_then(|slot| slot.as_any().downcast_ref::<Slot<H>>())
            .map(Slot::snapshot)
            .unwrap_or_default()
    }

    fn reentry_error(&self, topic: &str, id: SubscriptionId) -> EngineError {
        EngineError::Internal(format!(
            "{id} re-entered topic `{topic}` during its own dispatch"
        ))
    }

    fn finish_dispatch(&self) {
        let depth = self.depth.get() - 1;
        self.depth.set(depth);
        if depth > 0 {
            return;
        }
        let mut topics = self.topics.borrow_mut();
        for key in self.dirty.borrow_mut().drain(..) {
            if let Some(slot) = topics.get_mut(&key) {
                slot.compact();
            }
        }
    }

    /// Live subscriber count for a topic key.
    #[must_use]
    pub fn live_subscribers(&self, key: TopicKey) -> usize {
        self.topics
            .borrow()
            .get(&key)
            .map_or(0, |slot| slot.live_count())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.topics.borrow().len())
            .finish()
    }
}
