//! Subscription bookkeeping shared by every condition.
//!
//! [`SubscriptionSet`] holds the recorded `(topic, id)` pairs and *is*
//! the applied/idle state: non-empty means applied. [`Registrar`] is the
//! apply-time recorder - subscriptions land in it first, and only an
//! explicit [`commit`](Registrar::commit) moves them into the set.
//! Dropping an uncommitted registrar unsubscribes everything it
//! recorded, which is what rolls back a partially-failed apply.

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::bus::{ChainTopic, EventBus, SubscriptionId, Topic, TopicKey};
use crate::chain::Chain;
use crate::core::{CharacterId, ConditionRef, EngineError};

type Recorded = SmallVec<[(TopicKey, SubscriptionId); 4]>;

/// The set of live subscriptions a condition currently owns.
#[derive(Default)]
pub struct SubscriptionSet {
    subs: RefCell<Recorded>,
}

impl SubscriptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any subscription is recorded (the applied state).
    #[must_use]
    pub fn is_applied(&self) -> bool {
        !self.subs.borrow().is_empty()
    }

    fn adopt(&self, recorded: Recorded) {
        self.subs.borrow_mut().extend(recorded);
    }

    /// Unsubscribe and forget every recorded id. Returns how many were
    /// released; zero when already idle.
    pub fn release(&self, bus: &EventBus) -> usize {
        let recorded: Recorded = self.subs.borrow_mut().drain(..).collect();
        let count = recorded.len();
        for (key, id) in recorded {
            bus.revoke(key, id);
        }
        count
    }
}

impl std::fmt::Debug for SubscriptionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSet")
            .field("live", &self.subs.borrow().len())
            .finish()
    }
}

/// Apply-time subscription recorder with rollback-on-drop.
pub struct Registrar<'a> {
    bus: &'a EventBus,
    set: &'a SubscriptionSet,
    recorded: Recorded,
}

impl<'a> Registrar<'a> {
    /// Start recording subscriptions for one apply call.
    ///
    /// Fails [`EngineError::AlreadyApplied`] when the set already holds
    /// live subscriptions.
    pub fn begin(
        bus: &'a EventBus,
        set: &'a SubscriptionSet,
        reference: ConditionRef,
        character: &CharacterId,
    ) -> Result<Self, EngineError> {
        if set.is_applied() {
            return Err(EngineError::AlreadyApplied {
                condition: reference,
                character: character.clone(),
            });
        }
        Ok(Self {
            bus,
            set,
            recorded: Recorded::new(),
        })
    }

    /// Subscribe to a notification topic, recording the id.
    pub fn subscribe<E: 'static>(
        &mut self,
        topic: Topic<E>,
        handler: impl FnMut(&EventBus, &mut E) -> Result<(), EngineError> + 'static,
    ) -> SubscriptionId {
        let id = self.bus.subscribe(topic, handler);
        self.recorded.push((topic.key(), id));
        id
    }

    /// Subscribe to a chain topic, recording the id.
    pub fn subscribe_chain<E: 'static>(
        &mut self,
        topic: ChainTopic<E>,
        handler: impl FnMut(&EventBus, &E, &mut Chain<E>) -> Result<(), EngineError> + 'static,
    ) -> SubscriptionId {
        let id = self.bus.subscribe_chain(topic, handler);
        self.recorded.push((topic.key(), id));
        id
    }

    /// Hand everything recorded to the subscription set.
    ///
    /// After commit the registrar's drop does nothing; the set now owns
    /// the subscriptions and releases them on remove.
    pub fn commit(mut self) {
        self.set.adopt(std::mem::take(&mut self.recorded));
    }
}

impl Drop for Registrar<'_> {
    fn drop(&mut self) {
        for (key, id) in self.recorded.drain(..) {
            self.bus.revoke(key, id);
        }
    }
}
