//! Subscription identifiers.

/// Unique identifier for one live subscription.
///
/// Returned by every subscribe call and required by unsubscribe: the id
/// is the only credential that can reverse a subscription, so losing it
/// leaks a handler that keeps firing. Ids are transient - they are never
/// persisted and a revived condition gets fresh ones on re-apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}
