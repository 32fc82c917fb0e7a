//! Core types shared by the registry and event sources.

use std::fmt;

/// Name of the one-time event a source emits when it is torn down.
pub const DESTROY_EVENT: &str = "destroy";

/// Opaque handle returned by a source's subscribe primitive.
///
/// Sources pick the value. The registry only compares ids for equality and
/// hands them back to the source that issued them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SubscriptionId {
    fn from(raw: u64) -> Self {
        SubscriptionId(raw)
    }
}
