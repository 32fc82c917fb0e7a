//! Connection records held by the registry.

use crate::source::EventSource;
use crate::types::SubscriptionId;
use std::sync::Weak;

/// Registry-unique identity of a record.
///
/// Subscription ids are chosen by sources and may repeat across them, so
/// self-removal on destroy looks records up by key instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct EntryKey(pub(crate) u64);

/// One subscription made against a source.
pub(crate) struct ConnectionRecord {
    pub(crate) key: EntryKey,
    /// Back-reference only; the registry never keeps a source alive.
    pub(crate) source: Weak<dyn EventSource>,
    pub(crate) id: SubscriptionId,
    /// Subscription to the source's destroy notification, once wired.
    pub(crate) destroy_watch: Option<SubscriptionId>,
}

impl ConnectionRecord {
    pub(crate) fn new(key: EntryKey, source: Weak<dyn EventSource>, id: SubscriptionId) -> Self {
        Self {
            key,
            source,
            id,
            destroy_watch: None,
        }
    }

    /// Whether this record belongs to the source at `addr`.
    pub(crate) fn is_from(&self, addr: *const ()) -> bool {
        source_addr(&self.source) == addr
    }

    /// Whether the source allocation has been dropped.
    pub(crate) fn is_orphaned(&self) -> bool {
        self.source.strong_count() == 0
    }
}

/// Thin address identifying a source allocation.
///
/// Held `Weak`s keep the allocation reserved, so the address cannot be reused
/// by another source while any record points at it.
pub(crate) fn source_addr(source: &Weak<dyn EventSource>) -> *const () {
    source.as_ptr() as *const ()
}
