//! The connection registry.

use crate::error::{ConnectionError, Result};
use crate::report::{ErrorReporter, TracingReporter};
use crate::source::{DestroyNotifier, EventSource, Handler};
use crate::types::SubscriptionId;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

use super::config::RegistryConfig;
use super::record::{ConnectionRecord, EntryKey};

/// State shared with destroy handlers.
///
/// The records lock is never held while calling into a source: unsubscribing
/// may synchronously fire another destroy handler that needs it.
struct Inner {
    label: String,
    records: Mutex<Vec<ConnectionRecord>>,
    next_key: AtomicU64,
    reporter: Arc<dyn ErrorReporter>,
}

impl Inner {
    fn insert(&self, source: Weak<dyn EventSource>, id: SubscriptionId) -> EntryKey {
        let key = EntryKey(self.next_key.fetch_add(1, Ordering::Relaxed));
        self.records
            .lock()
            .push(ConnectionRecord::new(key, source, id));
        key
    }

    /// Remove a record by identity. Absent records are a no-op.
    fn take(&self, key: EntryKey) -> Option<ConnectionRecord> {
        let mut records = self.records.lock();
        let index = records.iter().position(|r| r.key == key)?;
        Some(records.remove(index))
    }

    /// Store the destroy watch on a record. Returns false if the record is gone.
    fn attach_watch(&self, key: EntryKey, watch: SubscriptionId) -> bool {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.key == key) {
            Some(record) => {
                record.destroy_watch = Some(watch);
                true
            }
            None => false,
        }
    }

    fn on_source_destroyed(&self, key: EntryKey) {
        let Some(record) = self.take(key) else {
            return;
        };
        debug!(
            registry = %self.label,
            subscription = %record.id,
            "source destroyed, dropping connection"
        );
        self.release(&record);
    }

    /// Unsubscribe a removed record and its destroy watch.
    fn release(&self, record: &ConnectionRecord) {
        self.unsubscribe(&record.source, record.id);
        if let Some(watch) = record.destroy_watch {
            self.unsubscribe(&record.source, watch);
        }
    }

    fn unsubscribe(&self, source: &Weak<dyn EventSource>, id: SubscriptionId) {
        let Some(source) = source.upgrade() else {
            debug!(registry = %self.label, subscription = %id, "source already dropped");
            return;
        };
        if let Err(err) = source.unsubscribe(id) {
            self.report(&ConnectionError::Unsubscribe { id, source: err });
        }
    }

    fn report(&self, error: &ConnectionError) {
        self.reporter.report(&self.label, error);
    }
}

/// Tracks subscriptions against external sources and tears them down.
///
/// Records are kept in insertion order. A record is removed by exactly one of
/// [`disconnect`](Self::disconnect), [`disconnect_from`](Self::disconnect_from),
/// [`disconnect_all_for`](Self::disconnect_all_for),
/// [`disconnect_all`](Self::disconnect_all), [`prune`](Self::prune), or the
/// source's destroy notification.
pub struct ConnectionRegistry {
    inner: Arc<Inner>,
    config: RegistryConfig,
}

impl ConnectionRegistry {
    /// Create a registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry that logs failures through `tracing`.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_reporter(config, Arc::new(TracingReporter))
    }

    /// Create a registry that hands failures to `reporter`.
    pub fn with_reporter(config: RegistryConfig, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                label: config.label.clone(),
                records: Mutex::new(Vec::new()),
                next_key: AtomicU64::new(1),
                reporter,
            }),
            config,
        }
    }

    /// Label used in log lines and failure reports.
    pub fn label(&self) -> &str {
        &self.config.label
    }

    /// Subscribe `handler` to `event` on `source` and track the subscription.
    ///
    /// Returns the source's subscription id. If the source refuses the
    /// subscription nothing is recorded.
    pub fn connect<S, F>(&self, source: &Arc<S>, event: &str, handler: F) -> Result<SubscriptionId>
    where
        S: EventSource + 'static,
        F: Fn(&dyn Any) + Send + Sync + 'static,
    {
        let source: Arc<dyn EventSource> = source.clone();
        self.connect_dyn(&source, event, handler)
    }

    /// [`connect`](Self::connect) for sources held as trait objects.
    pub fn connect_dyn<F>(
        &self,
        source: &Arc<dyn EventSource>,
        event: &str,
        handler: F,
    ) -> Result<SubscriptionId>
    where
        F: Fn(&dyn Any) + Send + Sync + 'static,
    {
        let id = source
            .subscribe(event, Box::new(handler))
            .map_err(|err| ConnectionError::Subscribe {
                event: event.to_string(),
                source: err,
            })?;

        self.register_dyn(source, id);
        Ok(id)
    }

    /// Track a subscription that was created outside the registry.
    ///
    /// If the source has a destroy capability (and watching is enabled), the
    /// record removes itself when the source is destroyed.
    pub fn register<S>(&self, source: &Arc<S>, id: SubscriptionId)
    where
        S: EventSource + 'static,
    {
        let source: Arc<dyn EventSource> = source.clone();
        self.register_dyn(&source, id);
    }

    /// [`register`](Self::register) for sources held as trait objects.
    pub fn register_dyn(&self, source: &Arc<dyn EventSource>, id: SubscriptionId) {
        let notifier = if self.config.watch_destroy {
            source.destroy_notifier()
        } else {
            None
        };
        self.track(Arc::downgrade(source), notifier, id);
    }

    fn track(
        &self,
        source: Weak<dyn EventSource>,
        notifier: Option<&dyn DestroyNotifier>,
        id: SubscriptionId,
    ) {
        // Sources dropped without a destroy notification never clean up
        // after themselves.
        self.prune();

        let key = self.inner.insert(source.clone(), id);
        debug!(registry = %self.config.label, subscription = %id, "connection registered");

        if let Some(notifier) = notifier {
            self.watch_destroy(notifier, source, key, id);
        }
    }

    fn watch_destroy(
        &self,
        notifier: &dyn DestroyNotifier,
        source: Weak<dyn EventSource>,
        key: EntryKey,
        id: SubscriptionId,
    ) {
        let inner = Arc::downgrade(&self.inner);
        let handler: Handler = Box::new(move |_: &dyn Any| {
            if let Some(inner) = inner.upgrade() {
                inner.on_source_destroyed(key);
            }
        });

        match notifier.watch_destroy(handler) {
            Ok(watch) => {
                // The record may already be gone if the source was destroyed
                // or the connection dropped while the watch was being wired.
                if !self.inner.attach_watch(key, watch) {
                    self.inner.unsubscribe(&source, watch);
                }
            }
            Err(err) => self.inner.report(&ConnectionError::DestroyWatch { id, source: err }),
        }
    }

    /// Disconnect the first connection with subscription id `id`.
    ///
    /// The record is removed even if the source fails to unsubscribe. Unknown
    /// ids are a no-op.
    ///
    /// Ids are only unique per source. When two sources may hand out the same
    /// id, use [`disconnect_from`](Self::disconnect_from).
    pub fn disconnect(&self, id: SubscriptionId) {
        let record = {
            let mut records = self.inner.records.lock();
            records
                .iter()
                .position(|r| r.id == id)
                .map(|index| records.remove(index))
        };
        self.finish(record);
    }

    /// Disconnect the connection with subscription id `id` on `source`.
    pub fn disconnect_from<S>(&self, source: &Arc<S>, id: SubscriptionId)
    where
        S: EventSource + ?Sized,
    {
        let addr = Arc::as_ptr(source) as *const ();
        let record = {
            let mut records = self.inner.records.lock();
            records
                .iter()
                .position(|r| r.id == id && r.is_from(addr))
                .map(|index| records.remove(index))
        };
        self.finish(record);
    }

    fn finish(&self, record: Option<ConnectionRecord>) {
        match record {
            Some(record) => {
                debug!(registry = %self.config.label, subscription = %record.id, "disconnecting");
                self.inner.release(&record);
            }
            None => debug!(registry = %self.config.label, "no matching connection"),
        }
    }

    /// Disconnect every connection made against `source`.
    ///
    /// Other sources' connections are untouched.
    pub fn disconnect_all_for<S>(&self, source: &Arc<S>)
    where
        S: EventSource + ?Sized,
    {
        let addr = Arc::as_ptr(source) as *const ();
        let matching: Vec<ConnectionRecord> = {
            let mut records = self.inner.records.lock();
            let (matching, kept) = std::mem::take(&mut *records)
                .into_iter()
                .partition(|r| r.is_from(addr));
            *records = kept;
            matching
        };

        debug!(
            registry = %self.config.label,
            count = matching.len(),
            "disconnecting all connections for source"
        );
        for record in &matching {
            self.inner.release(record);
        }
    }

    /// Disconnect every connection in the registry.
    ///
    /// The registry is empty afterwards no matter how many unsubscribes fail.
    pub fn disconnect_all(&self) {
        let drained = std::mem::take(&mut *self.inner.records.lock());

        debug!(
            registry = %self.config.label,
            count = drained.len(),
            "disconnecting all connections"
        );
        for record in &drained {
            self.inner.release(record);
        }
    }

    /// Forget connections whose source was dropped without a destroy
    /// notification. Returns how many were removed.
    ///
    /// Runs on every registration as well, so orphans never outlive the next
    /// call to [`connect`](Self::connect) or [`register`](Self::register).
    pub fn prune(&self) -> usize {
        let mut records = self.inner.records.lock();
        let before = records.len();
        records.retain(|r| !r.is_orphaned());
        let pruned = before - records.len();
        if pruned > 0 {
            debug!(registry = %self.config.label, count = pruned, "pruned orphaned connections");
        }
        pruned
    }

    // --- Introspection ---

    /// Number of tracked connections.
    pub fn len(&self) -> usize {
        self.inner.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.lock().is_empty()
    }

    /// Whether any tracked connection has subscription id `id`.
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.inner.records.lock().iter().any(|r| r.id == id)
    }

    /// Number of tracked connections for `source`.
    pub fn count_for<S>(&self, source: &Arc<S>) -> usize
    where
        S: EventSource + ?Sized,
    {
        let addr = Arc::as_ptr(source) as *const ();
        self.inner
            .records
            .lock()
            .iter()
            .filter(|r| r.is_from(addr))
            .count()
    }

    /// Subscription ids tracked for `source`, in insertion order.
    pub fn ids_for<S>(&self, source: &Arc<S>) -> Vec<SubscriptionId>
    where
        S: EventSource + ?Sized,
    {
        let addr = Arc::as_ptr(source) as *const ();
        self.inner
            .records
            .lock()
            .iter()
            .filter(|r| r.is_from(addr))
            .map(|r| r.id)
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConnectionRegistry {
    fn drop(&mut self) {
        if self.config.disconnect_on_drop {
            self.disconnect_all();
        }
    }
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("label", &self.config.label)
            .field("connections", &self.len())
            .finish()
    }
}
