//! Shared fakes for integration tests.

#![allow(dead_code)]

use connection_registry::{
    ConnectionError, DestroyNotifier, ErrorReporter, EventSource, Handler, SourceError,
    SubscriptionId, DESTROY_EVENT,
};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

type Listener = Arc<dyn Fn(&dyn Any) + Send + Sync>;
type Hook = Box<dyn Fn(SubscriptionId) + Send + Sync>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// In-memory event source with a call log and failure injection.
pub struct FakeSource {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, String, Listener)>>,
    unsubscribe_calls: Mutex<Vec<SubscriptionId>>,
    destroyable: bool,
    destroyed: AtomicBool,
    destroy_on_drop: bool,
    fail_unsubscribe: AtomicBool,
    fail_watch: AtomicBool,
    destroy_on_watch: AtomicBool,
    on_unsubscribe: Mutex<Option<Hook>>,
}

impl FakeSource {
    fn build(destroyable: bool, destroy_on_drop: bool) -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
            unsubscribe_calls: Mutex::new(Vec::new()),
            destroyable,
            destroyed: AtomicBool::new(false),
            destroy_on_drop,
            fail_unsubscribe: AtomicBool::new(false),
            fail_watch: AtomicBool::new(false),
            destroy_on_watch: AtomicBool::new(false),
            on_unsubscribe: Mutex::new(None),
        })
    }

    /// Source without a destroy notification.
    pub fn plain() -> Arc<Self> {
        Self::build(false, false)
    }

    /// Source that emits a destroy notification when told to.
    pub fn destroyable() -> Arc<Self> {
        Self::build(true, false)
    }

    /// Destroyable source that also emits destroy from its `Drop`.
    pub fn destroy_on_drop() -> Arc<Self> {
        Self::build(true, true)
    }

    pub fn fail_unsubscribe(&self, fail: bool) {
        self.fail_unsubscribe.store(fail, Ordering::SeqCst);
    }

    pub fn fail_watch(&self, fail: bool) {
        self.fail_watch.store(fail, Ordering::SeqCst);
    }

    /// Emit destroy from inside `watch_destroy`, before the watch id is returned.
    pub fn destroy_on_watch(&self, destroy: bool) {
        self.destroy_on_watch.store(destroy, Ordering::SeqCst);
    }

    /// Run `hook` after every unsubscribe call, outside the listener lock.
    pub fn on_unsubscribe(&self, hook: impl Fn(SubscriptionId) + Send + Sync + 'static) {
        *self.on_unsubscribe.lock() = Some(Box::new(hook));
    }

    pub fn emit(&self, event: &str, payload: &dyn Any) {
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(_, _, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener(payload);
        }
    }

    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        self.emit(DESTROY_EVENT, &());
    }

    pub fn unsubscribe_calls(&self) -> Vec<SubscriptionId> {
        self.unsubscribe_calls.lock().clone()
    }

    /// How many times `id` was passed to unsubscribe.
    pub fn unsubscribe_count(&self, id: SubscriptionId) -> usize {
        self.unsubscribe_calls
            .lock()
            .iter()
            .filter(|called| **called == id)
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn listener_count_for(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|(_, name, _)| name == event)
            .count()
    }
}

impl EventSource for FakeSource {
    fn subscribe(&self, event: &str, handler: Handler) -> Result<SubscriptionId, SourceError> {
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(SourceError::Destroyed);
        }
        if event == DESTROY_EVENT && !self.destroyable {
            return Err(SourceError::UnsupportedEvent(event.to_string()));
        }
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .lock()
            .push((id, event.to_string(), Arc::from(handler)));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SourceError> {
        self.unsubscribe_calls.lock().push(id);

        let result = if self.fail_unsubscribe.load(Ordering::SeqCst) {
            Err(SourceError::Other("unsubscribe refused".to_string()))
        } else {
            let mut listeners = self.listeners.lock();
            match listeners.iter().position(|(lid, _, _)| *lid == id) {
                Some(index) => {
                    listeners.remove(index);
                    Ok(())
                }
                None => Err(SourceError::UnknownSubscription(id)),
            }
        };

        if let Some(hook) = self.on_unsubscribe.lock().as_ref() {
            hook(id);
        }
        result
    }

    fn destroy_notifier(&self) -> Option<&dyn DestroyNotifier> {
        if self.destroyable {
            Some(self)
        } else {
            None
        }
    }
}

impl DestroyNotifier for FakeSource {
    fn watch_destroy(&self, handler: Handler) -> Result<SubscriptionId, SourceError> {
        if self.fail_watch.load(Ordering::SeqCst) {
            return Err(SourceError::Other("watch refused".to_string()));
        }
        let watch = self.subscribe(DESTROY_EVENT, handler)?;
        if self.destroy_on_watch.load(Ordering::SeqCst) {
            self.destroy();
        }
        Ok(watch)
    }
}

impl Drop for FakeSource {
    fn drop(&mut self) {
        if self.destroy_on_drop {
            self.destroy();
        }
    }
}

/// Reporter that keeps every failure for inspection.
#[derive(Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<(String, ConnectionError)>>,
}

impl CollectingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn errors(&self) -> Vec<ConnectionError> {
        self.reports.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.reports.lock().iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, label: &str, error: &ConnectionError) {
        self.reports.lock().push((label.to_string(), error.clone()));
    }
}
