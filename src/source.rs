//! Capabilities the registry consumes from event-emitting objects.
//!
//! The registry never dispatches events itself. It only needs two things
//! from a source:
//! - [`EventSource`]: subscribe a handler to a named event and later
//!   unsubscribe it by id.
//! - [`DestroyNotifier`] (optional): subscribe to the source's one-time
//!   teardown notification.
//!
//! A source advertises destroy support by returning `Some` from
//! [`EventSource::destroy_notifier`]. Sources that cannot emit a destroy
//! notification keep the default `None` and the registry will not try to
//! watch them.
//!
//! # Example
//!
//! ```ignore
//! struct Button { signals: Signals }
//!
//! impl EventSource for Button {
//!     fn subscribe(&self, event: &str, handler: Handler) -> Result<SubscriptionId, SourceError> {
//!         self.signals.connect(event, handler)
//!     }
//!
//!     fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SourceError> {
//!         self.signals.disconnect(id)
//!     }
//!
//!     fn destroy_notifier(&self) -> Option<&dyn DestroyNotifier> {
//!         Some(self)
//!     }
//! }
//!
//! impl DestroyNotifier for Button {
//!     fn watch_destroy(&self, handler: Handler) -> Result<SubscriptionId, SourceError> {
//!         self.signals.connect(DESTROY_EVENT, handler)
//!     }
//! }
//! ```

use crate::error::SourceError;
use crate::types::SubscriptionId;
use std::any::Any;

/// Callback invoked by a source when an event fires.
///
/// The payload is whatever the source chooses to pass; handlers downcast it.
pub type Handler = Box<dyn Fn(&dyn Any) + Send + Sync + 'static>;

/// An object that emits named events and accepts subscriptions.
pub trait EventSource: Send + Sync {
    /// Subscribe `handler` to `event`, returning an id the source will accept
    /// in [`EventSource::unsubscribe`].
    fn subscribe(&self, event: &str, handler: Handler) -> Result<SubscriptionId, SourceError>;

    /// Remove a subscription.
    ///
    /// May be called more than once for the same id. Sources are free to
    /// fail on unknown or already removed ids.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SourceError>;

    /// The source's destroy capability, if it has one.
    fn destroy_notifier(&self) -> Option<&dyn DestroyNotifier> {
        None
    }
}

/// An object that emits a destroy notification once per lifetime.
pub trait DestroyNotifier {
    /// Subscribe `handler` to the destroy notification.
    ///
    /// The returned id shares the id space of the owning [`EventSource`] and is
    /// released with [`EventSource::unsubscribe`].
    fn watch_destroy(&self, handler: Handler) -> Result<SubscriptionId, SourceError>;
}
