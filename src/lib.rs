//! # Connection Registry
//!
//! Bookkeeping for event subscriptions made against objects the caller does
//! not own, so that no subscription dangles after its source goes away.
//!
//! ## Core Concepts
//!
//! - **Sources**: Objects implementing [`EventSource`], optionally with a
//!   [`DestroyNotifier`] capability
//! - **Connections**: `(source, subscription id)` pairs tracked by a
//!   [`ConnectionRegistry`]
//! - **Teardown**: One connection, all connections of a source, or everything;
//!   automatically when a source is destroyed
//! - **Reporting**: Unsubscribe failures go to an injected [`ErrorReporter`]
//!   and never escape a teardown call
//!
//! ## Example
//!
//! ```ignore
//! use connection_registry::{ConnectionRegistry, RegistryConfig};
//!
//! let registry = ConnectionRegistry::with_config(RegistryConfig::labeled("panel"));
//!
//! let id = registry.connect(&button, "clicked", |_| open_menu())?;
//! registry.connect(&slider, "changed", |value| apply(value))?;
//!
//! // Drop one connection
//! registry.disconnect(id);
//!
//! // Everything else is released when the registry is dropped, or earlier
//! // if a source emits its destroy notification.
//! ```

pub mod error;
pub mod registry;
pub mod report;
pub mod source;
pub mod types;

// Re-exports
pub use error::{ConnectionError, Result, SourceError};
pub use registry::{ConnectionRegistry, RegistryConfig};
pub use report::{ErrorReporter, NullReporter, TracingReporter};
pub use source::{DestroyNotifier, EventSource, Handler};
pub use types::{SubscriptionId, DESTROY_EVENT};
