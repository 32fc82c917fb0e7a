//! Connection registry for subscriptions made against external sources.
//!
//! The registry remembers every `(source, subscription id)` pair created
//! through it and guarantees each one is torn down exactly once:
//! - explicitly, one at a time or per source or all at once
//! - automatically, when a source emits its destroy notification
//! - on drop of the registry (configurable)
//!
//! Teardown never fails from the caller's point of view. Unsubscribe errors
//! are reported to the registry's [`ErrorReporter`](crate::ErrorReporter) and
//! processing continues.
//!
//! # Example
//!
//! ```ignore
//! let registry = ConnectionRegistry::new();
//!
//! let id = registry.connect(&button, "clicked", |_| println!("clicked"))?;
//! registry.connect(&button, "hovered", |_| println!("hovered"))?;
//!
//! registry.disconnect(id);
//! registry.disconnect_all_for(&button);
//! ```

mod config;
mod manager;
mod record;

pub use config::RegistryConfig;
pub use manager::ConnectionRegistry;
