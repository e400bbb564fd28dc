//! Listener capability.
//!
//! An [`EventListener`] is anything that can be called with one event. The
//! registry stores listeners as [`BoxedListener`] handles, which compare by
//! identity: the handle you registered is the handle you remove.
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{BoxedEvent, BoxedListener, into_listener};
//!
//! // From a closure
//! let logger = into_listener(|event: &BoxedEvent| {
//!     println!("received {}", event.event_type());
//!     Ok(())
//! });
//!
//! // Clones are the same listener
//! assert_eq!(logger, logger.clone());
//!
//! // Separately built handles never are
//! let other = into_listener(|_: &BoxedEvent| Ok(()));
//! assert_ne!(logger, other);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::foundation::event::BoxedEvent;

/// A callback invoked with events.
///
/// Returning an error aborts the firing that invoked the listener; the error
/// is handed to whoever fired the event.
pub trait EventListener: Send + Sync + 'static {
    /// Handles one event.
    fn on_event(&self, event: &BoxedEvent) -> anyhow::Result<()>;
}

/// Listener backed by a closure. Built by [`into_listener`].
pub struct ListenerFn<F> {
    f: F,
}

impl<F> EventListener for ListenerFn<F>
where
    F: Fn(&BoxedEvent) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn on_event(&self, event: &BoxedEvent) -> anyhow::Result<()> {
        (self.f)(event)
    }
}

/// A shared, type-erased listener handle.
///
/// Equality and hashing use the identity of the listener object, so a handle
/// and its clones are interchangeable as removal keys.
#[derive(Clone)]
pub struct BoxedListener {
    inner: Arc<dyn EventListener>,
}

impl BoxedListener {
    /// Wraps a listener in a new handle.
    pub fn new<L: EventListener>(listener: L) -> Self {
        Self {
            inner: Arc::new(listener),
        }
    }

    /// Creates a handle sharing an existing `Arc`.
    ///
    /// Useful when the caller keeps its own typed `Arc` to inspect the
    /// listener's state later.
    pub fn from_arc<L: EventListener>(listener: Arc<L>) -> Self {
        Self { inner: listener }
    }

    /// Invokes the listener.
    pub fn call(&self, event: &BoxedEvent) -> anyhow::Result<()> {
        self.inner.on_event(event)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.inner).cast()
    }
}

impl PartialEq for BoxedListener {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for BoxedListener {}

impl std::hash::Hash for BoxedListener {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for BoxedListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxedListener").field(&self.addr()).finish()
    }
}

/// Turns a closure into a listener handle.
pub fn into_listener<F>(f: F) -> BoxedListener
where
    F: Fn(&BoxedEvent) -> anyhow::Result<()> + Send + Sync + 'static,
{
    BoxedListener::new(ListenerFn { f })
}
