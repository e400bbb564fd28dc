//! Event payloads.
//!
//! This module provides the payload side of the event system:
//!
//! - [`Event`] - Base trait for all events
//! - [`SourceRef`] - Identity handle to the object that produced an event
//! - [`BasicEvent`] - Minimal event carrying only a source and a type
//! - [`BoxedEvent`] - Shared, type-erased event handed to listeners
//!
//! # Custom Events
//!
//! Concrete events embed a [`BasicEvent`] and delegate to it:
//!
//! ```rust
//! use std::any::Any;
//! use ripple_core::{BasicEvent, BoxedEvent, Event, EventType, SourceRef};
//!
//! struct PropertyChanged {
//!     base: BasicEvent,
//!     key: String,
//! }
//!
//! impl Event for PropertyChanged {
//!     fn event_type(&self) -> &EventType {
//!         self.base.event_type()
//!     }
//!
//!     fn source(&self) -> &SourceRef {
//!         self.base.source()
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let changed = EventType::child("PROPERTY_CHANGED", EventType::any());
//! let event = BoxedEvent::new(PropertyChanged {
//!     base: BasicEvent::new(SourceRef::new("config"), changed.clone()),
//!     key: "timeout".into(),
//! });
//!
//! assert_eq!(event.event_type(), &changed);
//! assert_eq!(event.downcast_ref::<PropertyChanged>().unwrap().key, "timeout");
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::foundation::event_type::EventType;

// ============================================================================
// Source Reference
// ============================================================================

/// A shared handle to the object an event originates from.
///
/// Two handles are equal when they point at the same object. Clone the handle
/// to hand out the same source to several events.
#[derive(Clone)]
pub struct SourceRef {
    inner: Arc<dyn Any + Send + Sync>,
}

impl SourceRef {
    /// Wraps `source` in a new handle.
    pub fn new<S: Any + Send + Sync>(source: S) -> Self {
        Self {
            inner: Arc::new(source),
        }
    }

    /// Creates a handle sharing an existing `Arc`.
    pub fn from_arc<S: Any + Send + Sync>(source: Arc<S>) -> Self {
        Self { inner: source }
    }

    /// Attempts to downcast the source to a concrete type.
    pub fn downcast_ref<S: Any>(&self) -> Option<&S> {
        self.inner.downcast_ref()
    }
}

impl PartialEq for SourceRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl Eq for SourceRef {}

impl fmt::Debug for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SourceRef")
            .field(&Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

// ============================================================================
// Core Event Trait
// ============================================================================

/// The base trait for all events.
///
/// An event knows its own exact [`EventType`], which decides the listeners it
/// is delivered to, and the source it was produced by. Events are passed to
/// listeners type-erased; `as_any()` lets a listener recover the concrete
/// payload.
pub trait Event: Any + Send + Sync {
    /// Returns the exact type of this event.
    fn event_type(&self) -> &EventType;

    /// Returns the object that produced this event.
    fn source(&self) -> &SourceRef;

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// Basic Event
// ============================================================================

/// An event with no payload beyond its source and type.
#[derive(Debug, Clone)]
pub struct BasicEvent {
    source: SourceRef,
    event_type: EventType,
}

impl BasicEvent {
    /// Creates a new event of the given type.
    pub fn new(source: SourceRef, event_type: EventType) -> Self {
        Self { source, event_type }
    }
}

impl Event for BasicEvent {
    fn event_type(&self) -> &EventType {
        &self.event_type
    }

    fn source(&self) -> &SourceRef {
        &self.source
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Boxed Event
// ============================================================================

/// A type-erased container for events that supports runtime downcasting.
///
/// `BoxedEvent` wraps any type implementing [`Event`] in an `Arc`, so the same
/// instance can be handed to every listener of a firing and kept by listeners
/// that need it afterwards. It derefs to `dyn Event`:
///
/// ```rust,ignore
/// let event: BoxedEvent = /* ... */;
/// let kind = event.event_type();
/// let source = event.source();
/// ```
#[derive(Clone)]
pub struct BoxedEvent {
    inner: Arc<dyn Event>,
}

impl BoxedEvent {
    /// Creates a new `BoxedEvent` from any type implementing `Event`.
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            inner: Arc::new(event),
        }
    }

    /// Returns the inner `Arc<dyn Event>`.
    pub fn inner(&self) -> &Arc<dyn Event> {
        &self.inner
    }

    /// Returns `true` if the payload is of type `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.inner.as_any().is::<E>()
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref()
    }

    /// Returns `true` if both handles share the same event instance.
    pub fn ptr_eq(&self, other: &BoxedEvent) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl<E: Event> From<E> for BoxedEvent {
    fn from(event: E) -> Self {
        Self::new(event)
    }
}

impl std::ops::Deref for BoxedEvent {
    type Target = dyn Event;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl fmt::Debug for BoxedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedEvent")
            .field("event_type", &self.event_type().name())
            .field("source", self.source())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Message {
        base: BasicEvent,
        text: &'static str,
    }

    impl Event for Message {
        fn event_type(&self) -> &EventType {
            self.base.event_type()
        }

        fn source(&self) -> &SourceRef {
            self.base.source()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_source_ref_identity() {
        let a = SourceRef::new(7_u32);
        let b = SourceRef::new(7_u32);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.downcast_ref::<u32>(), Some(&7));
        assert!(a.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_source_ref_from_arc() {
        let owner = Arc::new(String::from("owner"));
        let source = SourceRef::from_arc(Arc::clone(&owner));
        assert_eq!(source.downcast_ref::<String>(), Some(&*owner));
    }

    #[test]
    fn test_basic_event_accessors() {
        let kind = EventType::child("BASIC", EventType::any());
        let source = SourceRef::new(());
        let event = BasicEvent::new(source.clone(), kind.clone());
        assert_eq!(event.event_type(), &kind);
        assert_eq!(event.source(), &source);
    }

    #[test]
    fn test_boxed_event_downcast() {
        let kind = EventType::child("MESSAGE", EventType::any());
        let event = BoxedEvent::new(Message {
            base: BasicEvent::new(SourceRef::new(()), kind.clone()),
            text: "hello",
        });

        assert!(event.is::<Message>());
        assert!(!event.is::<BasicEvent>());
        assert_eq!(event.downcast_ref::<Message>().map(|m| m.text), Some("hello"));
        assert_eq!(event.event_type(), &kind);
    }

    #[test]
    fn test_boxed_event_clone_shares_instance() {
        let event: BoxedEvent =
            BasicEvent::new(SourceRef::new(()), EventType::any().clone()).into();
        let other = event.clone();
        assert!(event.ptr_eq(&other));

        let fresh: BoxedEvent =
            BasicEvent::new(SourceRef::new(()), EventType::any().clone()).into();
        assert!(!event.ptr_eq(&fresh));
    }
}
