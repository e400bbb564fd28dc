//! Framework layer - Registration and delivery.
//!
//! This module contains the listener side of the event system:
//! - Listener capability and type-erased listener handles
//! - Registration records pairing a listener with an event type
//! - The thread-safe listener registry
//! - Iteration over the listeners matching an event type

pub mod iterator;
pub mod listener;
pub mod registration;
pub mod registry;

pub use iterator::{EventListenerIterator, EventListeners};
pub use listener::{BoxedListener, EventListener, ListenerFn, into_listener};
pub use registration::EventListenerRegistration;
pub use registry::EventListenerList;
