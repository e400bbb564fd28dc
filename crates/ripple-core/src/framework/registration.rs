//! Registration records.

use crate::foundation::event_type::EventType;
use crate::framework::listener::BoxedListener;

/// A listener together with the event type it was registered for.
///
/// Registrations are immutable and compare by the identity of both parts, so
/// a registration built from the same type and listener handle can be used to
/// remove an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventListenerRegistration {
    event_type: EventType,
    listener: BoxedListener,
}

impl EventListenerRegistration {
    /// Creates a new registration.
    pub fn new(event_type: EventType, listener: BoxedListener) -> Self {
        Self {
            event_type,
            listener,
        }
    }

    /// Returns the event type the listener is interested in.
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Returns the registered listener.
    pub fn listener(&self) -> &BoxedListener {
        &self.listener
    }
}
