//! The listener registry.
//!
//! [`EventListenerList`] stores `(event type, listener)` registrations and
//! delivers fired events to every listener registered for the event's type or
//! one of its super types.
//!
//! # Delivery
//!
//! When an event is fired:
//!
//! 1. A snapshot of the registrations is taken
//! 2. The ancestor set of the event's type is computed
//! 3. Every registration whose type is in that set is invoked, in
//!    registration order, with the same event instance
//! 4. The first listener error stops delivery and is returned
//!
//! ```rust
//! use ripple_core::{BasicEvent, BoxedEvent, EventListenerList, EventType, SourceRef, into_listener};
//!
//! let base = EventType::child("BASE", EventType::any());
//! let sub = EventType::child("SUB", &base);
//!
//! let list = EventListenerList::new();
//! let listener = into_listener(|event| {
//!     println!("got {}", event.event_type());
//!     Ok(())
//! });
//! list.add_event_listener(&base, &listener)?;
//!
//! // Delivered: SUB descends from BASE
//! list.fire(&BoxedEvent::new(BasicEvent::new(SourceRef::new(()), sub.clone())))?;
//!
//! assert_eq!(list.event_listeners(&sub).iter().count(), 1);
//! assert!(list.remove_event_listener(&base, &listener));
//! # Ok::<(), ripple_core::RippleError>(())
//! ```
//!
//! # Thread Safety
//!
//! The registrations live in an immutable `Arc<Vec<_>>` that is replaced on
//! every change. Readers hold the read lock only to clone the `Arc` and then
//! iterate that snapshot unlocked; writers are serialised through an
//! upgradable read lock and only take the write lock to swap in the new
//! vector.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{Level, debug, span, trace};

use crate::error::{RippleError, RippleResult};
use crate::foundation::event::BoxedEvent;
use crate::foundation::event_type::EventType;
use crate::framework::iterator::{EventListenerIterator, EventListeners, Snapshot};
use crate::framework::listener::BoxedListener;
use crate::framework::registration::EventListenerRegistration;

/// A thread-safe registry of event listeners keyed by event type.
///
/// A listener registered for a type receives events of that type and of all
/// its descendants, never events of its super types. The same listener may be
/// registered several times, for the same or for different types; each
/// registration is delivered to independently.
pub struct EventListenerList {
    /// The current registrations, in insertion order.
    listeners: RwLock<Snapshot>,
}

impl Default for EventListenerList {
    fn default() -> Self {
        Self::new()
    }
}

impl EventListenerList {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Registers `listener` for events of `event_type` and its descendants.
    ///
    /// Fails with [`RippleError::InvalidArgument`] if either argument is
    /// `None`.
    pub fn add_event_listener<'t, 'l>(
        &self,
        event_type: impl Into<Option<&'t EventType>>,
        listener: impl Into<Option<&'l BoxedListener>>,
    ) -> RippleResult<()> {
        let event_type = event_type
            .into()
            .ok_or_else(|| RippleError::invalid_argument("event type must not be absent"))?;
        let listener = listener
            .into()
            .ok_or_else(|| RippleError::invalid_argument("event listener must not be absent"))?;

        self.push(EventListenerRegistration::new(
            event_type.clone(),
            listener.clone(),
        ));
        Ok(())
    }

    /// Adds a pre-built registration.
    ///
    /// Fails with [`RippleError::InvalidArgument`] if `registration` is `None`.
    pub fn add_registration(
        &self,
        registration: impl Into<Option<EventListenerRegistration>>,
    ) -> RippleResult<()> {
        let registration = registration.into().ok_or_else(|| {
            RippleError::invalid_argument("listener registration must not be absent")
        })?;
        self.push(registration);
        Ok(())
    }

    /// Removes one registration of `listener` for exactly `event_type`.
    ///
    /// Returns `false` if no such registration exists or an argument is `None`.
    /// Registrations of the same listener for other types are untouched.
    pub fn remove_event_listener<'t, 'l>(
        &self,
        event_type: impl Into<Option<&'t EventType>>,
        listener: impl Into<Option<&'l BoxedListener>>,
    ) -> bool {
        match (event_type.into(), listener.into()) {
            (Some(event_type), Some(listener)) => self.remove_registration(
                &EventListenerRegistration::new(event_type.clone(), listener.clone()),
            ),
            _ => false,
        }
    }

    /// Removes the first registration equal to `registration`.
    ///
    /// Returns whether a registration was removed; `None` yields `false`.
    pub fn remove_registration<'a>(
        &self,
        registration: impl Into<Option<&'a EventListenerRegistration>>,
    ) -> bool {
        let Some(registration) = registration.into() else {
            return false;
        };

        let removed = self.modify(|current| {
            let index = current.iter().position(|r| r == registration)?;
            let mut updated = current.to_vec();
            updated.remove(index);
            Some(updated)
        });

        if removed {
            debug!(event_type = %registration.event_type(), "Removed event listener");
        }
        removed
    }

    /// Delivers `event` to every listener accepting its type.
    ///
    /// Listeners run synchronously on the calling thread in registration
    /// order. If one fails, the remaining listeners are skipped and its error
    /// is returned. Fails with [`RippleError::InvalidArgument`] if `event` is
    /// `None`.
    pub fn fire<'a>(&self, event: impl Into<Option<&'a BoxedEvent>>) -> RippleResult<()> {
        let event = event
            .into()
            .ok_or_else(|| RippleError::invalid_argument("event to be fired must not be absent"))?;

        let span = span!(Level::DEBUG, "fire", event_type = %event.event_type());
        let _enter = span.enter();

        let mut iterator = self.event_listener_iter(event.event_type());
        let mut delivered = 0_usize;

        while iterator.has_next() {
            trace!(listener_index = delivered, "Invoking event listener");
            if let Err(err) = iterator.invoke_next_unchecked(event) {
                debug!(delivered, error = %err, "Event listener failed, aborting delivery");
                return Err(err);
            }
            delivered += 1;
        }

        trace!(delivered, "Event delivered");
        Ok(())
    }

    /// Returns the listeners accepting `event_type`.
    ///
    /// The result can be traversed any number of times; each traversal sees
    /// the registry as it is when the traversal starts. `None` yields no
    /// listeners.
    pub fn event_listeners<'t>(
        &self,
        event_type: impl Into<Option<&'t EventType>>,
    ) -> EventListeners<'_> {
        EventListeners::new(self, event_type.into().cloned())
    }

    /// Returns an iterator over the listeners accepting `event_type`.
    ///
    /// The iterator works on the registrations present now and is not
    /// affected by later changes.
    pub fn event_listener_iter<'t>(
        &self,
        event_type: impl Into<Option<&'t EventType>>,
    ) -> EventListenerIterator {
        EventListenerIterator::new(self.snapshot(), event_type.into().cloned())
    }

    /// Returns all registrations in insertion order.
    pub fn registrations(&self) -> Vec<EventListenerRegistration> {
        self.snapshot().to_vec()
    }

    /// Returns the registrations for `event_type` or any of its descendants.
    ///
    /// This is the inverse of the delivery rule: it lists the listeners that
    /// are interested in some specialisation of `event_type`.
    pub fn registrations_for_super_type(
        &self,
        event_type: &EventType,
    ) -> Vec<EventListenerRegistration> {
        self.snapshot()
            .iter()
            .filter(|r| r.event_type().is_instance_of(event_type))
            .cloned()
            .collect()
    }

    /// Appends all registrations of `other`, keeping their order.
    pub fn add_all(&self, other: &EventListenerList) {
        let incoming = other.snapshot();
        if incoming.is_empty() {
            return;
        }

        self.modify(|current| {
            let mut updated = Vec::with_capacity(current.len() + incoming.len());
            updated.extend_from_slice(current);
            updated.extend_from_slice(&incoming);
            Some(updated)
        });
        debug!(count = incoming.len(), "Copied event listeners");
    }

    /// Removes all registrations.
    pub fn clear(&self) {
        if self.modify(|current| (!current.is_empty()).then(Vec::new)) {
            debug!("Cleared event listeners");
        }
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.listeners.read())
    }

    fn push(&self, registration: EventListenerRegistration) {
        let event_type = registration.event_type().clone();
        self.modify(move |current| {
            let mut updated = Vec::with_capacity(current.len() + 1);
            updated.extend_from_slice(current);
            updated.push(registration);
            Some(updated)
        });
        debug!(event_type = %event_type, "Registered event listener");
    }

    /// Replaces the registrations with the vector built by `f`.
    ///
    /// `f` returns `None` to leave the registry unchanged. Returns whether a
    /// new vector was published.
    fn modify<F>(&self, f: F) -> bool
    where
        F: FnOnce(&[EventListenerRegistration]) -> Option<Vec<EventListenerRegistration>>,
    {
        let guard = self.listeners.upgradable_read();
        match f(guard.as_slice()) {
            Some(updated) => {
                let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
                *guard = Arc::new(updated);
                true
            }
            None => false,
        }
    }
}

impl Clone for EventListenerList {
    /// Creates an independent registry holding the same registrations.
    fn clone(&self) -> Self {
        Self {
            listeners: RwLock::new(self.snapshot()),
        }
    }
}

impl fmt::Debug for EventListenerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListenerList")
            .field("registration_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::event::{BasicEvent, SourceRef};
    use crate::framework::listener::into_listener;
    use parking_lot::Mutex;

    struct Fixture {
        base: EventType,
        sub1: EventType,
        sub2: EventType,
    }

    fn fixture() -> Fixture {
        let base = EventType::child("BASE", EventType::any());
        let sub1 = EventType::child("SUB1", &base);
        let sub2 = EventType::child("SUB2", &base);
        Fixture { base, sub1, sub2 }
    }

    fn event(event_type: &EventType) -> BoxedEvent {
        BoxedEvent::new(BasicEvent::new(SourceRef::new(()), event_type.clone()))
    }

    fn noop() -> BoxedListener {
        into_listener(|_| Ok(()))
    }

    /// A listener appending `tag` to a shared log.
    fn tagged(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> BoxedListener {
        let log = Arc::clone(log);
        into_listener(move |_| {
            log.lock().push(tag);
            Ok(())
        })
    }

    #[test]
    fn test_add_rejects_absent_arguments() {
        let f = fixture();
        let list = EventListenerList::new();

        let err = list.add_event_listener(None, &noop()).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = list.add_event_listener(&f.base, None).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = list.add_registration(None).unwrap_err();
        assert!(err.is_invalid_argument());

        assert!(list.is_empty());
    }

    #[test]
    fn test_fire_rejects_absent_event() {
        let list = EventListenerList::new();
        assert!(list.fire(None).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_fire_in_registration_order() {
        let f = fixture();
        let log = Arc::new(Mutex::new(Vec::new()));
        let list = EventListenerList::new();
        list.add_event_listener(&f.sub1, &tagged(&log, "sub1")).unwrap();
        list.add_event_listener(EventType::any(), &tagged(&log, "any")).unwrap();
        list.add_event_listener(&f.sub2, &tagged(&log, "sub2")).unwrap();
        list.add_event_listener(&f.base, &tagged(&log, "base")).unwrap();

        list.fire(&event(&f.sub1)).unwrap();

        assert_eq!(*log.lock(), ["sub1", "any", "base"]);
    }

    #[test]
    fn test_duplicate_registrations_each_receive() {
        let f = fixture();
        let log = Arc::new(Mutex::new(Vec::new()));
        let listener = tagged(&log, "dup");
        let list = EventListenerList::new();
        list.add_event_listener(&f.base, &listener).unwrap();
        list.add_event_listener(&f.base, &listener).unwrap();

        list.fire(&event(&f.base)).unwrap();
        assert_eq!(log.lock().len(), 2);

        assert!(list.remove_event_listener(&f.base, &listener));
        assert_eq!(list.len(), 1);
        assert!(list.remove_event_listener(&f.base, &listener));
        assert!(!list.remove_event_listener(&f.base, &listener));
    }

    #[test]
    fn test_failing_listener_stops_delivery() {
        let f = fixture();
        let log = Arc::new(Mutex::new(Vec::new()));
        let list = EventListenerList::new();
        list.add_event_listener(&f.base, &tagged(&log, "first")).unwrap();
        list.add_event_listener(&f.base, &into_listener(|_| anyhow::bail!("listener failed")))
            .unwrap();
        list.add_event_listener(&f.base, &tagged(&log, "never")).unwrap();

        let err = list.fire(&event(&f.sub2)).unwrap_err();

        assert!(matches!(err, RippleError::Listener(_)));
        assert_eq!(err.to_string(), "listener failed");
        assert_eq!(*log.lock(), ["first"]);
    }

    #[test]
    fn test_remove_absent_arguments_return_false() {
        let f = fixture();
        let list = EventListenerList::new();
        let listener = noop();
        list.add_event_listener(&f.base, &listener).unwrap();

        assert!(!list.remove_event_listener(None, &listener));
        assert!(!list.remove_event_listener(&f.base, None));
        assert!(!list.remove_registration(None));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_registration_by_value() {
        let f = fixture();
        let list = EventListenerList::new();
        let listener = noop();
        list.add_registration(EventListenerRegistration::new(
            f.sub1.clone(),
            listener.clone(),
        )).unwrap();

        let key = EventListenerRegistration::new(f.sub1.clone(), listener.clone());
        assert!(list.remove_registration(&key));
        assert!(!list.remove_registration(&key));
        assert!(list.is_empty());
    }

    #[test]
    fn test_iterator_keeps_its_snapshot() {
        let f = fixture();
        let list = EventListenerList::new();
        let first = noop();
        let second = noop();
        list.add_event_listener(&f.base, &first).unwrap();

        let mut iterator = list.event_listener_iter(&f.sub1);
        list.add_event_listener(&f.base, &second).unwrap();
        assert!(list.remove_event_listener(&f.base, &first));

        assert_eq!(iterator.next_listener().unwrap(), first);
        assert!(!iterator.has_next());

        let current: Vec<_> = list.event_listeners(&f.sub1).iter().collect();
        assert_eq!(current, [second]);
    }

    #[test]
    fn test_event_listeners_is_restartable() {
        let f = fixture();
        let list = EventListenerList::new();
        let first = noop();
        let second = noop();
        list.add_event_listener(&f.base, &first).unwrap();

        let listeners = list.event_listeners(&f.sub2);
        assert_eq!(listeners.iter().collect::<Vec<_>>(), [first.clone()]);

        list.add_event_listener(&f.sub2, &second).unwrap();
        let mut seen = Vec::new();
        for listener in &listeners {
            seen.push(listener);
        }
        assert_eq!(seen, [first, second]);
    }

    #[test]
    fn test_event_listeners_for_absent_type_is_empty() {
        let list = EventListenerList::new();
        list.add_event_listener(EventType::any(), &noop()).unwrap();
        assert_eq!(list.event_listeners(None).iter().count(), 0);
    }

    #[test]
    fn test_registrations_snapshot() {
        let f = fixture();
        let list = EventListenerList::new();
        let listener = noop();
        list.add_event_listener(&f.sub1, &listener).unwrap();
        list.add_event_listener(&f.base, &listener).unwrap();

        let registrations = list.registrations();
        assert_eq!(registrations.len(), 2);
        assert_eq!(registrations[0].event_type(), &f.sub1);
        assert_eq!(registrations[1].event_type(), &f.base);
    }

    #[test]
    fn test_registrations_for_super_type() {
        let f = fixture();
        let list = EventListenerList::new();
        let listener = noop();
        list.add_event_listener(&f.sub1, &listener).unwrap();
        list.add_event_listener(EventType::any(), &listener).unwrap();
        list.add_event_listener(&f.sub2, &listener).unwrap();
        list.add_event_listener(&f.base, &listener).unwrap();

        let types: Vec<_> = list
            .registrations_for_super_type(&f.base)
            .iter()
            .map(|r| r.event_type().name().to_string())
            .collect();
        assert_eq!(types, ["SUB1", "SUB2", "BASE"]);

        assert_eq!(list.registrations_for_super_type(&f.sub1).len(), 1);
    }

    #[test]
    fn test_add_all_and_clear() {
        let f = fixture();
        let source = EventListenerList::new();
        let listener = noop();
        source.add_event_listener(&f.sub1, &listener).unwrap();
        source.add_event_listener(&f.sub2, &listener).unwrap();

        let target = EventListenerList::new();
        target.add_event_listener(&f.base, &listener).unwrap();
        target.add_all(&source);

        let types: Vec<_> = target
            .registrations()
            .iter()
            .map(|r| r.event_type().clone())
            .collect();
        assert_eq!(types, [f.base.clone(), f.sub1.clone(), f.sub2.clone()]);

        target.clear();
        assert!(target.is_empty());
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_clone_is_independent() {
        let f = fixture();
        let list = EventListenerList::new();
        list.add_event_listener(&f.base, &noop()).unwrap();

        let copy = list.clone();
        copy.add_event_listener(&f.sub1, &noop()).unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EventListenerList>();
        assert_send_sync::<EventListenerIterator>();
    }
}
