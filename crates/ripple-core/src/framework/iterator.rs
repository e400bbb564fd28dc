//! Iteration over matching listeners.
//!
//! An [`EventListenerIterator`] walks one snapshot of a registry and yields
//! the listeners whose registered type accepts the iterator's *base* type,
//! that is, every registration whose type is the base type or one of its
//! super types. The first match is located eagerly when the iterator is built.
//!
//! ```text
//!            has_next() == true
//!   ┌──────────────┐   next_listener()   ┌───────────┐
//!   │ next staged  │ ──────────────────▶ │ exhausted │
//!   └──────────────┘  (no further match) └───────────┘
//!        ▲    │                               │
//!        └────┘ next_listener()               └─▶ Err(IteratorExhausted)
//!        (further match found)
//! ```
//!
//! [`EventListeners`] is the restartable counterpart: every traversal starts a
//! fresh iterator over the registry as it is at that moment.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::error::{RippleError, RippleResult};
use crate::foundation::event::BoxedEvent;
use crate::foundation::event_type::{AncestorSet, EventType};
use crate::framework::listener::BoxedListener;
use crate::framework::registration::EventListenerRegistration;
use crate::framework::registry::EventListenerList;

/// Immutable view of a registry's registrations.
pub(crate) type Snapshot = Arc<Vec<EventListenerRegistration>>;

/// A single-pass iterator over the listeners accepting a base event type.
///
/// The iterator is bound to the snapshot taken when it was created; later
/// changes to the registry are not visible through it. Once exhausted it
/// stays exhausted.
pub struct EventListenerIterator {
    snapshot: Snapshot,
    position: usize,
    base_type: Option<EventType>,
    accepted: AncestorSet,
    next_element: Option<BoxedListener>,
}

impl EventListenerIterator {
    pub(crate) fn new(snapshot: Snapshot, base_type: Option<EventType>) -> Self {
        let accepted = base_type
            .as_ref()
            .map(AncestorSet::of)
            .unwrap_or_default();

        let mut iterator = Self {
            snapshot,
            position: 0,
            base_type,
            accepted,
            next_element: None,
        };
        iterator.init_next_element();
        iterator
    }

    /// Returns the event type this iteration was created for.
    pub fn base_type(&self) -> Option<&EventType> {
        self.base_type.as_ref()
    }

    /// Returns `true` if another matching listener is available.
    pub fn has_next(&self) -> bool {
        self.next_element.is_some()
    }

    /// Returns the next matching listener.
    ///
    /// Fails with [`RippleError::IteratorExhausted`] once all matches have
    /// been returned.
    pub fn next_listener(&mut self) -> RippleResult<BoxedListener> {
        let result = self
            .next_element
            .take()
            .ok_or(RippleError::IteratorExhausted)?;
        self.init_next_element();
        Ok(result)
    }

    /// Removing listeners through the iterator is not supported.
    ///
    /// Always fails with [`RippleError::UnsupportedOperation`]; use
    /// [`EventListenerList::remove_event_listener`] instead.
    pub fn remove(&mut self) -> RippleResult<()> {
        Err(RippleError::unsupported("remove"))
    }

    /// Invokes the next matching listener with `event`.
    ///
    /// The event's type must be the base type of this iteration or one of its
    /// descendants; an absent or incompatible event fails with
    /// [`RippleError::InvalidArgument`] and leaves the iterator where it was.
    /// A listener failure is returned as [`RippleError::Listener`].
    pub fn invoke_next<'a>(
        &mut self,
        event: impl Into<Option<&'a BoxedEvent>>,
    ) -> RippleResult<()> {
        let event = self.validate_event(event.into())?;
        self.invoke_next_unchecked(event)
    }

    /// Invokes the next listener without checking the event.
    ///
    /// Callers must guarantee that `event` is compatible with the base type.
    pub(crate) fn invoke_next_unchecked(&mut self, event: &BoxedEvent) -> RippleResult<()> {
        let listener = self.next_listener()?;
        listener.call(event).map_err(RippleError::Listener)
    }

    /// Stages the next registration in the snapshot accepted by the base type.
    fn init_next_element(&mut self) {
        self.next_element = None;
        while let Some(registration) = self.snapshot.get(self.position) {
            self.position += 1;
            if self.accepted.contains(registration.event_type()) {
                self.next_element = Some(registration.listener().clone());
                break;
            }
        }
    }

    fn validate_event<'a>(&self, event: Option<&'a BoxedEvent>) -> RippleResult<&'a BoxedEvent> {
        let Some(event) = event else {
            return Err(RippleError::invalid_argument(
                "event passed to listener iteration must not be absent",
            ));
        };

        match &self.base_type {
            Some(base) if event.event_type().is_instance_of(base) => Ok(event),
            base => Err(RippleError::invalid_argument(format!(
                "event of type {} incompatible with listener iteration for {}",
                event.event_type(),
                base.as_ref().map_or("<none>", EventType::name)
            ))),
        }
    }
}

impl Iterator for EventListenerIterator {
    type Item = BoxedListener;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_listener().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.has_next() {
            let unscanned = self.snapshot.len() - self.position;
            (1, Some(unscanned + 1))
        } else {
            (0, Some(0))
        }
    }
}

impl FusedIterator for EventListenerIterator {}

impl fmt::Debug for EventListenerIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListenerIterator")
            .field("base_type", &self.base_type.as_ref().map(EventType::name))
            .field("position", &self.position)
            .field("snapshot_len", &self.snapshot.len())
            .field("has_next", &self.has_next())
            .finish()
    }
}

// ============================================================================
// Restartable listener sequence
// ============================================================================

/// The listeners of a registry that accept a given event type.
///
/// Returned by [`EventListenerList::event_listeners`]. Each call to
/// [`iter`](Self::iter) or each `for` loop over `&EventListeners` starts over
/// from the registry's current contents.
#[derive(Clone)]
pub struct EventListeners<'a> {
    list: &'a EventListenerList,
    event_type: Option<EventType>,
}

impl<'a> EventListeners<'a> {
    pub(crate) fn new(list: &'a EventListenerList, event_type: Option<EventType>) -> Self {
        Self { list, event_type }
    }

    /// Starts a new traversal over the registry as it is now.
    pub fn iter(&self) -> EventListenerIterator {
        self.list.event_listener_iter(self.event_type.as_ref())
    }
}

impl IntoIterator for &EventListeners<'_> {
    type Item = BoxedListener;
    type IntoIter = EventListenerIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for EventListeners<'_> {
    type Item = BoxedListener;
    type IntoIter = EventListenerIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for EventListeners<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("event_type", &self.event_type.as_ref().map(EventType::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::event::{BasicEvent, SourceRef};
    use crate::framework::listener::into_listener;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    fn registration(event_type: &EventType, listener: &BoxedListener) -> EventListenerRegistration {
        EventListenerRegistration::new(event_type.clone(), listener.clone())
    }

    fn event(event_type: &EventType) -> BoxedEvent {
        BoxedEvent::new(BasicEvent::new(SourceRef::new(()), event_type.clone()))
    }

    #[test]
    fn test_filters_by_ancestor_set_in_order() {
        let f = fixture();
        let l1 = into_listener(|_| Ok(()));
        let l2 = into_listener(|_| Ok(()));
        let l3 = into_listener(|_| Ok(()));
        let l4 = into_listener(|_| Ok(()));
        let snapshot = Arc::new(vec![
            registration(&f.sub1, &l1),
            registration(&f.sub2, &l2),
            registration(EventType::any(), &l3),
            registration(&f.base, &l4),
        ]);

        let matched: Vec<_> = EventListenerIterator::new(snapshot, Some(f.sub1)).collect();
        assert_eq!(matched, [l1, l3, l4]);
    }

    #[test]
    fn test_absent_base_type_matches_nothing() {
        let f = fixture();
        let listener = into_listener(|_| Ok(()));
        let snapshot = Arc::new(vec![registration(EventType::any(), &listener)]);

        let mut iterator = EventListenerIterator::new(snapshot, None);
        assert!(!iterator.has_next());
        assert!(iterator.base_type().is_none());
        assert!(iterator.invoke_next(&event(&f.base)).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_next_listener_past_end_fails() {
        let f = fixture();
        let listener = into_listener(|_| Ok(()));
        let snapshot = Arc::new(vec![registration(&f.base, &listener)]);
        let mut iterator = EventListenerIterator::new(snapshot, Some(f.base));

        assert_eq!(iterator.next_listener().unwrap(), listener);
        assert!(iterator.next_listener().unwrap_err().is_exhausted());
        assert!(iterator.next().is_none());
    }

    #[test]
    fn test_remove_is_unsupported() {
        let f = fixture();
        let listener = into_listener(|_| Ok(()));
        let snapshot = Arc::new(vec![registration(&f.base, &listener)]);
        let mut iterator = EventListenerIterator::new(snapshot, Some(f.base));

        assert!(iterator.remove().unwrap_err().is_unsupported());
        assert!(iterator.has_next());
    }

    #[test]
    fn test_invoke_next_validates_against_base_type() {
        let f = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let listener = into_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let snapshot = Arc::new(vec![registration(&f.base, &listener)]);
        let mut iterator = EventListenerIterator::new(snapshot, Some(f.sub2.clone()));

        // Base type of the iteration is SUB2, so a BASE event is rejected even
        // though the listener itself was registered for BASE.
        let err = iterator.invoke_next(&event(&f.base)).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(iterator.has_next());

        let err = iterator.invoke_next(None).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(iterator.has_next());

        iterator.invoke_next(&event(&f.sub2)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!iterator.has_next());
    }

    #[test]
    fn test_invoke_next_accepts_descendant_events() {
        let f = fixture();
        let listener = into_listener(|_| Ok(()));
        let snapshot = Arc::new(vec![registration(&f.base, &listener)]);
        let mut iterator = EventListenerIterator::new(snapshot, Some(f.base));

        iterator.invoke_next(&event(&f.sub1)).unwrap();
        assert!(iterator.invoke_next(&event(&f.sub1)).unwrap_err().is_exhausted());
    }

    #[test]
    fn test_listener_error_surfaces() {
        let f = fixture();
        let listener = into_listener(|_| anyhow::bail!("boom"));
        let snapshot = Arc::new(vec![registration(&f.base, &listener)]);
        let mut iterator = EventListenerIterator::new(snapshot, Some(f.base.clone()));

        let err = iterator.invoke_next(&event(&f.base)).unwrap_err();
        assert!(matches!(err, RippleError::Listener(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_size_hint_bounds() {
        let f = fixture();
        let listener = into_listener(|_| Ok(()));
        let snapshot = Arc::new(vec![
            registration(&f.base, &listener),
            registration(&f.sub2, &listener),
            registration(&f.base, &listener),
        ]);
        let mut iterator = EventListenerIterator::new(snapshot, Some(f.base));

        assert_eq!(iterator.size_hint(), (1, Some(3)));
        iterator.next();
        iterator.next();
        assert_eq!(iterator.size_hint(), (0, Some(0)));
    }
}
