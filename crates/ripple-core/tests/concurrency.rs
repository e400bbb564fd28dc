//! Concurrent registration and delivery.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use ripple_core::{
    BasicEvent, BoxedEvent, BoxedListener, EventListenerList, EventType, SourceRef, into_listener,
};

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

fn counting_listener(counter: &Arc<AtomicUsize>) -> BoxedListener {
    let counter = Arc::clone(counter);
    into_listener(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn event(event_type: &EventType) -> BoxedEvent {
    BoxedEvent::new(BasicEvent::new(SourceRef::new("concurrency"), event_type.clone()))
}

#[test]
fn concurrent_adds_are_not_lost() {
    let base = EventType::child("BASE", EventType::any());
    let list = EventListenerList::new();
    let counter = Arc::new(AtomicUsize::new(0));

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..PER_THREAD {
                    list.add_event_listener(&base, &counting_listener(&counter))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(list.len(), THREADS * PER_THREAD);

    list.fire(&event(&base)).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), THREADS * PER_THREAD);
}

#[test]
fn concurrent_add_and_remove() {
    let base = EventType::child("BASE", EventType::any());
    let list = EventListenerList::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let doomed: Vec<_> = (0..THREADS * PER_THREAD)
        .map(|_| counting_listener(&counter))
        .collect();
    for listener in &doomed {
        list.add_event_listener(&base, listener).unwrap();
    }

    thread::scope(|scope| {
        for chunk in doomed.chunks(PER_THREAD) {
            let list = &list;
            let base = &base;
            scope.spawn(move || {
                for listener in chunk {
                    assert!(list.remove_event_listener(base, listener));
                }
            });
        }
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..PER_THREAD {
                    list.add_event_listener(&base, &counting_listener(&counter))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(list.len(), THREADS * PER_THREAD);
    assert!(
        list.registrations()
            .iter()
            .all(|r| !doomed.contains(r.listener()))
    );
}

#[test]
fn fire_while_registering() {
    let base = EventType::child("BASE", EventType::any());
    let sub = EventType::child("SUB", &base);
    let list = EventListenerList::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let fired = AtomicUsize::new(0);

    list.add_event_listener(&base, &counting_listener(&counter))
        .unwrap();

    thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..PER_THREAD {
                list.add_event_listener(&sub, &counting_listener(&counter))
                    .unwrap();
            }
        });
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..PER_THREAD {
                    list.fire(&event(&sub)).unwrap();
                    fired.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    // Each fire reached at least the listener that was there from the start
    // and at most every listener ever added.
    let fired = fired.load(Ordering::SeqCst);
    let delivered = counter.load(Ordering::SeqCst);
    assert_eq!(fired, THREADS * PER_THREAD);
    assert!(delivered >= fired);
    assert!(delivered <= fired * (PER_THREAD + 1));
}

#[test]
fn iterator_is_isolated_from_concurrent_changes() {
    let base = EventType::child("BASE", EventType::any());
    let list = EventListenerList::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let first = counting_listener(&counter);
    list.add_event_listener(&base, &first).unwrap();

    let iterator = list.event_listener_iter(&base);

    thread::scope(|scope| {
        scope.spawn(|| {
            assert!(list.remove_event_listener(&base, &first));
            for _ in 0..PER_THREAD {
                list.add_event_listener(&base, &counting_listener(&counter))
                    .unwrap();
            }
        });
    });

    let seen: Vec<_> = iterator.collect();
    assert_eq!(seen, [first]);
    assert_eq!(list.len(), PER_THREAD);
}

#[test]
fn listener_may_mutate_registry_during_delivery() {
    let base = EventType::child("BASE", EventType::any());
    let list = Arc::new(EventListenerList::new());
    let counter = Arc::new(AtomicUsize::new(0));

    let late = counting_listener(&counter);
    let registering = {
        let list = Arc::clone(&list);
        let base = base.clone();
        let late = late.clone();
        into_listener(move |_| {
            list.add_event_listener(&base, &late)?;
            Ok(())
        })
    };
    list.add_event_listener(&base, &registering).unwrap();

    // The listener added during delivery is not part of the running snapshot.
    list.fire(&event(&base)).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(list.len(), 2);

    list.fire(&event(&base)).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(list.len(), 3);
}
