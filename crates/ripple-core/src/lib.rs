//! # Ripple Core
//!
//! The core of the Ripple event system: an in-process registry that delivers
//! events to listeners selected through a hierarchy of event types.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! Core abstractions and type system:
//! - **Event Types**: Identity-compared nodes in a type tree ([`EventType`], [`AncestorSet`])
//! - **Events**: Type-erased payloads with runtime downcasting ([`Event`], [`BoxedEvent`])
//!
//! ### Framework Layer
//!
//! Registration and delivery:
//! - **Listeners**: Single-method callbacks ([`EventListener`], [`BoxedListener`])
//! - **Registrations**: `(type, listener)` pairs ([`EventListenerRegistration`])
//! - **Registry**: Thread-safe copy-on-write listener list ([`EventListenerList`])
//! - **Iteration**: Snapshot-bound matching ([`EventListenerIterator`])
//!
//! ## Hierarchical Delivery
//!
//! A listener registered for a type receives events of that type and of every
//! type below it:
//!
//! ```text
//!            ANY ◀──────────── listener A
//!             │
//!           BASE ◀──────────── listener B
//!          ┌──┴───┐
//!        SUB1    SUB2 ◀─────── listener C
//!
//!  fire(SUB2) ─▶ A, B, C      fire(SUB1) ─▶ A, B      fire(BASE) ─▶ A, B
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ripple_core::{BasicEvent, BoxedEvent, EventListenerList, EventType, SourceRef, into_listener};
//!
//! let base = EventType::child("BASE", EventType::any());
//! let sub = EventType::child("SUB", &base);
//!
//! let list = EventListenerList::new();
//! list.add_event_listener(&base, &into_listener(|event| {
//!     println!("{} event from {:?}", event.event_type(), event.source());
//!     Ok(())
//! }))?;
//!
//! list.fire(&BoxedEvent::new(BasicEvent::new(SourceRef::new("demo"), sub)))?;
//! # Ok::<(), ripple_core::RippleError>(())
//! ```

// Architectural layers
pub mod error;
pub mod foundation;
pub mod framework;

pub use error::{RippleError, RippleResult};

// Re-export foundation types
pub use foundation::{AncestorSet, BasicEvent, BoxedEvent, Event, EventType, SourceRef};

// Re-export framework types
pub use framework::{
    BoxedListener, EventListener, EventListenerIterator, EventListenerList,
    EventListenerRegistration, EventListeners, ListenerFn, into_listener,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::{RippleError, RippleResult};
    pub use super::foundation::*;
    pub use super::framework::{
        BoxedListener, EventListener, EventListenerList, EventListenerRegistration, into_listener,
    };
}
