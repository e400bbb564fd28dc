//! Foundation layer - Core abstractions and type system.
//!
//! This module contains the building blocks every other layer relies on:
//! - The event type hierarchy used for matching
//! - Event payloads and their sources

pub mod event;
pub mod event_type;

pub use event::{BasicEvent, BoxedEvent, Event, SourceRef};
pub use event_type::{AncestorSet, EventType};
