//! # Ripple
//!
//! A hierarchical, thread-safe event listener registry for Rust.
//!
//! ## Overview
//!
//! Events carry an [`EventType`](core::EventType) from a single-rooted type
//! tree. Listeners register for a type and receive events of that type and of
//! every type derived from it. Registration, removal and delivery may run
//! concurrently from any number of threads.
//!
//! ```text
//! ┌──────────┐   fire(event)   ┌───────────────────┐   ancestors(SUB1) = {SUB1, BASE, ANY}
//! │  Caller  │────────────────▶│ EventListenerList │──▶ listener for BASE
//! └──────────┘                 │   (COW snapshot)  │──▶ listener for SUB1
//!                              └───────────────────┘   (listener for SUB2 skipped)
//! ```
//!
//! - **Core**: Event types, events, listeners and the registry (`ripple-core`)
//! - **Runtime**: Configuration loading and logging setup (`ripple-runtime`)
//!
//! ## Quick Start
//!
//! ```rust
//! use ripple::prelude::*;
//!
//! let base = EventType::child("BASE", EventType::any());
//! let sub = EventType::child("SUB", &base);
//!
//! let listeners = EventListenerList::new();
//! listeners.add_event_listener(&base, &into_listener(|event| {
//!     info!(event_type = %event.event_type(), "Received event");
//!     Ok(())
//! }))?;
//!
//! listeners.fire(&BoxedEvent::new(BasicEvent::new(SourceRef::new("app"), sub)))?;
//! # Ok::<(), RippleError>(())
//! ```
//!
//! ## Features
//!
//! - `toml-config`: Load configuration from TOML files (default)
//! - `yaml-config`: Load configuration from YAML files
//! - `json-log`: Enable JSON log output

pub use ripple_core as core;
pub use ripple_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use ripple::prelude::*;
/// ```
pub mod prelude {
    // Event types and events
    pub use ripple_core::{AncestorSet, BasicEvent, BoxedEvent, Event, EventType, SourceRef};

    // Listeners and the registry
    pub use ripple_core::{
        BoxedListener, EventListener, EventListenerIterator, EventListenerList,
        EventListenerRegistration, into_listener,
    };

    // Errors
    pub use ripple_core::{RippleError, RippleResult};

    // Application setup
    pub use ripple_runtime::{ConfigLoader, LoggingBuilder, RippleConfig, SpanEvents};

    // Logging macros
    pub use ripple_runtime::prelude::*;
}
