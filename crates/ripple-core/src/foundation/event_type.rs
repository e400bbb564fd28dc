//! Event type hierarchy.
//!
//! Every event carries an [`EventType`], a node in a rooted tree of type
//! descriptors. Listeners are registered against an event type and receive all
//! events whose type is that node or one of its descendants.
//!
//! ```text
//! ANY
//! └── CONFIGURATION
//!     ├── ADD_PROPERTY
//!     └── CLEAR_PROPERTY
//! ```
//!
//! # Identity
//!
//! Event types compare by identity, not by name. Two nodes created with the
//! same name are different types; clones of one node are the same type. The
//! name exists only for diagnostics.
//!
//! # Example
//!
//! ```rust
//! use ripple_core::EventType;
//!
//! let base = EventType::child("BASE", EventType::any());
//! let sub = EventType::child("SUB", &base);
//!
//! assert!(sub.is_instance_of(&base));
//! assert!(!base.is_instance_of(&sub));
//! assert_eq!(sub.super_type(), Some(&base));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

/// The universal root of the event type tree.
static ANY: LazyLock<EventType> = LazyLock::new(|| EventType::root("ANY"));

struct EventTypeNode {
    name: String,
    super_type: Option<EventType>,
}

/// A node in the event type hierarchy.
///
/// `EventType` is a cheap handle: cloning it yields the same node. Nodes are
/// immutable once created, and a parent must exist before its children, so the
/// chain of super types is always finite.
#[derive(Clone)]
pub struct EventType {
    node: Arc<EventTypeNode>,
}

impl EventType {
    /// Creates a new event type with an optional super type.
    pub fn new(name: impl Into<String>, super_type: Option<&EventType>) -> Self {
        Self {
            node: Arc::new(EventTypeNode {
                name: name.into(),
                super_type: super_type.cloned(),
            }),
        }
    }

    /// Creates a new root event type.
    ///
    /// Most hierarchies hang off [`EventType::any`] instead; separate roots
    /// form independent trees whose listeners never see each other's events.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Creates a new event type derived from `super_type`.
    pub fn child(name: impl Into<String>, super_type: &EventType) -> Self {
        Self::new(name, Some(super_type))
    }

    /// Returns the process-wide root type named `ANY`.
    ///
    /// A listener registered for this type receives every event whose type
    /// descends from it.
    pub fn any() -> &'static EventType {
        &ANY
    }

    /// Returns the display name of this type.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Returns the parent of this type, or `None` for a root.
    pub fn super_type(&self) -> Option<&EventType> {
        self.node.super_type.as_ref()
    }

    /// Iterates from this type up to its root, starting with `self`.
    pub fn lineage(&self) -> impl Iterator<Item = &EventType> + '_ {
        std::iter::successors(Some(self), |current| current.super_type())
    }

    /// Collects this type and all of its super types.
    pub fn ancestors(&self) -> AncestorSet {
        AncestorSet::of(self)
    }

    /// Returns `true` if `base` is this type or one of its super types.
    pub fn is_instance_of(&self, base: &EventType) -> bool {
        self.lineage().any(|current| current == base)
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.node), state);
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventType")
            .field("name", &self.name())
            .field("super_type", &self.super_type().map(EventType::name))
            .finish()
    }
}

// ============================================================================
// Ancestor Set
// ============================================================================

/// An event type together with all of its super types.
///
/// A listener registered for type `R` accepts an event of type `Q` exactly
/// when `R` is a member of `Q`'s ancestor set.
#[derive(Debug, Clone, Default)]
pub struct AncestorSet {
    types: HashSet<EventType>,
}

impl AncestorSet {
    /// Builds the ancestor set of `event_type` by walking its parent links.
    pub fn of(event_type: &EventType) -> Self {
        Self {
            types: event_type.lineage().cloned().collect(),
        }
    }

    /// Returns a set that accepts nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if `event_type` is a member of this set.
    pub fn contains(&self, event_type: &EventType) -> bool {
        self.types.contains(event_type)
    }

    /// Returns the number of types in this set.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over the members in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &EventType> {
        self.types.iter()
    }
}

impl From<&EventType> for AncestorSet {
    fn from(event_type: &EventType) -> Self {
        Self::of(event_type)
    }
}
