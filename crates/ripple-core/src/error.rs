//! Error types for the Ripple core.
//!
//! Every error except [`RippleError::Listener`] reports misuse of the registry
//! by its caller. Listener failures pass through unchanged.

use thiserror::Error;

/// Errors raised by the listener registry and its iterators.
#[derive(Debug, Error)]
pub enum RippleError {
    /// A required argument was absent or incompatible.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// The iterator has no further matching listeners.
    #[error("no more event listeners")]
    IteratorExhausted,

    /// The operation is not supported by this object.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// A listener failed while handling an event.
    #[error(transparent)]
    Listener(#[from] anyhow::Error),
}

impl RippleError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(operation: &'static str) -> Self {
        Self::UnsupportedOperation { operation }
    }

    /// Returns `true` for [`RippleError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` for [`RippleError::IteratorExhausted`].
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::IteratorExhausted)
    }

    /// Returns `true` for [`RippleError::UnsupportedOperation`].
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

/// Result type for registry operations.
pub type RippleResult<T> = Result<T, RippleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            RippleError::invalid_argument("event must not be absent").to_string(),
            "invalid argument: event must not be absent"
        );
        assert_eq!(
            RippleError::IteratorExhausted.to_string(),
            "no more event listeners"
        );
        assert_eq!(
            RippleError::unsupported("remove").to_string(),
            "unsupported operation: remove"
        );
    }

    #[test]
    fn test_listener_error_is_transparent() {
        let err = RippleError::from(anyhow::anyhow!("listener exploded"));
        assert_eq!(err.to_string(), "listener exploded");
        assert!(!err.is_invalid_argument());
    }
}
