//! Error types for gestura-core.
//!
//! Recognition outcomes are states, never errors. These cover configuration
//! calls that name recognizers the manager does not hold.

use thiserror::Error;

/// Errors returned by the manager's configuration API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    /// No recognizer with this event name or id.
    #[error("unknown recognizer: {0}")]
    UnknownRecognizer(String),

    /// A recognizer was related to itself.
    #[error("recognizer '{0}' cannot be related to itself")]
    SelfRelation(String),
}
