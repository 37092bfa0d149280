use crate::entity::{EntityId, GroupId};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by the entity graph and its timing primitives.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A meter with a zero span has no defined ratio.
    #[error("meter \"{0}\" has a zero span, ratio is undefined")]
    ZeroSpan(String),

    /// A timer was created with a non-positive duration.
    #[error("timer \"{name}\" needs a positive duration, got {duration}")]
    BadDuration {
        /// Name of the offending timer.
        name: String,
        /// The rejected duration.
        duration: f64,
    },

    /// A meter was created with its maximum below its minimum.
    #[error("meter \"{name}\" range is inverted: {minimum} > {maximum}")]
    BadRange {
        /// Name of the offending meter.
        name: String,
        /// The requested minimum.
        minimum: f64,
        /// The requested maximum.
        maximum: f64,
    },

    /// An entity id did not resolve to a live entity.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A group id did not resolve to a live group.
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// A model name was already taken and the duplicate policy rejects.
    #[error("name already registered: \"{0}\"")]
    DuplicateName(String),

    /// A setter or handler was invoked with arguments it cannot use.
    #[error("bad arguments to {method}: {message}")]
    Arguments {
        /// The setter or handler that rejected its arguments.
        method: String,
        /// What was wrong with them.
        message: String,
    },
}

impl CoreError {
    /// Shorthand for an [`CoreError::Arguments`] value.
    pub fn arguments(method: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Arguments {
            method: method.into(),
            message: message.into(),
        }
    }
}
