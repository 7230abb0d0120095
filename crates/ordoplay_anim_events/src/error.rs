// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised by event subscription and dispatch.

use crate::event::EventId;
use thiserror::Error;

/// Misuse of an event-capable entity, or a failing handler
#[derive(Debug, Error)]
pub enum EventError {
    /// The handler table was never initialized
    #[error("{owner} is not initialized with handlers, call init_handlers in its constructor")]
    NotInitialized {
        /// Type name of the entity
        owner: &'static str,
    },

    /// The event is outside the entity's capability set
    #[error("event '{event}' is not provided by {owner}")]
    UnsupportedEvent {
        /// Requested event
        event: EventId,
        /// Type name of the entity
        owner: &'static str,
    },

    /// No handler was supplied
    #[error("trying to assign an undefined handler for event '{event}'")]
    InvalidHandler {
        /// Event the handler was meant for
        event: EventId,
    },

    /// Nothing is subscribed under this handle
    #[error("no such handler {subscription} for event '{event}'")]
    UnknownHandler {
        /// Event the handle was unbound from
        event: EventId,
        /// Raw subscription handle
        subscription: u64,
    },

    /// A handler failed; the remaining handlers were not invoked
    #[error("handler for event '{event}' failed: {source}")]
    Handler {
        /// Event being dispatched
        event: EventId,
        /// Error returned by the handler
        #[source]
        source: HandlerError,
    },
}

/// Error returned from user event handlers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Create a handler error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message carried by this error
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for HandlerError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for HandlerError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Result type returned by event handlers
pub type HandlerResult = std::result::Result<(), HandlerError>;
