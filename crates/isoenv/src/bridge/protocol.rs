//! Wire protocol for the owner-worker channel.
//!
//! One duplex channel, strict request/response alternation: the owner never
//! sends a second request before reading the response to the first, so no
//! correlation ids are needed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::space::{Space, StepOutcome};

/// Requests from the owner proxy to the worker loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Advance the environment by one step.
    Step { action: Value },

    /// Reset the environment to an initial state.
    Reset,

    /// Tear down the environment and exit the worker. No response follows;
    /// the owner joins the worker process instead.
    Close,

    /// Resolve a name on the environment.
    GetAttribute { name: String },

    /// Invoke a method on the environment.
    CallMethod {
        name: String,
        #[serde(default)]
        args: Vec<Value>,
        #[serde(default)]
        kwargs: serde_json::Map<String, Value>,
    },
}

/// Responses from the worker loop to the owner proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Mandatory handshake, sent exactly once as the worker's first message
    /// after the environment is constructed.
    Ready {
        observation_space: Space,
        action_space: Space,
    },

    /// Result of a `Step` request.
    Step { outcome: StepOutcome },

    /// A serialized attribute value or method result.
    Value { value: Value },

    /// The requested attribute is a method; call it instead of reading it.
    Callable,

    /// A carried error, reconstructed into a native error on the owner side.
    Error { error: RemoteError },
}

/// Errors that cross the channel as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteError {
    #[error("attribute `{name}` not found")]
    AttributeNotFound { name: String },

    #[error("`{name}` failed: {message}")]
    Invocation { name: String, message: String },

    #[error("environment construction failed: {message}")]
    Construction { message: String },
}

impl RemoteError {
    pub fn attribute_not_found(name: impl Into<String>) -> Self {
        Self::AttributeNotFound { name: name.into() }
    }

    pub fn invocation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invocation {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn construction(message: impl Into<String>) -> Self {
        Self::Construction {
            message: message.into(),
        }
    }
}
