//! The wrapped-object contract implemented by every hostable environment.

use serde_json::Value;

use crate::space::{CallArgs, Space, StepOutcome};

/// Errors raised by an environment while executing a request.
///
/// The worker loop catches these and ships them back as error responses; they
/// never crash the worker.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("no method named `{0}`")]
    NoSuchMethod(String),

    #[error("{0}")]
    Other(String),
}

impl EnvError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Result of resolving a name on an environment.
///
/// A resolved method is reported as `Callable` rather than serialized; the
/// owner side turns that into a deferred remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrLookup {
    /// No attribute with that name exists.
    Missing,
    /// A plain data attribute, serialized and returned directly.
    Value(Value),
    /// The name resolves to a method; invoke it through [`Environment::invoke`].
    Callable,
}

/// A stateful simulation environment, exclusively owned by one worker loop.
///
/// The fixed operation set (`reset`, `step`, `close`, the two capability
/// descriptors) is the concrete contract; `attribute` and `invoke` form the
/// explicit forwarding surface for everything beyond it. Implementations list
/// what they expose instead of relying on reflection.
pub trait Environment: Send {
    fn observation_space(&self) -> Space;

    fn action_space(&self) -> Space;

    /// Reset to an initial state and return the initial observation.
    fn reset(&mut self) -> Result<Value, EnvError>;

    /// Advance one step with `action`.
    fn step(&mut self, action: Value) -> Result<StepOutcome, EnvError>;

    /// Release any resources. Called exactly once by the worker loop, on
    /// `Close` or on channel loss.
    fn close(&mut self) -> Result<(), EnvError>;

    /// Resolve `name` to a data attribute or a callable marker.
    fn attribute(&self, name: &str) -> AttrLookup {
        let _ = name;
        AttrLookup::Missing
    }

    /// Invoke the method `name` with `args`.
    fn invoke(&mut self, name: &str, args: CallArgs) -> Result<Value, EnvError> {
        let _ = args;
        Err(EnvError::NoSuchMethod(name.to_string()))
    }
}

impl std::fmt::Debug for dyn Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment").finish_non_exhaustive()
    }
}
