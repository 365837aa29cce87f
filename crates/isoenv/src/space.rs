//! Capability descriptors and step results shared by both channel endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shape metadata for an environment's inputs or outputs.
///
/// The worker reports one of these for the observation side and one for the
/// action side during the handshake; the owner proxy exposes them without
/// another round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Space {
    /// A finite set of actions `0..n`.
    Discrete { n: u64 },

    /// A dense numeric tensor bounded elementwise by `low`/`high`.
    Box {
        low: f64,
        high: f64,
        shape: Vec<usize>,
    },
}

impl Space {
    pub fn discrete(n: u64) -> Self {
        Self::Discrete { n }
    }

    pub fn boxed(low: f64, high: f64, shape: impl Into<Vec<usize>>) -> Self {
        Self::Box {
            low,
            high,
            shape: shape.into(),
        }
    }
}

/// Full result of one environment step: `(observation, reward, done, info)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: Value,
    pub reward: f64,
    pub done: bool,
    #[serde(default)]
    pub info: serde_json::Map<String, Value>,
}

impl StepOutcome {
    pub fn new(observation: Value, reward: f64, done: bool) -> Self {
        Self {
            observation,
            reward,
            done,
            info: serde_json::Map::new(),
        }
    }

    pub fn with_info(mut self, key: impl Into<String>, value: Value) -> Self {
        self.info.insert(key.into(), value);
        self
    }
}

/// Tagged argument list for the generic invoke path and for environment
/// construction: positional values plus keyword values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: serde_json::Map<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(args: impl Into<Vec<Value>>) -> Self {
        Self {
            args: args.into(),
            kwargs: serde_json::Map::new(),
        }
    }

    pub fn arg(mut self, value: Value) -> Self {
        self.args.push(value);
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.kwargs.insert(key.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}
