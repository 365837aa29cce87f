//! Worker process spawning and creation-parameter handoff.
//!
//! The owner passes the creation parameters to the worker process through a
//! single JSON environment variable; the worker reads it back before it
//! constructs the environment. The channel itself is the child's piped
//! stdin/stdout.

use std::path::PathBuf;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::{Child, Command};

use crate::space::CallArgs;

/// Environment variable carrying the serialized [`EnvSpec`] to the worker.
pub const SPEC_ENV_VAR: &str = "ISOENV_SPEC";

/// Creation parameters for one wrapped environment: the registry identifier
/// plus the arguments forwarded verbatim to its factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvSpec {
    pub id: String,
    #[serde(default)]
    pub args: CallArgs,
}

impl EnvSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            args: CallArgs::new(),
        }
    }

    pub fn with_args(mut self, args: CallArgs) -> Self {
        self.args = args;
        self
    }

    pub fn with_arg(mut self, value: Value) -> Self {
        self.args.args.push(value);
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.kwargs.insert(key.into(), value);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to encode environment spec: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Extension point for different worker spawn strategies.
pub trait WorkerSpawner: Send + Sync {
    fn spawn(&self, spec: &EnvSpec) -> Result<Child, SpawnError>;
}

/// Spawns a worker binary with the spec in [`SPEC_ENV_VAR`] and stdin/stdout
/// piped for the channel. Stderr is inherited so worker logs reach the
/// controller's terminal.
pub struct CommandSpawner {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSpawner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Spawn the currently running executable as the worker.
    ///
    /// Useful when one binary embeds both the controller and, guarded by
    /// [`SPEC_ENV_VAR`], the worker entry.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl WorkerSpawner for CommandSpawner {
    fn spawn(&self, spec: &EnvSpec) -> Result<Child, SpawnError> {
        let encoded = serde_json::to_string(spec)?;
        tracing::debug!(program = %self.program.display(), env_id = %spec.id, "Spawning worker");
        let child = Command::new(&self.program)
            .args(&self.args)
            .env(SPEC_ENV_VAR, encoded)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;
        Ok(child)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpecEnvError {
    #[error("{SPEC_ENV_VAR} is not set; this process was not spawned as a worker")]
    Missing,

    #[error("failed to decode {SPEC_ENV_VAR}: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read the [`EnvSpec`] this worker process was spawned with.
pub fn spec_from_env() -> Result<EnvSpec, SpecEnvError> {
    let raw = std::env::var(SPEC_ENV_VAR).map_err(|_| SpecEnvError::Missing)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spec_roundtrips_through_json() {
        let spec = EnvSpec::new("GridWorld-v0")
            .with_arg(json!("render"))
            .with_kwarg("size", json!(4));
        let encoded = serde_json::to_string(&spec).unwrap();
        let decoded: EnvSpec = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.id, "GridWorld-v0");
        assert_eq!(decoded.args.args, vec![json!("render")]);
        assert_eq!(decoded.args.kwargs.get("size"), Some(&json!(4)));
    }

    #[test]
    fn spec_args_default_when_absent() {
        let decoded: EnvSpec = serde_json::from_str(r#"{"id":"GridWorld-v0"}"#).unwrap();
        assert!(decoded.args.is_empty());
    }
}
