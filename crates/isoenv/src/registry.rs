//! Registry resolving environment identifiers to factories.

use std::collections::HashMap;

use crate::env::Environment;
use crate::space::CallArgs;

/// Errors while resolving an identifier or constructing an environment.
#[derive(Debug, thiserror::Error)]
pub enum MakeError {
    #[error("no environment registered as `{id}`")]
    UnknownEnv { id: String },

    #[error("failed to construct `{id}`: {message}")]
    Construction { id: String, message: String },
}

impl MakeError {
    pub fn construction(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            id: id.into(),
            message: message.into(),
        }
    }
}

type EnvFactory = Box<dyn Fn(CallArgs) -> Result<Box<dyn Environment>, MakeError> + Send + Sync>;

/// Maps environment identifiers (e.g. `"GridWorld-v0"`) to factories.
///
/// The worker resolves the identifier it was spawned with against its own
/// registry, so the concrete environment type never crosses the channel.
#[derive(Default)]
pub struct EnvRegistry {
    factories: HashMap<String, EnvFactory>,
}

impl EnvRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the builtin environments.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::envs::register_builtins(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(CallArgs) -> Result<Box<dyn Environment>, MakeError> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Construct the environment registered as `id`, forwarding `args`
    /// verbatim to its factory.
    pub fn make(&self, id: &str, args: CallArgs) -> Result<Box<dyn Environment>, MakeError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| MakeError::UnknownEnv { id: id.to_string() })?;
        factory(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::GridWorld;
    use serde_json::json;

    #[test]
    fn builtins_include_grid_world() {
        let registry = EnvRegistry::with_builtins();
        assert!(registry.contains("GridWorld-v0"));
    }

    #[test]
    fn unknown_id_is_an_error() {
        let registry = EnvRegistry::with_builtins();
        let err = registry.make("Atlantis-v0", CallArgs::new()).unwrap_err();
        assert!(matches!(err, MakeError::UnknownEnv { id } if id == "Atlantis-v0"));
    }

    #[test]
    fn factory_receives_creation_args() {
        let registry = EnvRegistry::with_builtins();
        let env = registry
            .make("GridWorld-v0", CallArgs::new().kwarg("size", json!(6)))
            .unwrap();
        assert_eq!(
            env.observation_space(),
            crate::space::Space::boxed(0.0, 1.0, [6, 6])
        );
    }

    #[test]
    fn custom_registration() {
        let mut registry = EnvRegistry::new();
        registry.register("Custom-v0", |args| {
            let size = args
                .kwargs
                .get("size")
                .and_then(|v| v.as_u64())
                .unwrap_or(4) as usize;
            Ok(Box::new(GridWorld::new(size)))
        });
        assert!(registry.contains("Custom-v0"));
        assert!(registry.make("Custom-v0", CallArgs::new()).is_ok());
    }
}
