//! Builtin environments.

mod grid_world;

pub use grid_world::GridWorld;

use crate::registry::{EnvRegistry, MakeError};

pub(crate) fn register_builtins(registry: &mut EnvRegistry) {
    registry.register("GridWorld-v0", |args| {
        let size = match args.kwargs.get("size") {
            None => GridWorld::DEFAULT_SIZE,
            Some(v) => v
                .as_u64()
                .filter(|&n| n >= 2)
                .ok_or_else(|| {
                    MakeError::construction("GridWorld-v0", format!("invalid size: {v}"))
                })? as usize,
        };
        let mut env = GridWorld::new(size);
        if let Some(v) = args.kwargs.get("max_steps") {
            let max_steps = v.as_u64().ok_or_else(|| {
                MakeError::construction("GridWorld-v0", format!("invalid max_steps: {v}"))
            })?;
            env = env.with_max_steps(max_steps);
        }
        Ok(Box::new(env))
    });
}
