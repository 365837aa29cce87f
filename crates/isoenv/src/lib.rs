//! isoenv: process-isolated simulation environments behind a transparent
//! owner-side proxy.
//!
//! A stateful environment lives alone in a worker process; the controller
//! holds an [`EnvProxy`] with the same operation surface and every call is a
//! blocking round trip over one duplex channel, one request at a time.

pub mod bridge;
mod env;
pub mod envs;
pub mod proxy;
mod registry;
mod space;
pub mod spawn;
pub mod worker;

pub use bridge::{RemoteError, Request, Response};
pub use env::{AttrLookup, EnvError, Environment};
pub use proxy::{EnvProxy, ProxyError, RemoteAttr, RemoteMethod, WorkerHandle};
pub use registry::{EnvRegistry, MakeError};
pub use space::{CallArgs, Space, StepOutcome};
pub use spawn::{CommandSpawner, EnvSpec, SPEC_ENV_VAR, SpawnError, WorkerSpawner};
pub use worker::{init_worker_logging, run_worker, serve_stdio};
