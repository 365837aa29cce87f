//! Worker loop - runs inside the worker process and owns the environment.
//!
//! Lifecycle: construct the environment from the supplied creation
//! parameters, send the mandatory `Ready` handshake, then serve requests one
//! at a time until `Close`. A failing environment call never crashes the
//! loop; the error is shipped back as a response and the loop keeps serving.

use std::io;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, stdin, stdout};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::bridge::codec::JsonCodec;
use crate::bridge::protocol::{RemoteError, Request, Response};
use crate::env::{AttrLookup, Environment};
use crate::registry::EnvRegistry;
use crate::space::CallArgs;
use crate::spawn::{EnvSpec, spec_from_env};

/// Run the worker loop over an arbitrary duplex channel.
///
/// Returns once the owner sends `Close`, once the request channel closes, or
/// on a channel write error. The environment's teardown runs in all three
/// cases.
pub async fn run_worker<R, W>(
    registry: &EnvRegistry,
    spec: EnvSpec,
    reader: R,
    writer: W,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut requests = FramedRead::new(reader, JsonCodec::<Request>::new());
    let mut responses = FramedWrite::new(writer, JsonCodec::<Response>::new());

    tracing::info!(env_id = %spec.id, "Constructing environment");
    let mut env = match registry.make(&spec.id, spec.args) {
        Ok(env) => env,
        Err(e) => {
            tracing::error!(env_id = %spec.id, error = %e, "Environment construction failed");
            responses
                .send(Response::Error {
                    error: RemoteError::construction(e.to_string()),
                })
                .await?;
            return Ok(());
        }
    };

    let handshake = Response::Ready {
        observation_space: env.observation_space(),
        action_space: env.action_space(),
    };
    if let Err(e) = responses.send(handshake).await {
        tracing::error!(error = %e, "Handshake send failed");
        close_env(env.as_mut());
        return Err(e);
    }
    tracing::info!(env_id = %spec.id, "Worker ready");

    while let Some(request) = requests.next().await {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(error = %e, "Request channel error");
                break;
            }
        };

        let response = match request {
            Request::Step { action } => match env.step(action) {
                Ok(outcome) => Response::Step { outcome },
                Err(e) => Response::Error {
                    error: RemoteError::invocation("step", e.to_string()),
                },
            },

            Request::Reset => match env.reset() {
                Ok(value) => Response::Value { value },
                Err(e) => Response::Error {
                    error: RemoteError::invocation("reset", e.to_string()),
                },
            },

            Request::Close => {
                tracing::info!("Close requested");
                close_env(env.as_mut());
                tracing::info!("Worker exiting");
                return Ok(());
            }

            Request::GetAttribute { name } => match env.attribute(&name) {
                AttrLookup::Missing => Response::Error {
                    error: RemoteError::attribute_not_found(name),
                },
                AttrLookup::Callable => Response::Callable,
                AttrLookup::Value(value) => Response::Value { value },
            },

            Request::CallMethod { name, args, kwargs } => {
                match env.invoke(&name, CallArgs { args, kwargs }) {
                    Ok(value) => Response::Value { value },
                    Err(e) => Response::Error {
                        error: RemoteError::invocation(name, e.to_string()),
                    },
                }
            }
        };

        if let Err(e) = responses.send(response).await {
            tracing::error!(error = %e, "Response channel error");
            close_env(env.as_mut());
            return Err(e);
        }
    }

    // The owner vanished without Close; the environment still gets torn down.
    tracing::warn!("Request channel closed before Close");
    close_env(env.as_mut());
    Ok(())
}

fn close_env(env: &mut dyn Environment) {
    if let Err(e) = env.close() {
        tracing::warn!(error = %e, "Environment close reported an error");
    }
}

/// Production worker entry: read the creation parameters from the process
/// environment and serve the channel over stdin/stdout.
///
/// Stdout carries the frame stream, so worker logging must go to stderr (see
/// [`init_worker_logging`]).
pub async fn serve_stdio(registry: &EnvRegistry) -> io::Result<()> {
    let spec = spec_from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    run_worker(registry, spec, stdin(), stdout()).await
}

/// Install a stderr tracing subscriber for a worker process.
///
/// Filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_worker_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
