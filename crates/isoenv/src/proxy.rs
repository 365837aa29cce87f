//! Owner proxy - the controller-side handle standing in for the remote
//! environment.
//!
//! Every operation is one blocking round trip on the channel. Taking
//! `&mut self` on every operation enforces the single-outstanding-request
//! discipline by construction: a second request cannot be issued before the
//! paired response has been read.

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::bridge::codec::JsonCodec;
use crate::bridge::protocol::{RemoteError, Request, Response};
use crate::space::{CallArgs, Space, StepOutcome};
use crate::spawn::{EnvSpec, SpawnError, WorkerSpawner};

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error("worker stdio was not captured")]
    StdioNotCaptured,

    #[error("channel closed by worker")]
    ChannelClosed,

    #[error("channel i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected response: expected {0}")]
    UnexpectedResponse(&'static str),

    /// An error raised inside the worker, re-raised here.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("proxy is closed")]
    Closed,
}

/// The worker this proxy joins on close.
pub enum WorkerHandle {
    /// A spawned OS process (the production configuration).
    Process(tokio::process::Child),
    /// An in-process worker task, used by tests running the loop over a
    /// duplex stream.
    Task(JoinHandle<std::io::Result<()>>),
}

impl WorkerHandle {
    async fn join(&mut self) -> std::io::Result<()> {
        match self {
            Self::Process(child) => {
                let status = child.wait().await?;
                if !status.success() {
                    tracing::warn!(%status, "Worker exited with non-zero status");
                }
                Ok(())
            }
            Self::Task(handle) => match handle.await {
                Ok(result) => result,
                Err(e) => Err(std::io::Error::other(format!("worker task failed: {e}"))),
            },
        }
    }
}

/// Controller-side handle with the same operation surface as the wrapped
/// environment.
pub struct EnvProxy {
    requests: FramedWrite<BoxedWriter, JsonCodec<Request>>,
    responses: FramedRead<BoxedReader, JsonCodec<Response>>,
    worker: WorkerHandle,
    observation_space: Space,
    action_space: Space,
    closed: bool,
}

impl EnvProxy {
    /// Spawn a worker process for `spec` and perform the mandatory handshake.
    ///
    /// Returns a ready handle with both capability descriptors populated, or
    /// the construction error the worker reported.
    pub async fn make(spawner: &dyn WorkerSpawner, spec: EnvSpec) -> Result<Self, ProxyError> {
        let mut child = spawner.spawn(&spec)?;
        let stdin = child.stdin.take().ok_or(ProxyError::StdioNotCaptured)?;
        let stdout = child.stdout.take().ok_or(ProxyError::StdioNotCaptured)?;
        Self::connect(
            Box::new(stdout),
            Box::new(stdin),
            WorkerHandle::Process(child),
        )
        .await
    }

    /// Attach to an already-running worker over an arbitrary channel and
    /// perform the handshake.
    pub async fn connect(
        reader: BoxedReader,
        writer: BoxedWriter,
        worker: WorkerHandle,
    ) -> Result<Self, ProxyError> {
        let mut responses = FramedRead::new(reader, JsonCodec::<Response>::new());
        let requests = FramedWrite::new(writer, JsonCodec::<Request>::new());

        match next_response(&mut responses).await? {
            Response::Ready {
                observation_space,
                action_space,
            } => {
                tracing::debug!(?observation_space, ?action_space, "Handshake complete");
                Ok(Self {
                    requests,
                    responses,
                    worker,
                    observation_space,
                    action_space,
                    closed: false,
                })
            }
            Response::Error { error } => Err(error.into()),
            _ => Err(ProxyError::UnexpectedResponse("ready handshake")),
        }
    }

    pub fn observation_space(&self) -> &Space {
        &self.observation_space
    }

    pub fn action_space(&self) -> &Space {
        &self.action_space
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Advance the environment one step; returns the full
    /// observation/reward/done/info tuple verbatim.
    pub async fn step(&mut self, action: Value) -> Result<StepOutcome, ProxyError> {
        match self.roundtrip(Request::Step { action }).await? {
            Response::Step { outcome } => Ok(outcome),
            Response::Error { error } => Err(error.into()),
            _ => Err(ProxyError::UnexpectedResponse("step outcome")),
        }
    }

    /// Reset the environment; returns the initial observation.
    pub async fn reset(&mut self) -> Result<Value, ProxyError> {
        match self.roundtrip(Request::Reset).await? {
            Response::Value { value } => Ok(value),
            Response::Error { error } => Err(error.into()),
            _ => Err(ProxyError::UnexpectedResponse("reset value")),
        }
    }

    /// Tear down the remote environment and join the worker.
    ///
    /// Idempotent: a second call is a no-op.
    pub async fn close(&mut self) -> Result<(), ProxyError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.requests.send(Request::Close).await?;
        self.worker.join().await?;
        tracing::debug!("Worker joined");
        Ok(())
    }

    /// Resolve a name on the remote environment.
    ///
    /// A data attribute comes back as its value; a method comes back as a
    /// deferred [`RemoteMethod`] whose invocation is a second round trip. A
    /// missing name surfaces as [`RemoteError::AttributeNotFound`].
    pub async fn attribute(&mut self, name: &str) -> Result<RemoteAttr<'_>, ProxyError> {
        let request = Request::GetAttribute {
            name: name.to_string(),
        };
        match self.roundtrip(request).await? {
            Response::Value { value } => Ok(RemoteAttr::Value(value)),
            Response::Callable => Ok(RemoteAttr::Method(RemoteMethod {
                name: name.to_string(),
                proxy: self,
            })),
            Response::Error { error } => Err(error.into()),
            _ => Err(ProxyError::UnexpectedResponse("attribute value")),
        }
    }

    /// Invoke a method on the remote environment directly, skipping the
    /// resolution round trip.
    pub async fn call_method(&mut self, name: &str, args: CallArgs) -> Result<Value, ProxyError> {
        let request = Request::CallMethod {
            name: name.to_string(),
            args: args.args,
            kwargs: args.kwargs,
        };
        match self.roundtrip(request).await? {
            Response::Value { value } => Ok(value),
            Response::Error { error } => Err(error.into()),
            _ => Err(ProxyError::UnexpectedResponse("method result")),
        }
    }

    async fn roundtrip(&mut self, request: Request) -> Result<Response, ProxyError> {
        if self.closed {
            return Err(ProxyError::Closed);
        }
        self.requests.send(request).await?;
        next_response(&mut self.responses).await
    }
}

impl Drop for EnvProxy {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("EnvProxy dropped without close(); the worker will be killed");
        }
    }
}

async fn next_response(
    responses: &mut FramedRead<BoxedReader, JsonCodec<Response>>,
) -> Result<Response, ProxyError> {
    match responses.next().await {
        Some(Ok(response)) => Ok(response),
        Some(Err(e)) => Err(ProxyError::Io(e)),
        None => Err(ProxyError::ChannelClosed),
    }
}

/// A name resolved on the remote environment.
#[derive(Debug)]
pub enum RemoteAttr<'a> {
    /// A plain data attribute, already transferred.
    Value(Value),
    /// A remote method; invoke it to trigger the call round trip.
    Method(RemoteMethod<'a>),
}

impl RemoteAttr<'_> {
    /// Unwrap a data attribute, treating a method as an error.
    pub fn into_value(self) -> Result<Value, ProxyError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Method(_) => Err(ProxyError::UnexpectedResponse("attribute value")),
        }
    }
}

/// A deferred remote call bound to one proxy.
///
/// Borrows the proxy mutably, so the call slot stays exclusive until the
/// method is invoked or dropped.
pub struct RemoteMethod<'a> {
    name: String,
    proxy: &'a mut EnvProxy,
}

impl std::fmt::Debug for RemoteMethod<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteMethod")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl RemoteMethod<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the remote method with `args`.
    pub async fn invoke(self, args: CallArgs) -> Result<Value, ProxyError> {
        self.proxy.call_method(&self.name, args).await
    }
}
