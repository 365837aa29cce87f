//! Owner-worker channel: wire protocol types and the framed codec.

pub mod codec;
pub mod protocol;

pub use codec::JsonCodec;
pub use protocol::{RemoteError, Request, Response};
