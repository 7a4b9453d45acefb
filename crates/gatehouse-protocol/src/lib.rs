//! Wire-level vocabulary for Gatehouse.
//!
//! This crate defines what the User Directory Service and the rest of the
//! stack agree on:
//!
//! - **Types** ([`Role`], [`Identity`]) — who a user is and what they may do.
//! - **Envelope** ([`BaseResponse`], [`DirectoryReply`]) — the `{code, data}`
//!   shape the backend answers with, and the typed result it is validated into.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how raw response bodies
//!   become those types.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits at the service boundary. Nothing above it ever
//! sees an untyped payload: a body either validates into a
//! [`DirectoryReply`] or fails with a [`ProtocolError`].
//!
//! ```text
//! Directory (bytes) → Protocol (DirectoryReply) → Session (SessionState)
//! ```

mod codec;
mod envelope;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use envelope::{decode_ack, decode_reply, BaseResponse, DirectoryReply, SUCCESS_CODE};
pub use error::ProtocolError;
pub use types::{Identity, Role};
