//! The `{code, data, message}` envelope the User Directory Service answers
//! with, and its validated, typed form.
//!
//! The backend signals "not logged in" with a non-zero `code`, not with a
//! transport failure. Branching on that integer everywhere is easy to get
//! wrong, so it happens exactly once, here: [`BaseResponse::into_reply`]
//! turns an envelope into a [`DirectoryReply`], and from then on callers
//! match on an enum.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::{Codec, ProtocolError};

/// The application-level code meaning "success".
pub const SUCCESS_CODE: i32 = 0;

/// The raw response envelope, exactly as it travels on the wire.
///
/// ```json
/// { "code": 0, "data": { "displayName": "alice", "role": "user" }, "message": "ok" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    /// `0` on success, anything else is an application-level failure.
    pub code: i32,

    /// The payload; usually absent when `code != 0`.
    pub data: Option<T>,

    /// Optional human-readable message from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> BaseResponse<T> {
    /// A successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            data: Some(data),
            message: None,
        }
    }

    /// A failed envelope with the given non-zero code.
    pub fn rejected(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Validates the envelope into a typed reply.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MissingData`] when `code == 0` but `data`
    /// is absent.
    pub fn into_reply(self) -> Result<DirectoryReply<T>, ProtocolError> {
        if self.code != SUCCESS_CODE {
            return Ok(DirectoryReply::Rejected {
                code: self.code,
                message: self.message,
            });
        }
        self.data.map(DirectoryReply::Ok).ok_or(ProtocolError::MissingData)
    }
}

/// A directory answer after boundary validation.
///
/// This is the only shape the session layer ever sees. Transport failures
/// are not represented here; they are errors, not replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryReply<T> {
    /// `code == 0` with a valid payload.
    Ok(T),

    /// `code != 0`. For "who is logged in" this means "nobody".
    Rejected {
        code: i32,
        message: Option<String>,
    },
}

impl<T> DirectoryReply<T> {
    /// Returns `true` for [`DirectoryReply::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Transforms the payload, keeping rejections as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DirectoryReply<U> {
        match self {
            Self::Ok(value) => DirectoryReply::Ok(f(value)),
            Self::Rejected { code, message } => DirectoryReply::Rejected { code, message },
        }
    }
}

/// Decodes and validates a response body that must carry a payload.
///
/// # Errors
/// [`ProtocolError::Decode`] for malformed bodies (including unknown
/// roles), [`ProtocolError::MissingData`] for a successful envelope with
/// no payload.
pub fn decode_reply<T: DeserializeOwned>(
    codec: &impl Codec,
    body: &[u8],
) -> Result<DirectoryReply<T>, ProtocolError> {
    codec.decode::<BaseResponse<T>>(body)?.into_reply()
}

/// Decodes a response body whose payload is irrelevant (e.g. logout).
///
/// Any `data` the backend sends is skipped, and a missing one is fine.
///
/// # Errors
/// [`ProtocolError::Decode`] if the envelope itself is malformed.
pub fn decode_ack(codec: &impl Codec, body: &[u8]) -> Result<DirectoryReply<()>, ProtocolError> {
    let envelope: BaseResponse<IgnoredAny> = codec.decode(body)?;
    Ok(if envelope.code == SUCCESS_CODE {
        DirectoryReply::Ok(())
    } else {
        DirectoryReply::Rejected {
            code: envelope.code,
            message: envelope.message,
        }
    })
}
