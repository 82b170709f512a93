use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AstError {
    #[error("unsupported content shape: {0}")]
    UnsupportedContentShape(String),

    #[error("{kind} content requires a bytes payload, got {given}")]
    InvalidPayloadType { kind: String, given: String },

    #[error("content payload is not bytes")]
    NotBytes,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("role not supported: {0}")]
    UnsupportedRole(String),

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("cannot coerce types {left} and {right} to a common type")]
    IncoercibleTypes { left: String, right: String },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

pub type AstResult<T> = Result<T, AstError>;
