//! The conversation/computation tree passed around by callers of a language
//! model provider.
//!
//! There are two related shapes to keep straight:
//! - the internal structs here, which own their payloads (text, node
//!   sequences, raw bytes) and are what the rest of an application holds;
//! - the provider wire records, `{role, content, url?, content_type?}`,
//!   handled by the [`crate::wire`] codec.
//!
//! We always convert wire data into these internal structs immediately and
//! convert back at the provider boundary.

pub mod content;
pub mod message;
pub mod node;
pub mod role;
pub mod statement;
