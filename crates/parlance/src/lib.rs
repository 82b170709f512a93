//! Parlance models a conversation with a language model provider as a typed
//! tree of nodes and converts that tree losslessly to and from the JSON wire
//! shapes the provider APIs expect.
//!
//! The pieces fit together like this:
//! - [`models`] holds the tree itself: [`models::content::Content`] payloads,
//!   role-tagged [`models::message::Message`] values, and the statement/call
//!   family of computation nodes;
//! - [`wire`] is the provider boundary codec;
//! - [`coerce`] makes tool results usable in arithmetic even when the
//!   provider returned a number as a string, via the
//!   [`models::statement::FunctionCallMeta`] result proxy.
//!
//! Everything here is an immutable-after-construction value; callers that
//! actually talk to a provider, cache conversations, or execute tools sit
//! outside this crate and exchange these types with it.

pub mod coerce;
pub mod errors;
pub mod models;
pub mod wire;

pub use coerce::{coerce, Scalar};
pub use errors::{AstError, AstResult};
pub use models::content::{Content, ContentKind, ContentSource};
pub use models::message::{Assistant, Message, System, User};
pub use models::node::Node;
pub use models::role::Role;
pub use models::statement::{
    Answer, FunctionCall, FunctionCallMeta, NativeFn, PlainStatement, Statement, UncertainOrError,
};
pub use wire::{message_from_wire, message_to_wire, WireMessage};
