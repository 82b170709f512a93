use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::Content;
use super::role::Role;

/// System prompt used when a [`System`] message is built without one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
Don't make assumptions about what values to plug into functions. \
Ask for clarification if a user request is ambiguous.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub content: Content,
}

impl Default for System {
    fn default() -> Self {
        System {
            content: Content::text(DEFAULT_SYSTEM_PROMPT),
        }
    }
}

/// A reply from the model. The context fields are opaque back-references
/// kept for debugging and propagation only; they are skipped on the wire and
/// never take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub content: Content,
    #[serde(default)]
    pub error: bool,
    #[serde(skip)]
    pub messages_context: Vec<Message>,
    #[serde(skip)]
    pub system_context: Option<Value>,
    #[serde(skip)]
    pub llm_call_context: Option<Value>,
}

impl Assistant {
    pub fn new(content: Content) -> Self {
        Assistant {
            content,
            error: false,
            messages_context: Vec::new(),
            system_context: None,
            llm_call_context: None,
        }
    }

    pub fn with_error(mut self, error: bool) -> Self {
        self.error = error;
        self
    }

    /// Append streamed text onto the reply, keeping the debug contexts.
    /// The error flag does not carry over; an extended reply starts clean.
    pub fn concat(&self, tail: &str) -> Assistant {
        Assistant {
            content: Content::text(format!("{}{}", self.content, tail)),
            error: false,
            messages_context: self.messages_context.clone(),
            system_context: self.system_context.clone(),
            llm_call_context: self.llm_call_context.clone(),
        }
    }
}

impl PartialEq for Assistant {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content && self.error == other.error
    }
}

impl Add<&str> for &Assistant {
    type Output = Assistant;

    fn add(self, tail: &str) -> Assistant {
        self.concat(tail)
    }
}

/// A message in a conversation. The role is a pure function of the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    User(User),
    System(System),
    Assistant(Assistant),
}

impl Message {
    pub fn user(content: Content) -> Message {
        Message::User(User { content })
    }

    pub fn user_text(text: impl Into<String>) -> Message {
        Message::user(Content::text(text))
    }

    pub fn system(content: Content) -> Message {
        Message::System(System { content })
    }

    /// A system message carrying [`DEFAULT_SYSTEM_PROMPT`].
    pub fn system_default() -> Message {
        Message::System(System::default())
    }

    pub fn assistant(content: Content) -> Message {
        Message::Assistant(Assistant::new(content))
    }

    pub fn assistant_text(text: impl Into<String>) -> Message {
        Message::assistant(Content::text(text))
    }

    pub fn role(&self) -> Role {
        match self {
            Message::User(_) => Role::User,
            Message::System(_) => Role::System,
            Message::Assistant(_) => Role::Assistant,
        }
    }

    pub fn content(&self) -> &Content {
        match self {
            Message::User(m) => &m.content,
            Message::System(m) => &m.content,
            Message::Assistant(m) => &m.content,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.content().fmt(f)
    }
}
