use std::fmt;

use serde::{Deserialize, Serialize};

use super::content::Content;
use super::message::Message;
use super::statement::Statement;

/// Any value that can sit in the conversation/computation tree.
///
/// The tree has no back edges: a node owns its children outright. The only
/// exception is the debug context on [`super::message::Assistant`], which is
/// opaque and never traversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// A raw text leaf inside a content sequence.
    Text(String),
    /// End of a streamed token run; renders as a newline.
    TokenStop,
    /// Hard stop marker emitted by a stream handler.
    Stop,
    /// Free-form debug annotation; excluded from rendered output.
    Debug(String),
    Content(Content),
    Message(Box<Message>),
    Statement(Box<Statement>),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Node {
        Node::Text(text.into())
    }
}

impl From<Content> for Node {
    fn from(content: Content) -> Self {
        Node::Content(content)
    }
}

impl From<Message> for Node {
    fn from(message: Message) -> Self {
        Node::Message(Box::new(message))
    }
}

impl From<Statement> for Node {
    fn from(statement: Statement) -> Self {
        Node::Statement(Box::new(statement))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.write_str(text),
            Node::TokenStop => f.write_str("\n"),
            Node::Stop => f.write_str("StopNode"),
            Node::Debug(_) => f.write_str("DebugNode"),
            Node::Content(content) => content.fmt(f),
            Node::Message(message) => message.fmt(f),
            Node::Statement(statement) => statement.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Node::text("hi").to_string(), "hi");
        assert_eq!(Node::TokenStop.to_string(), "\n");
        assert_eq!(Node::Stop.to_string(), "StopNode");
        assert_eq!(Node::Debug("ctx".to_string()).to_string(), "DebugNode");
        assert_eq!(Node::from(Content::text("inner")).to_string(), "inner");
    }

    #[test]
    fn serde_round_trip() -> anyhow::Result<()> {
        let node = Node::from(Message::user_text("hello"));
        let serialized = serde_json::to_string(&node)?;
        let deserialized: Node = serde_json::from_str(&serialized)?;
        assert_eq!(node, deserialized);
        Ok(())
    }
}
