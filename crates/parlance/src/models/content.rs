use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display as EnumDisplay, EnumString};

use super::node::Node;
use crate::errors::{AstError, AstResult};

/// Media kind tag, carried on the wire as `content_type`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumDisplay, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Pdf,
    File,
    /// A raw byte payload whose declared kind is none of the media kinds.
    Bytes,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeContent {
    pub children: Vec<Node>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageContent {
    pub data: Vec<u8>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfContent {
    pub data: Vec<u8>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileContent {
    pub data: Vec<u8>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BytesContent {
    pub data: Vec<u8>,
    #[serde(default)]
    pub url: String,
}

/// A tagged payload in the conversation tree: plain text, a sequence of
/// child nodes, or raw bytes under one of the media kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Content {
    Text(TextContent),
    Nodes(NodeContent),
    Image(ImageContent),
    Pdf(PdfContent),
    File(FileContent),
    Bytes(BytesContent),
}

/// The source shapes accepted by the generic [`Content`] constructor.
#[derive(Debug, Clone)]
pub enum ContentSource {
    None,
    Text(String),
    Bytes(Vec<u8>),
    Content(Content),
    Node(Box<Node>),
    Nodes(Vec<Node>),
    /// Provider-shaped JSON, e.g. an `image_url` content part list.
    Wire(Value),
}

impl ContentSource {
    fn shape_name(&self) -> &'static str {
        match self {
            ContentSource::None => "none",
            ContentSource::Text(_) => "str",
            ContentSource::Bytes(_) => "bytes",
            ContentSource::Content(_) => "content",
            ContentSource::Node(_) => "node",
            ContentSource::Nodes(_) => "node sequence",
            ContentSource::Wire(_) => "wire value",
        }
    }
}

impl From<&str> for ContentSource {
    fn from(value: &str) -> Self {
        ContentSource::Text(value.to_string())
    }
}

impl From<String> for ContentSource {
    fn from(value: String) -> Self {
        ContentSource::Text(value)
    }
}

impl From<Vec<u8>> for ContentSource {
    fn from(value: Vec<u8>) -> Self {
        ContentSource::Bytes(value)
    }
}

impl From<&[u8]> for ContentSource {
    fn from(value: &[u8]) -> Self {
        ContentSource::Bytes(value.to_vec())
    }
}

impl From<Content> for ContentSource {
    fn from(value: Content) -> Self {
        ContentSource::Content(value)
    }
}

impl From<Node> for ContentSource {
    fn from(value: Node) -> Self {
        ContentSource::Node(Box::new(value))
    }
}

impl From<Vec<Node>> for ContentSource {
    fn from(value: Vec<Node>) -> Self {
        ContentSource::Nodes(value)
    }
}

impl From<Value> for ContentSource {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ContentSource::None,
            Value::String(s) => ContentSource::Text(s),
            other => ContentSource::Wire(other),
        }
    }
}

impl Content {
    /// The empty text sentinel. Not an error state.
    pub fn empty() -> Content {
        Content::Text(TextContent::default())
    }

    pub fn text(text: impl Into<String>) -> Content {
        Content::Text(TextContent {
            text: text.into(),
            url: String::new(),
        })
    }

    pub fn nodes(children: Vec<Node>) -> Content {
        Content::Nodes(NodeContent {
            children,
            url: String::new(),
        })
    }

    /// Build a content from any accepted source shape.
    ///
    /// The declared `kind` tags byte payloads only; text and node payloads
    /// keep their own shape. When the source is another [`Content`], its own
    /// kind is discarded in favor of the argument. That mirrors longstanding
    /// behavior that callers rely on; see the regression test below before
    /// changing it.
    pub fn new(
        source: ContentSource,
        kind: ContentKind,
        url: impl Into<String>,
    ) -> AstResult<Content> {
        let url = url.into();
        match source {
            ContentSource::None => Ok(Content::empty()),
            ContentSource::Text(text) => Ok(Content::Text(TextContent { text, url })),
            ContentSource::Bytes(data) => Ok(Content::tag_bytes(data, kind, url)),
            ContentSource::Content(content) => match content {
                Content::Text(t) => Ok(Content::Text(TextContent { text: t.text, url })),
                Content::Nodes(n) => Ok(Content::Nodes(NodeContent {
                    children: n.children,
                    url,
                })),
                Content::Image(c) => Ok(Content::tag_bytes(c.data, kind, url)),
                Content::Pdf(c) => Ok(Content::tag_bytes(c.data, kind, url)),
                Content::File(c) => Ok(Content::tag_bytes(c.data, kind, url)),
                Content::Bytes(c) => Ok(Content::tag_bytes(c.data, kind, url)),
            },
            ContentSource::Node(node) => Ok(Content::Nodes(NodeContent {
                children: vec![*node],
                url,
            })),
            ContentSource::Nodes(children) => {
                if children.is_empty() {
                    return Err(AstError::UnsupportedContentShape(
                        "empty node sequence".to_string(),
                    ));
                }
                Ok(Content::Nodes(NodeContent { children, url }))
            }
            ContentSource::Wire(value) => Content::from_wire_value(&value, url),
        }
    }

    fn tag_bytes(data: Vec<u8>, kind: ContentKind, url: String) -> Content {
        match kind {
            ContentKind::Image => Content::Image(ImageContent { data, url }),
            ContentKind::Pdf => Content::Pdf(PdfContent { data, url }),
            ContentKind::File => Content::File(FileContent { data, url }),
            ContentKind::Text | ContentKind::Bytes => Content::Bytes(BytesContent { data, url }),
        }
    }

    /// Provider-shaped content: an array whose head is an `image_url` part
    /// carrying a base64 data URL. Everything else is unsupported.
    fn from_wire_value(value: &Value, url: String) -> AstResult<Content> {
        if let Some(data_url) = image_part_url(value) {
            let data = Content::decode(base64_tail(data_url)?)?;
            return Ok(Content::Image(ImageContent { data, url }));
        }
        Err(AstError::UnsupportedContentShape(json_shape_name(value)))
    }

    /// Image content. The source must be bytes.
    pub fn image(source: ContentSource, url: impl Into<String>) -> AstResult<Content> {
        match source {
            ContentSource::Bytes(data) => Ok(Content::Image(ImageContent {
                data,
                url: url.into(),
            })),
            other => Err(AstError::InvalidPayloadType {
                kind: "image".to_string(),
                given: other.shape_name().to_string(),
            }),
        }
    }

    /// PDF content. The source must be bytes.
    pub fn pdf(source: ContentSource, url: impl Into<String>) -> AstResult<Content> {
        match source {
            ContentSource::Bytes(data) => Ok(Content::Pdf(PdfContent {
                data,
                url: url.into(),
            })),
            other => Err(AstError::InvalidPayloadType {
                kind: "pdf".to_string(),
                given: other.shape_name().to_string(),
            }),
        }
    }

    /// File content. The source must be bytes.
    pub fn file(source: ContentSource, url: impl Into<String>) -> AstResult<Content> {
        match source {
            ContentSource::Bytes(data) => Ok(Content::File(FileContent {
                data,
                url: url.into(),
            })),
            other => Err(AstError::InvalidPayloadType {
                kind: "file".to_string(),
                given: other.shape_name().to_string(),
            }),
        }
    }

    pub fn image_bytes(data: impl Into<Vec<u8>>, url: impl Into<String>) -> Content {
        Content::Image(ImageContent {
            data: data.into(),
            url: url.into(),
        })
    }

    pub fn file_bytes(data: impl Into<Vec<u8>>, url: impl Into<String>) -> Content {
        Content::File(FileContent {
            data: data.into(),
            url: url.into(),
        })
    }

    pub fn pdf_bytes(data: impl Into<Vec<u8>>, url: impl Into<String>) -> Content {
        Content::Pdf(PdfContent {
            data: data.into(),
            url: url.into(),
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Text(_) | Content::Nodes(_) => ContentKind::Text,
            Content::Image(_) => ContentKind::Image,
            Content::Pdf(_) => ContentKind::Pdf,
            Content::File(_) => ContentKind::File,
            Content::Bytes(_) => ContentKind::Bytes,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Content::Text(c) => &c.url,
            Content::Nodes(c) => &c.url,
            Content::Image(c) => &c.url,
            Content::Pdf(c) => &c.url,
            Content::File(c) => &c.url,
            Content::Bytes(c) => &c.url,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(c) => Some(&c.text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Content::Image(c) => Some(&c.data),
            Content::Pdf(c) => Some(&c.data),
            Content::File(c) => Some(&c.data),
            Content::Bytes(c) => Some(&c.data),
            _ => None,
        }
    }

    pub fn is_node_sequence(&self) -> bool {
        matches!(self, Content::Nodes(_))
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Content::Nodes(c) => Some(&c.children),
            _ => None,
        }
    }

    /// Base64 text of a byte payload.
    pub fn b64encode(&self) -> AstResult<String> {
        self.as_bytes()
            .map(|data| BASE64.encode(data))
            .ok_or(AstError::NotBytes)
    }

    /// Decode base64 text into bytes.
    pub fn decode(b64: &str) -> AstResult<Vec<u8>> {
        BASE64
            .decode(b64.trim())
            .map_err(|e| AstError::InvalidBase64(e.to_string()))
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(c) => f.write_str(&c.text),
            Content::Nodes(c) => {
                let parts: Vec<String> = c.children.iter().map(|n| n.to_string()).collect();
                f.write_str(&parts.join(" "))
            }
            // Byte payloads render in debug form; callers wanting a textual
            // rendering use b64encode.
            Content::Image(c) => write!(f, "{:?}", c.data),
            Content::Pdf(c) => write!(f, "{:?}", c.data),
            Content::File(c) => write!(f, "{:?}", c.data),
            Content::Bytes(c) => write!(f, "{:?}", c.data),
        }
    }
}

/// The data URL of an `image_url` content part list, when `value` is one.
pub(crate) fn image_part_url(value: &Value) -> Option<&str> {
    let head = value.as_array()?.first()?;
    if head.get("type")?.as_str()? != "image_url" {
        return None;
    }
    head.get("image_url")?.get("url")?.as_str()
}

/// The base64 payload of a `data:<mime>;base64,<b64>` URL.
pub(crate) fn base64_tail(data_url: &str) -> AstResult<&str> {
    data_url
        .split_once(',')
        .map(|(_, b64)| b64)
        .ok_or_else(|| AstError::InvalidBase64(format!("no payload in data url: {data_url}")))
}

fn json_shape_name(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_content_is_blank_text() {
        let content = Content::empty();
        assert_eq!(content.to_string(), "");
        assert!(!content.is_node_sequence());
        assert_eq!(content.kind(), ContentKind::Text);
    }

    #[test]
    fn none_source_builds_empty() -> anyhow::Result<()> {
        let content = Content::new(ContentSource::None, ContentKind::Image, "")?;
        assert_eq!(content, Content::empty());
        Ok(())
    }

    #[test]
    fn string_source_builds_text() -> anyhow::Result<()> {
        let content = Content::new("hello".into(), ContentKind::Text, "")?;
        assert_eq!(content.as_text(), Some("hello"));
        Ok(())
    }

    #[test]
    fn bytes_source_follows_declared_kind() -> anyhow::Result<()> {
        let content = Content::new(vec![1u8, 2, 3].into(), ContentKind::Pdf, "doc.pdf")?;
        assert_eq!(content.kind(), ContentKind::Pdf);
        assert_eq!(content.url(), "doc.pdf");

        let generic = Content::new(vec![1u8].into(), ContentKind::Text, "")?;
        assert_eq!(generic.kind(), ContentKind::Bytes);
        Ok(())
    }

    #[test]
    fn node_sequence_source_is_kept_verbatim() -> anyhow::Result<()> {
        let children = vec![Node::text("a"), Node::text("b")];
        let content = Content::new(children.clone().into(), ContentKind::Text, "")?;
        assert_eq!(content.children(), Some(children.as_slice()));
        assert_eq!(content.to_string(), "a b");
        Ok(())
    }

    #[test]
    fn empty_node_sequence_is_rejected() {
        let err = Content::new(Vec::<Node>::new().into(), ContentKind::Text, "").unwrap_err();
        assert!(matches!(err, AstError::UnsupportedContentShape(_)));
    }

    // Regression: constructing from another Content takes the caller's kind,
    // not the source's. An image rebuilt under the default kind degrades to
    // a generic bytes payload.
    #[test]
    fn content_source_kind_is_overridden_by_argument() -> anyhow::Result<()> {
        let image = Content::image_bytes(vec![9u8, 9], "pic");
        let rebuilt = Content::new(image.into(), ContentKind::Text, "")?;
        assert_eq!(rebuilt.kind(), ContentKind::Bytes);
        assert_eq!(rebuilt.as_bytes(), Some(&[9u8, 9][..]));
        Ok(())
    }

    #[test]
    fn image_url_part_decodes_base64() -> anyhow::Result<()> {
        let part = json!([{
            "type": "image_url",
            "image_url": {"url": "data:image/png;base64,iVBORw0KGgo="}
        }]);
        let content = Content::new(part.into(), ContentKind::Text, "")?;
        assert_eq!(content.b64encode()?, "iVBORw0KGgo=");
        assert_eq!(content.kind(), ContentKind::Image);
        Ok(())
    }

    #[test]
    fn unrecognized_wire_shape_fails() {
        let err = Content::new(json!(42).into(), ContentKind::Text, "").unwrap_err();
        assert!(matches!(err, AstError::UnsupportedContentShape(_)));
    }

    #[test]
    fn media_constructors_require_bytes() {
        let err = Content::image("not bytes".into(), "").unwrap_err();
        assert_eq!(
            err,
            AstError::InvalidPayloadType {
                kind: "image".to_string(),
                given: "str".to_string(),
            }
        );
        assert!(Content::pdf(vec![1u8].into(), "").is_ok());
        assert!(Content::file("nope".into(), "").is_err());
    }

    #[test]
    fn b64encode_requires_bytes() {
        let err = Content::text("plain").b64encode().unwrap_err();
        assert_eq!(err, AstError::NotBytes);
    }

    #[test]
    fn serde_round_trip() -> anyhow::Result<()> {
        let content = Content::nodes(vec![
            Node::text("hi"),
            Node::Content(Content::image_bytes(vec![0u8, 1], "u")),
        ]);
        let serialized = serde_json::to_string(&content)?;
        let deserialized: Content = serde_json::from_str(&serialized)?;
        assert_eq!(content, deserialized);
        Ok(())
    }
}
