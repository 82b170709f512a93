//! Conversion between [`Message`] values and the provider wire record
//! `{role, content, url?, content_type?}`.
//!
//! Decoding applies rules in priority order: an embedded `image_url` content
//! part wins over the declared role, then the user/file branch, then generic
//! role dispatch. Keep that precedence; providers rely on it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{AstError, AstResult};
use crate::models::content::{base64_tail, image_part_url, Content, ContentKind};
use crate::models::message::Message;
use crate::models::role::Role;

/// Decode a provider wire record into a [`Message`].
pub fn message_from_wire(value: &Value) -> AstResult<Message> {
    let role = value
        .get("role")
        .and_then(Value::as_str)
        .ok_or_else(|| AstError::UnsupportedContentShape("wire record missing role".to_string()))?;
    let content = value.get("content").ok_or_else(|| {
        AstError::UnsupportedContentShape("wire record missing content".to_string())
    })?;
    let url = value.get("url").and_then(Value::as_str).unwrap_or("");
    let content_type = value
        .get("content_type")
        .and_then(Value::as_str)
        .unwrap_or("");

    // An embedded image part overrides the declared role: the payload is
    // always user-supplied image bytes. The data URL doubles as the url.
    if let Some(data_url) = image_part_url(content) {
        let data = Content::decode(base64_tail(data_url)?)?;
        return Ok(Message::user(Content::image_bytes(data, data_url)));
    }

    if role == "user" && content_type == "file" {
        let b64 = content.as_str().ok_or_else(|| {
            AstError::UnsupportedContentShape("file content must be a base64 string".to_string())
        })?;
        let data = Content::decode(b64)?;
        return Ok(Message::user(Content::file_bytes(data, url)));
    }

    // No pdf decode path yet; a content_type of "pdf" falls through to the
    // generic branch like any other text content.
    let content = Content::new(content.clone().into(), ContentKind::Text, url)?;
    match Role::parse(role)? {
        Role::User => Ok(Message::user(content)),
        Role::System => Ok(Message::system(content)),
        Role::Assistant => Ok(Message::assistant(content)),
    }
}

/// Encode a [`Message`] into the provider wire record.
///
/// `include_metadata` adds the `url` and `content_type` fields, which the
/// session store wants and the provider APIs ignore.
pub fn message_to_wire(message: &Message, include_metadata: bool) -> AstResult<Value> {
    let content = message.content();
    let (mut record, content_type) = match (message, content) {
        (Message::User(_), Content::Image(_)) => (
            json!({
                "role": "user",
                "content": [{
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:image/jpeg;base64,{}", content.b64encode()?),
                        "detail": "high",
                    }
                }],
            }),
            "image",
        ),
        (Message::User(_), Content::Pdf(_)) => {
            return Err(AstError::UnsupportedEncoding("pdf not supported".to_string()))
        }
        (Message::User(_), Content::File(_)) => (
            json!({
                "role": "user",
                "content": content.b64encode()?,
            }),
            "file",
        ),
        _ => (
            json!({
                "role": message.role().to_string(),
                "content": content.to_string(),
            }),
            "",
        ),
    };

    if include_metadata {
        let fields = record.as_object_mut().unwrap();
        fields.insert("url".to_string(), json!(content.url()));
        fields.insert("content_type".to_string(), json!(content_type));
    }
    Ok(record)
}

/// Typed form of the wire record, for callers that exchange serde models
/// rather than raw JSON values (session stores, HTTP layers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl WireMessage {
    pub fn to_message(&self) -> AstResult<Message> {
        let record = json!({
            "role": self.role,
            "content": self.content,
            "url": self.url.clone().unwrap_or_default(),
            "content_type": self.content_type.clone().unwrap_or_default(),
        });
        message_from_wire(&record)
    }

    /// Encode with metadata so the record can round-trip back through
    /// [`WireMessage::to_message`].
    pub fn from_message(message: &Message) -> AstResult<WireMessage> {
        let record = message_to_wire(message, true)?;
        Ok(WireMessage {
            role: record["role"].as_str().unwrap_or_default().to_string(),
            content_type: record
                .get("content_type")
                .and_then(Value::as_str)
                .map(str::to_string),
            content: record["content"].clone(),
            url: record.get("url").and_then(Value::as_str).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::ContentSource;

    fn round_trip(message: &Message) -> anyhow::Result<Message> {
        let wire = message_to_wire(message, true)?;
        Ok(message_from_wire(&wire)?)
    }

    #[test]
    fn text_messages_round_trip() -> anyhow::Result<()> {
        for message in [
            Message::user_text("hello"),
            Message::system_default(),
            Message::assistant_text("hi there"),
        ] {
            let back = round_trip(&message)?;
            assert_eq!(back.role(), message.role());
            assert_eq!(back.content().to_string(), message.content().to_string());
        }
        Ok(())
    }

    #[test]
    fn image_message_round_trips_bytes() -> anyhow::Result<()> {
        let message = Message::user(Content::image_bytes(vec![0xFFu8, 0xD8, 0xFF], "cat.jpg"));
        let back = round_trip(&message)?;
        assert_eq!(back.role(), Role::User);
        assert_eq!(back.content().as_bytes(), Some(&[0xFFu8, 0xD8, 0xFF][..]));
        assert_eq!(back.content().kind(), ContentKind::Image);
        Ok(())
    }

    #[test]
    fn file_message_round_trips_bytes() -> anyhow::Result<()> {
        let message = Message::user(Content::file_bytes(b"report body".to_vec(), "report.txt"));
        let wire = message_to_wire(&message, true)?;
        assert_eq!(wire["content_type"], "file");
        assert_eq!(wire["url"], "report.txt");

        let back = message_from_wire(&wire)?;
        assert_eq!(back.content().as_bytes(), Some(&b"report body"[..]));
        assert_eq!(back.content().url(), "report.txt");
        Ok(())
    }

    #[test]
    fn pdf_message_never_encodes() {
        let message = Message::user(Content::pdf_bytes(vec![1u8, 2], "doc.pdf"));
        let err = message_to_wire(&message, true).unwrap_err();
        assert_eq!(
            err,
            AstError::UnsupportedEncoding("pdf not supported".to_string())
        );
    }

    #[test]
    fn image_wire_shape_matches_provider_spec() -> anyhow::Result<()> {
        let message = Message::user(Content::image_bytes(vec![9u8], ""));
        let wire = message_to_wire(&message, false)?;
        let part = &wire["content"][0];
        assert_eq!(part["type"], "image_url");
        assert_eq!(part["image_url"]["detail"], "high");
        assert!(part["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
        assert!(wire.get("url").is_none());
        assert!(wire.get("content_type").is_none());
        Ok(())
    }

    #[test]
    fn image_part_overrides_declared_role() -> anyhow::Result<()> {
        let wire = json!({
            "role": "assistant",
            "content": [{
                "type": "image_url",
                "image_url": {"url": "data:image/png;base64,iVBORw0KGgo="}
            }],
        });
        let message = message_from_wire(&wire)?;
        assert_eq!(message.role(), Role::User);
        assert_eq!(message.content().b64encode()?, "iVBORw0KGgo=");
        Ok(())
    }

    #[test]
    fn unknown_role_is_rejected() {
        let wire = json!({"role": "zzz", "content": "hi"});
        let err = message_from_wire(&wire).unwrap_err();
        assert_eq!(err, AstError::UnsupportedRole("zzz".to_string()));
    }

    #[test]
    fn metadata_fields_only_with_flag() -> anyhow::Result<()> {
        let message = Message::assistant_text("out");
        let bare = message_to_wire(&message, false)?;
        assert!(bare.get("url").is_none());

        let full = message_to_wire(&message, true)?;
        assert_eq!(full["url"], "");
        assert_eq!(full["content_type"], "");
        Ok(())
    }

    #[test]
    fn pdf_content_type_falls_through_to_generic_decode() -> anyhow::Result<()> {
        let wire = json!({"role": "user", "content": "raw pdf text", "content_type": "pdf"});
        let message = message_from_wire(&wire)?;
        assert_eq!(message.role(), Role::User);
        assert_eq!(message.content().as_text(), Some("raw pdf text"));
        Ok(())
    }

    #[test]
    fn wire_message_round_trip() -> anyhow::Result<()> {
        let message = Message::user(Content::file_bytes(b"bytes".to_vec(), "f.bin"));
        let wire = WireMessage::from_message(&message)?;
        assert_eq!(wire.role, "user");
        assert_eq!(wire.content_type.as_deref(), Some("file"));

        let back = wire.to_message()?;
        assert_eq!(back, message);
        Ok(())
    }

    #[test]
    fn wire_message_decodes_without_metadata() -> anyhow::Result<()> {
        let wire: WireMessage = serde_json::from_value(json!({
            "role": "system",
            "content": "be brief",
        }))?;
        let message = wire.to_message()?;
        assert_eq!(message.role(), Role::System);
        assert_eq!(message.content().as_text(), Some("be brief"));
        Ok(())
    }

    #[test]
    fn malformed_base64_file_is_invalid() {
        let wire = json!({
            "role": "user",
            "content": "not base64!!!",
            "content_type": "file",
        });
        let err = message_from_wire(&wire).unwrap_err();
        assert!(matches!(err, AstError::InvalidBase64(_)));
    }

    #[test]
    fn unsupported_content_value_fails_decode() {
        let wire = json!({"role": "user", "content": 42});
        let err = message_from_wire(&wire).unwrap_err();
        assert!(matches!(err, AstError::UnsupportedContentShape(_)));
    }

    #[test]
    fn generic_constructor_content_source_reused_by_codec() -> anyhow::Result<()> {
        // The decode path shares the generic constructor; null content is the
        // documented empty sentinel, not an error.
        let message = message_from_wire(&json!({"role": "user", "content": null}))?;
        assert_eq!(message.content(), &Content::empty());
        assert_eq!(
            Content::new(ContentSource::None, ContentKind::Text, "")?,
            Content::empty()
        );
        Ok(())
    }
}
