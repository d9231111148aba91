//! Outbound message attachments.
//!
//! These mirror the platform's legacy attachment objects. They are serialized
//! to compact JSON text before being handed to the command client.

use serde::{Deserialize, Serialize};

/// A message attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Plain-text summary for clients that cannot render attachments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    /// Sidebar color, either a hex code or `good`/`warning`/`danger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Text shown above the attachment block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,

    /// Main attachment body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Key/value fields rendered as a table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    /// Unix timestamp shown next to the footer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
}

impl Attachment {
    /// Creates an attachment with the given body text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn pretext(mut self, pretext: impl Into<String>) -> Self {
        self.pretext = Some(pretext.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends a field.
    pub fn field(mut self, field: AttachmentField) -> Self {
        self.fields.push(field);
        self
    }
}

/// A single attachment field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    /// Whether the field is narrow enough to sit beside another one.
    #[serde(default)]
    pub short: bool,
}

impl AttachmentField {
    /// Creates a full-width field.
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }

    /// Creates a narrow field.
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            short: true,
            ..Self::new(title, value)
        }
    }
}

/// Serializes attachments to the compact JSON text sent on the wire.
pub fn encode_attachments(attachments: &[Attachment]) -> serde_json::Result<String> {
    serde_json::to_string(attachments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_attachments_encode_as_empty_array() {
        assert_eq!(encode_attachments(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_attachment_skips_unset_fields() {
        let attachment = Attachment::new("Deploy finished")
            .color("good")
            .field(AttachmentField::short("env", "prod"));

        assert_eq!(
            encode_attachments(&[attachment]).unwrap(),
            r#"[{"color":"good","text":"Deploy finished","fields":[{"title":"env","value":"prod","short":true}]}]"#
        );
    }
}
