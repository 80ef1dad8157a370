use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::hidden::HiddenString;

pub type ConversationIdKey = String;
pub type MessageId = i64;
pub type Ordinal = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    #[default]
    Mobile,
}

impl DeviceType {
    /// Wire strings other than "mobile" are desktop devices.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "mobile" => DeviceType::Mobile,
            _ => DeviceType::Desktop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionsChannel {
    All,
    Here,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    Image,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Deleted,
    Text,
    Attachment,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageCommon {
    pub author: String,
    pub conversation_id_key: ConversationIdKey,
    pub device_name: String,
    pub device_revoked_at: Option<i64>,
    pub device_type: DeviceType,
    pub has_been_edited: bool,
    pub id: MessageId,
    pub ordinal: Ordinal,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageDeleted {
    #[serde(flatten)]
    pub common: MessageCommon,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageText {
    #[serde(flatten)]
    pub common: MessageCommon,
    pub mentions_at: BTreeSet<String>,
    pub mentions_channel: MentionsChannel,
    pub text: HiddenString,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageAttachment {
    #[serde(flatten)]
    pub common: MessageCommon,
    pub attachment_type: AttachmentType,
    pub duration_ms: i64,
    pub filename: Option<String>,
    pub percent_uploaded: u8,
    pub preview_height: f64,
    pub preview_width: f64,
    pub title: String,
}

/// Normalized chat message handed to the renderer. Values are never mutated
/// in place; an update produces a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Deleted(MessageDeleted),
    Text(MessageText),
    Attachment(MessageAttachment),
}

impl Message {
    pub fn common(&self) -> &MessageCommon {
        match self {
            Message::Deleted(m) => &m.common,
            Message::Text(m) => &m.common,
            Message::Attachment(m) => &m.common,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Deleted(_) => MessageKind::Deleted,
            Message::Text(_) => MessageKind::Text,
            Message::Attachment(_) => MessageKind::Attachment,
        }
    }

    pub fn id(&self) -> MessageId {
        self.common().id
    }

    pub fn ordinal(&self) -> Ordinal {
        self.common().ordinal
    }
}

/// The conversation's first visible message carries ordinal 2.
pub fn is_oldest_ordinal(ordinal: Ordinal) -> bool {
    ordinal == 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_falls_back_to_desktop() {
        assert_eq!(DeviceType::from_wire("mobile"), DeviceType::Mobile);
        assert_eq!(DeviceType::from_wire("desktop"), DeviceType::Desktop);
        assert_eq!(DeviceType::from_wire("backup"), DeviceType::Desktop);
        assert_eq!(DeviceType::default(), DeviceType::Mobile);
    }

    #[test]
    fn message_serializes_with_type_tag() {
        let message = Message::Deleted(MessageDeleted::default());
        let json = serde_json::to_value(&message).expect("json");
        assert_eq!(json["type"], "deleted");
        assert_eq!(json["ordinal"], 0);
    }
}
