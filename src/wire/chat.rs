//! The slice of the chat RPC message union the view layer consumes.

use serde::{Deserialize, Serialize};

/// Unboxing outcome. Codes this client does not know decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MessageUnboxedState {
    Valid,
    Error,
    Outbox,
    Placeholder,
    Unknown(i64),
}

impl From<i64> for MessageUnboxedState {
    fn from(code: i64) -> Self {
        match code {
            1 => MessageUnboxedState::Valid,
            2 => MessageUnboxedState::Error,
            3 => MessageUnboxedState::Outbox,
            4 => MessageUnboxedState::Placeholder,
            other => MessageUnboxedState::Unknown(other),
        }
    }
}

impl From<MessageUnboxedState> for i64 {
    fn from(state: MessageUnboxedState) -> Self {
        match state {
            MessageUnboxedState::Valid => 1,
            MessageUnboxedState::Error => 2,
            MessageUnboxedState::Outbox => 3,
            MessageUnboxedState::Placeholder => 4,
            MessageUnboxedState::Unknown(code) => code,
        }
    }
}

/// Channel-wide mention. Codes outside {all, here} collapse to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ChannelMention {
    #[default]
    None,
    All,
    Here,
}

impl From<i64> for ChannelMention {
    fn from(code: i64) -> Self {
        match code {
            1 => ChannelMention::All,
            2 => ChannelMention::Here,
            _ => ChannelMention::None,
        }
    }
}

impl From<ChannelMention> for i64 {
    fn from(mention: ChannelMention) -> Self {
        match mention {
            ChannelMention::None => 0,
            ChannelMention::All => 1,
            ChannelMention::Here => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMessage {
    pub state: MessageUnboxedState,
    #[serde(default)]
    pub valid: Option<UiMessageValid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMessageValid {
    #[serde(rename = "messageID")]
    pub message_id: i64,
    pub ctime: i64,
    pub message_body: MessageBody,
    pub sender_username: String,
    #[serde(default)]
    pub sender_device_name: String,
    #[serde(default)]
    pub sender_device_type: String,
    #[serde(default)]
    pub sender_device_revoked_at: Option<i64>,
    #[serde(default)]
    pub superseded: bool,
    #[serde(default)]
    pub at_mentions: Option<Vec<String>>,
    #[serde(default)]
    pub channel_mention: ChannelMention,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageText {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttachment {
    pub object: Asset,
    #[serde(default)]
    pub uploaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub metadata: AssetMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadataImage {
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadataVideo {
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadataAudio {
    #[serde(default)]
    pub duration_ms: i64,
}

/// Asset metadata; exactly one variant is populated, selected by `assetType`.
/// An unknown type, or a type whose sub-object is missing, decodes as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawAssetMetadata", into = "RawAssetMetadata")]
pub enum AssetMetadata {
    #[default]
    None,
    Image(AssetMetadataImage),
    Video(AssetMetadataVideo),
    Audio(AssetMetadataAudio),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssetMetadata {
    #[serde(default)]
    asset_type: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<AssetMetadataImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video: Option<AssetMetadataVideo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<AssetMetadataAudio>,
}

impl From<RawAssetMetadata> for AssetMetadata {
    fn from(raw: RawAssetMetadata) -> Self {
        let metadata = match raw.asset_type {
            1 => raw.image.map(AssetMetadata::Image),
            2 => raw.video.map(AssetMetadata::Video),
            3 => raw.audio.map(AssetMetadata::Audio),
            _ => None,
        };
        metadata.unwrap_or_default()
    }
}

impl From<AssetMetadata> for RawAssetMetadata {
    fn from(metadata: AssetMetadata) -> Self {
        let mut raw = RawAssetMetadata::default();
        match metadata {
            AssetMetadata::None => {}
            AssetMetadata::Image(image) => {
                raw.asset_type = 1;
                raw.image = Some(image);
            }
            AssetMetadata::Video(video) => {
                raw.asset_type = 2;
                raw.video = Some(video);
            }
            AssetMetadata::Audio(audio) => {
                raw.asset_type = 3;
                raw.audio = Some(audio);
            }
        }
        raw
    }
}

/// Message body, tagged by `messageType`. Only text and attachment bodies
/// carry a payload the view layer reads; the payload may be absent on the wire.
/// Types newer than this client decode as `Unknown` with their wire code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMessageBody", into = "RawMessageBody")]
pub enum MessageBody {
    None,
    Text(Option<MessageText>),
    Attachment(Option<MessageAttachment>),
    Edit,
    Delete,
    Metadata,
    Tlfname,
    Headline,
    AttachmentUploaded,
    Join,
    Leave,
    System,
    Unknown(i64),
}

impl MessageBody {
    pub fn type_name(&self) -> &'static str {
        match self {
            MessageBody::None => "none",
            MessageBody::Text(_) => "text",
            MessageBody::Attachment(_) => "attachment",
            MessageBody::Edit => "edit",
            MessageBody::Delete => "delete",
            MessageBody::Metadata => "metadata",
            MessageBody::Tlfname => "tlfname",
            MessageBody::Headline => "headline",
            MessageBody::AttachmentUploaded => "attachmentuploaded",
            MessageBody::Join => "join",
            MessageBody::Leave => "leave",
            MessageBody::System => "system",
            MessageBody::Unknown(_) => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessageBody {
    message_type: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attachment: Option<MessageAttachment>,
}

impl From<RawMessageBody> for MessageBody {
    fn from(raw: RawMessageBody) -> Self {
        match raw.message_type {
            0 => MessageBody::None,
            1 => MessageBody::Text(raw.text),
            2 => MessageBody::Attachment(raw.attachment),
            3 => MessageBody::Edit,
            4 => MessageBody::Delete,
            5 => MessageBody::Metadata,
            6 => MessageBody::Tlfname,
            7 => MessageBody::Headline,
            8 => MessageBody::AttachmentUploaded,
            9 => MessageBody::Join,
            10 => MessageBody::Leave,
            11 => MessageBody::System,
            other => MessageBody::Unknown(other),
        }
    }
}

impl From<MessageBody> for RawMessageBody {
    fn from(body: MessageBody) -> Self {
        let mut raw = RawMessageBody::default();
        raw.message_type = match body {
            MessageBody::None => 0,
            MessageBody::Text(text) => {
                raw.text = text;
                1
            }
            MessageBody::Attachment(attachment) => {
                raw.attachment = attachment;
                2
            }
            MessageBody::Edit => 3,
            MessageBody::Delete => 4,
            MessageBody::Metadata => 5,
            MessageBody::Tlfname => 6,
            MessageBody::Headline => 7,
            MessageBody::AttachmentUploaded => 8,
            MessageBody::Join => 9,
            MessageBody::Leave => 10,
            MessageBody::System => 11,
            MessageBody::Unknown(code) => code,
        };
        raw
    }
}
