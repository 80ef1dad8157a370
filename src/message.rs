//! Conversion of chat RPC messages into renderer-facing [`Message`] values.

use serde::Serialize;
use tracing::trace;

use crate::config::ViewConfig;
use crate::hidden::HiddenString;
use crate::models::{
    AttachmentType, DeviceType, MentionsChannel, Message, MessageAttachment, MessageCommon,
    MessageText,
};
use crate::wire::chat::{
    AssetMetadata, ChannelMention, MessageBody, MessageUnboxedState, UiMessage, UiMessageValid,
};

pub const MAX_ATTACHMENT_PREVIEW_SIZE: f64 = 320.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewSize {
    pub width: f64,
    pub height: f64,
}

/// Why a wire message produced no view message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotValid(MessageUnboxedState),
    MissingPayload,
    UnsupportedBody(&'static str),
    MissingAttachment,
}

impl SkipReason {
    /// Malformed upstream data, as opposed to a message the view simply ignores.
    pub fn is_malformed(&self) -> bool {
        matches!(self, SkipReason::MissingPayload | SkipReason::MissingAttachment)
    }
}

fn sanitize_dimension(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub fn clamp_attachment_preview_size(width: f64, height: f64) -> PreviewSize {
    clamp_attachment_preview_size_with(width, height, MAX_ATTACHMENT_PREVIEW_SIZE)
}

/// Cap the longer axis at `max` and scale the other to keep the aspect ratio.
/// A zero longer axis yields a zero shorter axis. Sizes already within `max`
/// come back unchanged, so clamping twice equals clamping once.
pub fn clamp_attachment_preview_size_with(width: f64, height: f64, max: f64) -> PreviewSize {
    let width = sanitize_dimension(width);
    let height = sanitize_dimension(height);
    let max = sanitize_dimension(max);
    if width.max(height) <= max {
        return PreviewSize { width, height };
    }
    if height > width {
        let clamped = height.clamp(0.0, max);
        PreviewSize {
            width: clamped * width / height,
            height: clamped,
        }
    } else {
        let clamped = width.clamp(0.0, max);
        let divisor = if width == 0.0 { 1.0 } else { width };
        PreviewSize {
            width: clamped,
            height: clamped * height / divisor,
        }
    }
}

fn mentions_channel(mention: ChannelMention) -> MentionsChannel {
    match mention {
        ChannelMention::All => MentionsChannel::All,
        ChannelMention::Here => MentionsChannel::Here,
        ChannelMention::None => MentionsChannel::None,
    }
}

fn attachment_type(mime_type: &str) -> AttachmentType {
    if mime_type.starts_with("image") {
        AttachmentType::Image
    } else {
        AttachmentType::Other
    }
}

fn common_fields(conversation_id_key: &str, m: &UiMessageValid) -> MessageCommon {
    MessageCommon {
        author: m.sender_username.clone(),
        conversation_id_key: conversation_id_key.to_string(),
        device_name: m.sender_device_name.clone(),
        device_revoked_at: m.sender_device_revoked_at,
        device_type: DeviceType::from_wire(&m.sender_device_type),
        has_been_edited: m.superseded,
        id: m.message_id,
        ordinal: m.message_id,
        timestamp: m.ctime,
    }
}

/// Normalize one wire message, or report why it was skipped.
pub fn classify_ui_message(
    config: &ViewConfig,
    conversation_id_key: &str,
    ui_message: &UiMessage,
) -> Result<Message, SkipReason> {
    if ui_message.state != MessageUnboxedState::Valid {
        return Err(SkipReason::NotValid(ui_message.state));
    }
    let m = ui_message.valid.as_ref().ok_or(SkipReason::MissingPayload)?;
    let common = common_fields(conversation_id_key, m);

    match &m.message_body {
        MessageBody::Text(text) => {
            let raw = text.as_ref().map(|t| t.body.as_str()).unwrap_or_default();
            Ok(Message::Text(MessageText {
                common,
                mentions_at: m.at_mentions.iter().flatten().cloned().collect(),
                mentions_channel: mentions_channel(m.channel_mention),
                text: HiddenString::new(raw),
            }))
        }
        MessageBody::Attachment(attachment) => {
            let asset = &attachment.as_ref().ok_or(SkipReason::MissingAttachment)?.object;
            let (width, height, duration_ms) = match asset.metadata {
                AssetMetadata::Video(video) => (video.width, video.height, video.duration_ms),
                AssetMetadata::Image(image) => (image.width, image.height, 0),
                AssetMetadata::Audio(_) | AssetMetadata::None => (0, 0, 0),
            };
            let preview = clamp_attachment_preview_size_with(
                width as f64,
                height as f64,
                config.max_attachment_preview,
            );
            Ok(Message::Attachment(MessageAttachment {
                common,
                attachment_type: attachment_type(&asset.mime_type),
                duration_ms,
                filename: asset.filename.clone(),
                // upload progress is not carried by this payload
                percent_uploaded: 0,
                preview_height: preview.height,
                preview_width: preview.width,
                title: asset.title.clone(),
            }))
        }
        MessageBody::None
        | MessageBody::Edit
        | MessageBody::Delete
        | MessageBody::Metadata
        | MessageBody::Tlfname
        | MessageBody::Headline
        | MessageBody::AttachmentUploaded
        | MessageBody::Join
        | MessageBody::Leave
        | MessageBody::System
        | MessageBody::Unknown(_) => {
            Err(SkipReason::UnsupportedBody(m.message_body.type_name()))
        }
    }
}

/// `None` means "ignore this message", never an error.
pub fn ui_message_to_message(conversation_id_key: &str, ui_message: &UiMessage) -> Option<Message> {
    ui_message_to_message_with(&ViewConfig::default(), conversation_id_key, ui_message)
}

pub fn ui_message_to_message_with(
    config: &ViewConfig,
    conversation_id_key: &str,
    ui_message: &UiMessage,
) -> Option<Message> {
    classify_ui_message(config, conversation_id_key, ui_message).ok()
}

pub fn normalize_messages(conversation_id_key: &str, ui_messages: &[UiMessage]) -> Vec<Message> {
    normalize_messages_with(&ViewConfig::default(), conversation_id_key, ui_messages)
}

pub fn normalize_messages_with(
    config: &ViewConfig,
    conversation_id_key: &str,
    ui_messages: &[UiMessage],
) -> Vec<Message> {
    ui_messages
        .iter()
        .filter_map(
            |ui_message| match classify_ui_message(config, conversation_id_key, ui_message) {
                Ok(message) => Some(message),
                Err(reason) => {
                    trace!(
                        conversation = %conversation_id_key,
                        ?reason,
                        malformed = reason.is_malformed(),
                        "skipped chat message"
                    );
                    None
                }
            },
        )
        .collect()
}
