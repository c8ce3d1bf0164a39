use std::fmt;

/// Sender id used when the source message carries no identifiable sender.
/// Never present in a block list.
pub const UNKNOWN_SENDER: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Document,
    Sticker,
    Unknown,
}

/// Handle for fetching a media payload from the source account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub file_id: String,
}

impl MediaRef {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InboundMediaEvent {
    pub sender_id: String,
    pub message_id: i64,
    pub media_kind: MediaKind,
    pub mime_type: Option<String>,
    /// `None` when the message has no downloadable payload (plain text etc.)
    pub media: Option<MediaRef>,
}

impl InboundMediaEvent {
    pub fn new(sender_id: Option<String>, message_id: i64, media_kind: MediaKind) -> Self {
        Self {
            sender_id: normalize_sender_id(sender_id),
            message_id,
            media_kind,
            mime_type: None,
            media: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_media(mut self, media: MediaRef) -> Self {
        self.media = Some(media);
        self
    }
}

impl fmt::Display for InboundMediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "message {} from {} ({:?}, mime: {})",
            self.message_id,
            self.sender_id,
            self.media_kind,
            self.mime_type.as_deref().unwrap_or("none")
        )
    }
}

/// Missing or blank sender ids collapse to [`UNKNOWN_SENDER`].
pub fn normalize_sender_id(sender_id: Option<String>) -> String {
    match sender_id {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => UNKNOWN_SENDER.to_string(),
    }
}
