use super::sink::MediaSource;
use super::types::{InboundMediaEvent, MediaKind, MediaRef};
use crate::error::RelayError;
use crate::relay::{BotSender, DeliveryMethod};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Long-polling update stream of one Telegram account.
#[async_trait]
pub trait UpdateFeed: Send + Sync {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: u64,
    ) -> Result<Vec<TelegramUpdate>, RelayError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
    pub channel_post: Option<TelegramMessage>,
}

impl TelegramUpdate {
    pub fn into_message(self) -> Option<TelegramMessage> {
        self.message.or(self.channel_post)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub sender_chat: Option<TelegramChat>,
    pub chat: TelegramChat,
    pub text: Option<String>,
    pub photo: Option<Vec<TelegramPhotoSize>>,
    pub document: Option<TelegramFile>,
    pub video: Option<TelegramFile>,
    pub animation: Option<TelegramFile>,
    pub audio: Option<TelegramFile>,
    pub voice: Option<TelegramFile>,
    pub sticker: Option<TelegramSticker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramPhotoSize {
    pub file_id: String,
    pub file_size: Option<u64>,
}

/// Shared shape of documents, videos, animations, audio and voice notes.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramFile {
    pub file_id: String,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSticker {
    pub file_id: String,
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default)]
    pub is_video: bool,
}

impl TelegramSticker {
    /// The Bot API does not report a mime type for stickers; derive the one
    /// the sticker format implies.
    pub fn mime_type(&self) -> &'static str {
        if self.is_video {
            "video/webm"
        } else if self.is_animated {
            "application/x-tgsticker"
        } else {
            "image/webp"
        }
    }
}

impl TelegramMessage {
    /// Id of whoever posted the message: the user, or the chat for
    /// anonymous channel posts.
    pub fn sender_id(&self) -> Option<String> {
        self.from
            .as_ref()
            .map(|u| u.id)
            .or_else(|| self.sender_chat.as_ref().map(|c| c.id))
            .map(|id| id.to_string())
    }

    pub fn to_media_event(&self) -> InboundMediaEvent {
        let event = InboundMediaEvent::new(self.sender_id(), self.message_id, MediaKind::Unknown);

        if let Some(largest) = self.photo.as_ref().and_then(|sizes| sizes.last()) {
            return InboundMediaEvent {
                media_kind: MediaKind::Photo,
                ..event
            }
            .with_media(MediaRef::new(&largest.file_id));
        }

        if let Some(sticker) = &self.sticker {
            return InboundMediaEvent {
                media_kind: MediaKind::Sticker,
                ..event
            }
            .with_mime_type(Some(sticker.mime_type().to_string()))
            .with_media(MediaRef::new(&sticker.file_id));
        }

        let document = self
            .document
            .as_ref()
            .or(self.animation.as_ref())
            .or(self.video.as_ref())
            .or(self.audio.as_ref())
            .or(self.voice.as_ref());

        match document {
            Some(file) => InboundMediaEvent {
                media_kind: MediaKind::Document,
                ..event
            }
            .with_mime_type(file.mime_type.clone())
            .with_media(MediaRef::new(&file.file_id)),
            None => event,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    file_path: Option<String>,
}

/// Minimal Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    api_base: String,
}

impl TelegramClient {
    pub fn with_options(
        bot_token: String,
        api_base: &str,
        request_timeout: Duration,
    ) -> Result<Self, RelayError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            bot_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    async fn read_response<T: DeserializeOwned>(
        method: &str,
        resp: reqwest::Response,
    ) -> Result<T, RelayError> {
        let status = resp.status();
        let body: ApiResponse<T> = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                return Err(RelayError::telegram(
                    method,
                    format!("unreadable response (HTTP {}): {}", status, e),
                ))
            }
        };

        if !body.ok {
            let description = body
                .description
                .unwrap_or_else(|| format!("HTTP {}", status));
            error!("Telegram {} error: {}", method, description);
            return Err(RelayError::telegram(method, description));
        }

        body.result
            .ok_or_else(|| RelayError::telegram(method, "response without result"))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, RelayError> {
        let resp = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;
        Self::read_response(method, resp).await
    }

    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), RelayError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }
        let _: serde_json::Value = self.call("sendMessage", body).await?;
        Ok(())
    }

    pub async fn get_file_download_url(&self, file_id: &str) -> Result<String, RelayError> {
        let info: FileInfo = self.call("getFile", json!({ "file_id": file_id })).await?;

        match info.file_path {
            Some(path) => Ok(format!(
                "{}/file/bot{}/{}",
                self.api_base, self.bot_token, path
            )),
            None => Err(RelayError::Download {
                file_id: file_id.to_string(),
                reason: "Telegram returned no file_path".to_string(),
            }),
        }
    }

    pub async fn download_file(&self, url: &str) -> Result<Vec<u8>, RelayError> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Upload a local file with the send primitive matching `method`.
    /// Captions are always sent as MarkdownV2.
    pub async fn send_file(
        &self,
        method: DeliveryMethod,
        chat_id: &str,
        path: &Path,
        caption: &str,
    ) -> Result<(), RelayError> {
        let (api_method, field) = match method {
            DeliveryMethod::Image => ("sendPhoto", "photo"),
            DeliveryMethod::Video => ("sendVideo", "video"),
            DeliveryMethod::Audio => ("sendAudio", "audio"),
            DeliveryMethod::Generic => ("sendDocument", "document"),
        };

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("parse_mode", "MarkdownV2")
            .file(field, path)
            .await?;

        let resp = self
            .client
            .post(self.method_url(api_method))
            .multipart(form)
            .send()
            .await?;
        let _: serde_json::Value = Self::read_response(api_method, resp).await?;
        debug!("{} to {} done", api_method, chat_id);
        Ok(())
    }
}

#[async_trait]
impl UpdateFeed for TelegramClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: u64,
    ) -> Result<Vec<TelegramUpdate>, RelayError> {
        let mut body = json!({
            "timeout": timeout,
            "allowed_updates": ["message", "channel_post"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }

        // The long poll holds the request open for `timeout` seconds.
        let resp = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(timeout + 10))
            .json(&body)
            .send()
            .await?;
        Self::read_response("getUpdates", resp).await
    }
}

#[async_trait]
impl MediaSource for TelegramClient {
    async fn download_media(&self, media: &MediaRef) -> Result<Vec<u8>, RelayError> {
        let url = self.get_file_download_url(&media.file_id).await?;
        self.download_file(&url).await
    }
}

#[async_trait]
impl BotSender for TelegramClient {
    async fn send_photo(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.send_file(DeliveryMethod::Image, chat_id, path, caption)
            .await
    }

    async fn send_video(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.send_file(DeliveryMethod::Video, chat_id, path, caption)
            .await
    }

    async fn send_audio(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.send_file(DeliveryMethod::Audio, chat_id, path, caption)
            .await
    }

    async fn send_document(
        &self,
        chat_id: &str,
        path: &Path,
        caption: &str,
    ) -> Result<(), RelayError> {
        self.send_file(DeliveryMethod::Generic, chat_id, path, caption)
            .await
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), RelayError> {
        TelegramClient::send_message(self, chat_id, text, Some("MarkdownV2")).await
    }
}
