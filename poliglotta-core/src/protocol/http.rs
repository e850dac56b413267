use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::Message;
/*
    dto per gli endpoint HTTP del server di chat
*/
pub const MESSAGES_PATH: &str = "/messages";
pub const SEND_PATH: &str = "/send";
pub const CLEAR_PATH: &str = "/clear";
pub const UPLOAD_IMAGE_PATH: &str = "/upload_image";
pub const UPLOAD_AUDIO_PATH: &str = "/upload_audio";

// Polling: GET /messages?lang=..&user=..
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesQuery {
    pub lang: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesResponse {
    /// Le voci non interpretabili si scartano una alla volta: il server rimanda
    /// sempre la stessa finestra, un messaggio rotto bloccherebbe ogni poll.
    #[serde(deserialize_with = "skip_malformed")]
    pub messages: Vec<Message>,
}

fn skip_malformed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Message>, D::Error> {
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Message>(entry) {
            Ok(message) => Some(message),
            Err(err) => {
                warn!(index, error = %err, "skipping malformed message");
                None
            }
        })
        .collect())
}

// Invio: POST /send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub text: String,
    pub from: String,
    pub to_lang: String,
}

/// Riscontro generico `{status, message?}` (usato per /send, solo a fini di log).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Pulizia storico: POST /clear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearResponse {
    pub status: String,
}

impl ClearResponse {
    pub fn is_cleared(&self) -> bool {
        self.status == "cleared"
    }
}

// Upload media: POST /upload_image | /upload_audio (multipart)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    /// Presente se status = ok
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Presente se status != ok
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Tipo di upload: determina endpoint e nome del campo multipart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Image,
    Audio,
}

impl UploadKind {
    pub fn path(self) -> &'static str {
        match self {
            UploadKind::Image => UPLOAD_IMAGE_PATH,
            UploadKind::Audio => UPLOAD_AUDIO_PATH,
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Audio => "audio",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// File pronto per l'upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    /// Deduce il mime dall'estensione del nome; `application/octet-stream` se sconosciuta.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self { file_name, mime, bytes }
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("webm") => "audio/webm",
        Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        _ => "application/octet-stream",
    }
}
