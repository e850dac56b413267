use time::UtcOffset;

use crate::models::{IdentityKey, Message, MessageKind};

/// Distanza dal fondo (in pixel) entro cui la vista segue i nuovi messaggi.
pub const NEAR_BOTTOM_PX: f64 = 100.0;

/// Contenuto da mostrare, già smistato per tipo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Image { url: String },
    Audio { url: String },
}

/// Nodo della lista messaggi, pronto per un renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub key: IdentityKey,
    /// Nome con l'iniziale maiuscola.
    pub sender: String,
    /// Scritto dall'utente locale.
    pub personal: bool,
    /// `HH:MM` se il timestamp è interpretabile.
    pub time: Option<String>,
    pub body: MessageBody,
}

impl MessageView {
    /// `offset` è il fuso di chi legge, usato per l'etichetta `HH:MM`.
    pub fn from_message(message: &Message, local_user: &str, offset: UtcOffset) -> Self {
        let body = match message.kind {
            MessageKind::Text => MessageBody::Text(message.content.clone()),
            MessageKind::Image => MessageBody::Image { url: message.content.clone() },
            MessageKind::Audio => MessageBody::Audio { url: message.content.clone() },
        };
        Self {
            key: message.identity(),
            sender: message.display_name(),
            personal: message.is_from(local_user),
            time: message.timestamp.clock_label(offset),
            body,
        }
    }
}

/// Misure del contenitore scrollabile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_height: f64,
    pub scroll_top: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn is_near_bottom(&self) -> bool {
        self.scroll_height - self.scroll_top <= self.client_height + NEAR_BOTTOM_PX
    }
}

/// Adattatore verso l'interfaccia (DOM, terminale, test).
pub trait Renderer {
    /// Aggiunge un nodo in fondo alla lista.
    fn append(&mut self, view: MessageView);
    /// Misurato prima di aggiungere il nodo.
    fn is_near_bottom(&self) -> bool;
    fn scroll_to_bottom(&mut self);
    /// Svuota la lista dei messaggi.
    fn clear_view(&mut self);
    /// Svuota la casella di testo.
    fn clear_input(&mut self);
    /// Avviso bloccante per l'utente.
    fn alert(&mut self, text: &str);
}
