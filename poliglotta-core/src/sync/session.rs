use time::UtcOffset;

use crate::models::Message;
use crate::protocol::{MessagesQuery, SendRequest};
use crate::sync::ledger::{EvictionPolicy, Ledger};
use crate::sync::view::MessageView;

/// Stato di una sessione di chat: chi siamo, in che lingua leggiamo, cosa abbiamo già mostrato.
#[derive(Debug, Clone)]
pub struct Session {
    user: String,
    language: String,
    first_load: bool,
    /// Incrementato ad ogni pulizia: le risposte partite prima vanno scartate.
    epoch: u64,
    ledger: Ledger,
    /// Fuso di chi legge per le etichette orarie; UTC se non impostato.
    utc_offset: UtcOffset,
}

impl Session {
    pub fn new(user: impl Into<String>, language: impl Into<String>, policy: EvictionPolicy) -> Self {
        Self {
            user: user.into(),
            language: language.into(),
            first_load: true,
            epoch: 0,
            ledger: Ledger::new(policy),
            utc_offset: UtcOffset::UTC,
        }
    }

    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn utc_offset(&self) -> UtcOffset {
        self.utc_offset
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_first_load(&self) -> bool {
        self.first_load
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn query(&self) -> MessagesQuery {
        MessagesQuery { lang: self.language.clone(), user: self.user.clone() }
    }

    pub fn send_request(&self, text: &str) -> SendRequest {
        SendRequest {
            text: text.to_string(),
            from: self.user.trim().to_string(),
            to_lang: self.language.trim().to_string(),
        }
    }

    pub fn view_of(&self, message: &Message) -> MessageView {
        MessageView::from_message(message, &self.user, self.utc_offset)
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.first_load = false;
    }

    /// Dimentica tutto ciò che è stato mostrato (dopo un `/clear` confermato).
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.first_load = true;
        self.epoch += 1;
    }
}
