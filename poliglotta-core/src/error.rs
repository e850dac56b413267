use thiserror::Error;

/// Errore condiviso tra core e client (trasporto, preferenze, media).
#[derive(Debug, Error)]
pub enum ChatError {
    /// Connessione fallita o richiesta interrotta prima della risposta.
    #[error("request to {endpoint} failed: {detail}")]
    Transport { endpoint: String, detail: String },

    /// Il server ha risposto con uno status non 2xx.
    #[error("HTTP {status} from {endpoint}")]
    Http { endpoint: String, status: u16 },

    /// Corpo della risposta non interpretabile come JSON atteso.
    #[error("unexpected body from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },

    /// Lettura o scrittura delle preferenze locali fallita.
    #[error("preference storage error: {0}")]
    Storage(String),

    #[error("display name must not be empty")]
    InvalidName,

    /// Acquisizione o lettura di un file multimediale fallita.
    #[error("media error: {0}")]
    Media(String),
}

impl ChatError {
    pub fn transport(endpoint: impl Into<String>, detail: impl ToString) -> Self {
        Self::Transport { endpoint: endpoint.into(), detail: detail.to_string() }
    }

    pub fn decode(endpoint: impl Into<String>, detail: impl ToString) -> Self {
        Self::Decode { endpoint: endpoint.into(), detail: detail.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
