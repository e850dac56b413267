use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{PrimitiveDateTime, UtcOffset};

use crate::utils::time::{clock_label, datetime_from_text, datetime_from_unix};

/// Messaggio così come arriva dal polling di `/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "from")]
    pub sender: String,
    pub content: String,
    /// Assente sui server che non gestiscono media: vale `text`.
    #[serde(rename = "msg_type", default)]
    pub kind: MessageKind,
    pub timestamp: Timestamp,
}

/// Tipo di contenuto: insieme chiuso.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Audio,
}

/// Timestamp assegnato dal server: epoch in secondi (anche con frazioni) oppure stringa ISO-8601.
///
/// Il valore resta quello ricevuto, serve come chiave di identità: un epoch con
/// frazioni viene tenuto come testo del numero, così resta `Eq` e `Hash`.
/// L'ordine mette gli interi prima dei decimali e questi prima delle stringhe;
/// tra decimali con la stessa parte intera, e tra stringhe ISO dello stesso
/// formato, l'ordine del testo coincide con quello cronologico.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timestamp {
    Number(i64),
    Decimal(String),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Integer(secs) => Timestamp::Number(secs),
            RawTimestamp::Float(secs) => Timestamp::Decimal(secs.to_string()),
            RawTimestamp::Text(text) => Timestamp::Text(text),
        })
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Timestamp::Number(secs) => serializer.serialize_i64(*secs),
            Timestamp::Decimal(raw) => match raw.parse::<f64>() {
                Ok(secs) => serializer.serialize_f64(secs),
                Err(_) => serializer.serialize_str(raw),
            },
            Timestamp::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Chiave di deduplicazione `(timestamp, sender)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub timestamp: Timestamp,
    pub sender: String,
}

impl Message {
    pub fn identity(&self) -> IdentityKey {
        IdentityKey { timestamp: self.timestamp.clone(), sender: self.sender.clone() }
    }

    /// Nome mostrato: prima lettera maiuscola, il resto invariato.
    pub fn display_name(&self) -> String {
        let mut chars = self.sender.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Confronto case-insensitive (e senza spazi ai bordi) con l'utente locale.
    pub fn is_from(&self, user: &str) -> bool {
        self.sender.trim().to_lowercase() == user.trim().to_lowercase()
    }
}

impl Timestamp {
    /// Data/ora nel fuso `offset` di chi legge.
    pub fn to_datetime(&self, offset: UtcOffset) -> Option<PrimitiveDateTime> {
        match self {
            Timestamp::Number(secs) => datetime_from_unix(*secs, offset),
            Timestamp::Decimal(raw) => {
                let secs = raw.parse::<f64>().ok().filter(|s| s.is_finite())?;
                datetime_from_unix(secs.floor() as i64, offset)
            }
            Timestamp::Text(text) => datetime_from_text(text, offset),
        }
    }

    /// Etichetta `HH:MM` locale, se il timestamp è interpretabile.
    pub fn clock_label(&self, offset: UtcOffset) -> Option<String> {
        self.to_datetime(offset).and_then(clock_label)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Number(n) => write!(f, "{n}"),
            Timestamp::Decimal(s) | Timestamp::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp::Number(value)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp::Text(value.to_string())
    }
}
