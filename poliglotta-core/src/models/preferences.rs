use std::collections::HashMap;

use crate::error::{ChatError, Result};

pub const USERNAME_KEY: &str = "username";
pub const LANGUAGE_KEY: &str = "language";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Lingue proposte dal selettore: (codice, etichetta).
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("hi", "हिन्दी"),
    ("it", "Italiano"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("pt", "Português"),
    ("ja", "日本語"),
    ("zh", "中文"),
    ("ar", "العربية"),
];

/// Etichetta di una lingua; i codici sconosciuti si mostrano così come sono.
pub fn language_label(code: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Archivio chiave/valore locale (localStorage nel browser, file JSON in nativo).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Archivio in memoria, utile nei test.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferenze lette una volta al caricamento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub username: Option<String>,
    pub language: String,
}

impl Preferences {
    /// Legge le preferenze; se la lingua manca scrive il default `en`.
    pub fn load<S: PreferenceStore + ?Sized>(store: &mut S) -> Result<Self> {
        let username = store
            .get(USERNAME_KEY)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let language = match store.get(LANGUAGE_KEY).filter(|l| !l.trim().is_empty()) {
            Some(lang) => lang,
            None => {
                store.set(LANGUAGE_KEY, DEFAULT_LANGUAGE)?;
                DEFAULT_LANGUAGE.to_string()
            }
        };
        Ok(Self { username, language })
    }

    /// Salva un nuovo nome (senza spazi ai bordi). I nomi vuoti sono rifiutati.
    pub fn set_username<S: PreferenceStore + ?Sized>(&mut self, store: &mut S, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatError::InvalidName);
        }
        store.set(USERNAME_KEY, name)?;
        self.username = Some(name.to_string());
        Ok(())
    }

    pub fn set_language<S: PreferenceStore + ?Sized>(&mut self, store: &mut S, code: &str) -> Result<()> {
        let code = code.trim();
        store.set(LANGUAGE_KEY, code)?;
        self.language = code.to_string();
        Ok(())
    }
}
