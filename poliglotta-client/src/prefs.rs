use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use poliglotta_core::{ChatError, PreferenceStore};

// Dato un percorso di file, restituisce il percorso assoluto. Crea le directory genitrici se non esistono.
pub fn prefs_path_for(p: &Path) -> anyhow::Result<PathBuf> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent dirs for {:?}", parent))?;
    }
    Ok(abs)
}

/// Preferenze salvate in un file JSON piatto `{ "username": ..., "language": ... }`.
/// Ogni `set` riscrive l'intero file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Apre il file se esiste; un file assente o vuoto vale come archivio vuoto.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let path = prefs_path_for(path)?;
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("parse preferences file {:?}", path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e).with_context(|| format!("read preferences file {:?}", path)),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), ChatError> {
        let raw = serde_json::to_string_pretty(&self.values)
            .map_err(|e| ChatError::Storage(e.to_string()))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| ChatError::Storage(format!("write {:?}: {}", self.path, e)))
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ChatError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}
