use std::collections::HashSet;

use crate::models::{IdentityKey, Message};

/// Politica di rimozione delle identità già viste.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Crescita illimitata: va bene per una sessione breve (pagina web).
    #[default]
    Never,
    /// Dopo ogni poll scarta le identità più vecchie del messaggio più vecchio ancora visibile.
    OlderThanVisible,
}

/// Insieme delle identità `(timestamp, sender)` già renderizzate.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    seen: HashSet<IdentityKey>,
    policy: EvictionPolicy,
}

impl Ledger {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self { seen: HashSet::new(), policy }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.seen.contains(key)
    }

    /// Messaggi della risposta mai visti prima, nell'ordine di arrivo.
    /// Anche i duplicati all'interno della stessa risposta compaiono una sola volta.
    pub fn diff<'m>(&self, incoming: &'m [Message]) -> Vec<&'m Message> {
        let mut batch = HashSet::new();
        incoming
            .iter()
            .filter(|m| {
                let key = m.identity();
                !self.seen.contains(&key) && batch.insert(key)
            })
            .collect()
    }

    /// Registra un'identità; `false` se era già presente.
    pub fn record(&mut self, key: IdentityKey) -> bool {
        self.seen.insert(key)
    }

    /// Applica la politica di rimozione rispetto ai messaggi visibili nell'ultima risposta.
    /// Restituisce quante identità sono state scartate.
    pub fn evict(&mut self, visible: &[Message]) -> usize {
        if self.policy == EvictionPolicy::Never {
            return 0;
        }
        let Some(oldest) = visible.iter().map(|m| &m.timestamp).min() else {
            return 0;
        };
        let before = self.seen.len();
        self.seen.retain(|k| k.timestamp >= *oldest);
        before - self.seen.len()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
