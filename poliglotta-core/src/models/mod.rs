pub mod message;
pub mod preferences;

// Re-export per comodità
pub use message::{IdentityKey, Message, MessageKind, Timestamp};
pub use preferences::{MemoryStore, PreferenceStore, Preferences};
