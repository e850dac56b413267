//! Client da terminale: trasporto `reqwest`, preferenze su file JSON e renderer a righe
//! attorno al `SyncLoop` di poliglotta-core.

pub mod app;
pub mod config;
pub mod prefs;
pub mod terminal;
pub mod transport;

pub use config::Args;
pub use prefs::JsonFileStore;
pub use terminal::TerminalRenderer;
pub use transport::HttpTransport;
