//! poliglotta-core: tipi condivisi tra i client (modelli, DTO HTTP, errori) e il loop
//! di sincronizzazione dei messaggi. Niente I/O o dipendenze non compatibili con WASM:
//! trasporto e interfaccia arrivano dai client tramite `ChatTransport` e `Renderer`.

pub mod error;
pub mod media;
pub mod models;
pub mod protocol;
pub mod sync;
pub mod utils;

// Re-export utili per ridurre i percorsi nei crate client
pub use error::{ChatError, Result};
pub use media::AudioPlayback;
pub use models::{IdentityKey, MemoryStore, Message, MessageKind, PreferenceStore, Preferences, Timestamp};
pub use protocol::http::{
    ClearResponse, MediaUpload, MessagesQuery, MessagesResponse, SendRequest, StatusResponse,
    UploadKind, UploadResponse,
};
pub use protocol::Outbound;
pub use sync::{
    ChatTransport, EvictionPolicy, Ledger, MessageBody, MessageView, PollOutcome, Renderer,
    ScrollMetrics, SendOutcome, Session, SyncLoop, UploadOutcome,
};
pub use utils::{format_clock, new_upload_name};
// i client passano il fuso di chi legge a `Session::with_utc_offset`
pub use time::UtcOffset;
