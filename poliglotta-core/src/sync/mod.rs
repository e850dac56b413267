pub mod engine;
pub mod ledger;
pub mod session;
pub mod view;

pub use engine::{ChatTransport, PollOutcome, SendOutcome, SyncLoop, UploadOutcome};
pub use ledger::{EvictionPolicy, Ledger};
pub use session::Session;
pub use view::{MessageBody, MessageView, Renderer, ScrollMetrics, NEAR_BOTTOM_PX};
