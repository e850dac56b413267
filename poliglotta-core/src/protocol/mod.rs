pub mod command;
pub mod http;

// Re-export comodi
pub use command::Outbound;
pub use http::{
    ClearResponse, MediaUpload, MessagesQuery, MessagesResponse, SendRequest, StatusResponse,
    UploadKind, UploadResponse,
};
