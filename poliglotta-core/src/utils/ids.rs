use uuid::Uuid;

/// Nome univoco per un file caricato (es. "recording-<uuid>.webm").
pub fn new_upload_name(prefix: &str, ext: &str) -> String {
    format!("{prefix}-{}.{ext}", Uuid::new_v4())
}
