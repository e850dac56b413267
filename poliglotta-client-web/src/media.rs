use js_sys::{Array, Uint8Array};
use poliglotta_core::{ChatError, Result};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag};

pub(crate) fn js_error(err: JsValue) -> ChatError {
    ChatError::Media(format!("{err:?}"))
}

/// Legge tutto il contenuto di un blob (o di un `File`).
pub async fn read_blob(blob: &Blob) -> Result<Vec<u8>> {
    let buffer = JsFuture::from(blob.array_buffer()).await.map_err(js_error)?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Costruisce un blob con il mime indicato a partire da byte.
pub fn blob_from_bytes(bytes: &[u8], mime: &str) -> Result<Blob> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    blob_from_parts(&parts, mime)
}

/// Unisce più parti (blob o array di byte) in un solo blob.
pub fn blob_from_parts(parts: &Array, mime: &str) -> Result<Blob> {
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(parts, &options).map_err(js_error)
}
