//! Trasporto via `fetch` del browser.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use poliglotta_core::protocol::http::{CLEAR_PATH, MESSAGES_PATH, SEND_PATH};
use poliglotta_core::{
    ChatError, ChatTransport, ClearResponse, MediaUpload, Message, MessagesQuery, MessagesResponse,
    Result, SendRequest, UploadKind, UploadResponse,
};
use tracing::debug;
use web_sys::FormData;

use crate::media::{blob_from_bytes, js_error};

/// Il widget è servito dallo stesso server della chat: percorsi relativi.
#[derive(Debug, Clone, Default)]
pub struct FetchTransport {
    base: String,
}

impl FetchTransport {
    pub fn same_origin() -> Self {
        Self::default()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

fn check(endpoint: &str, resp: &Response) -> Result<()> {
    if resp.ok() {
        Ok(())
    } else {
        Err(ChatError::Http { endpoint: endpoint.to_string(), status: resp.status() })
    }
}

#[async_trait(?Send)]
impl ChatTransport for FetchTransport {
    async fn fetch_messages(&self, query: &MessagesQuery) -> Result<Vec<Message>> {
        let resp = Request::get(&self.url(MESSAGES_PATH))
            .query([("lang", query.lang.as_str()), ("user", query.user.as_str())])
            .send()
            .await
            .map_err(|e| ChatError::transport(MESSAGES_PATH, e))?;
        check(MESSAGES_PATH, &resp)?;
        let body: MessagesResponse = resp.json().await.map_err(|e| ChatError::decode(MESSAGES_PATH, e))?;
        Ok(body.messages)
    }

    async fn send_message(&self, request: &SendRequest) -> Result<()> {
        let resp = Request::post(&self.url(SEND_PATH))
            .json(request)
            .map_err(|e| ChatError::transport(SEND_PATH, e))?
            .send()
            .await
            .map_err(|e| ChatError::transport(SEND_PATH, e))?;
        check(SEND_PATH, &resp)?;
        debug!(status = resp.status(), "send acknowledged");
        Ok(())
    }

    async fn clear_history(&self) -> Result<ClearResponse> {
        let resp = Request::post(&self.url(CLEAR_PATH))
            .send()
            .await
            .map_err(|e| ChatError::transport(CLEAR_PATH, e))?;
        check(CLEAR_PATH, &resp)?;
        resp.json().await.map_err(|e| ChatError::decode(CLEAR_PATH, e))
    }

    async fn upload(&self, kind: UploadKind, file: MediaUpload) -> Result<UploadResponse> {
        let endpoint = kind.path();
        let blob = blob_from_bytes(&file.bytes, &file.mime)?;
        let form = FormData::new().map_err(js_error)?;
        form.append_with_blob_and_filename(kind.field(), &blob, &file.file_name)
            .map_err(js_error)?;

        let resp = Request::post(&self.url(endpoint))
            .body(form)
            .map_err(|e| ChatError::transport(endpoint, e))?
            .send()
            .await
            .map_err(|e| ChatError::transport(endpoint, e))?;
        let status = resp.status();
        let bytes = resp.binary().await.map_err(|e| ChatError::transport(endpoint, e))?;

        // anche un 4xx può portare {status, message}
        match serde_json::from_slice::<UploadResponse>(&bytes) {
            Ok(body) => Ok(body),
            Err(e) if resp.ok() => Err(ChatError::decode(endpoint, e)),
            Err(_) => Err(ChatError::Http { endpoint: endpoint.to_string(), status }),
        }
    }
}
