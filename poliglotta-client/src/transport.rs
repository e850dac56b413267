//! Trasporto HTTP nativo verso il server di chat.

use std::time::Duration;

use async_trait::async_trait;
use poliglotta_core::protocol::http::{CLEAR_PATH, MESSAGES_PATH, SEND_PATH};
use poliglotta_core::{
    ChatError, ChatTransport, ClearResponse, MediaUpload, Message, MessagesQuery, MessagesResponse,
    Result, SendRequest, StatusResponse, UploadKind, UploadResponse,
};
use reqwest::multipart::{Form, Part};
use serde_json::from_slice;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Client con timeout di connessione 3 s e di richiesta 10 s.
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_secs(10))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Legge il corpo come JSON solo se lo status è 2xx.
    async fn read_json<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ChatError::Http { endpoint: endpoint.to_string(), status: status.as_u16() });
        }
        let bytes = resp.bytes().await.map_err(|e| ChatError::transport(endpoint, e))?;
        from_slice(&bytes).map_err(|e| ChatError::decode(endpoint, e))
    }
}

#[async_trait(?Send)]
impl ChatTransport for HttpTransport {
    async fn fetch_messages(&self, query: &MessagesQuery) -> Result<Vec<Message>> {
        let resp = self
            .client
            .get(self.url(MESSAGES_PATH))
            .query(query)
            .send()
            .await
            .map_err(|e| ChatError::transport(MESSAGES_PATH, e))?;
        let body: MessagesResponse = Self::read_json(MESSAGES_PATH, resp).await?;
        Ok(body.messages)
    }

    async fn send_message(&self, request: &SendRequest) -> Result<()> {
        let resp = self
            .client
            .post(self.url(SEND_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::transport(SEND_PATH, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ChatError::Http { endpoint: SEND_PATH.to_string(), status: status.as_u16() });
        }
        // il riscontro serve solo per il log
        match resp.json::<StatusResponse>().await {
            Ok(ack) => debug!(status = %ack.status, "send acknowledged"),
            Err(err) => debug!(error = %err, "send acknowledged without status body"),
        }
        Ok(())
    }

    async fn clear_history(&self) -> Result<ClearResponse> {
        let resp = self
            .client
            .post(self.url(CLEAR_PATH))
            .send()
            .await
            .map_err(|e| ChatError::transport(CLEAR_PATH, e))?;
        Self::read_json(CLEAR_PATH, resp).await
    }

    async fn upload(&self, kind: UploadKind, file: MediaUpload) -> Result<UploadResponse> {
        let endpoint = kind.path();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .map_err(|e| ChatError::Media(e.to_string()))?;
        let form = Form::new().part(kind.field(), part);

        let resp = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChatError::transport(endpoint, e))?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| ChatError::transport(endpoint, e))?;

        // anche un 4xx può portare {status, message}: quello è l'errore da mostrare
        match from_slice::<UploadResponse>(&bytes) {
            Ok(body) => Ok(body),
            Err(e) if status.is_success() => Err(ChatError::decode(endpoint, e)),
            Err(_) => Err(ChatError::Http { endpoint: endpoint.to_string(), status: status.as_u16() }),
        }
    }
}
