use std::cell::{Cell, Ref, RefCell};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::Message;
use crate::protocol::{
    ClearResponse, MediaUpload, MessagesQuery, Outbound, SendRequest, UploadKind, UploadResponse,
};
use crate::sync::session::Session;
use crate::sync::view::Renderer;

/// Trasporto verso il server di chat. `?Send`: nel browser i future non sono `Send`.
#[async_trait(?Send)]
pub trait ChatTransport {
    async fn fetch_messages(&self, query: &MessagesQuery) -> Result<Vec<Message>>;
    async fn send_message(&self, request: &SendRequest) -> Result<()>;
    async fn clear_history(&self) -> Result<ClearResponse>;
    async fn upload(&self, kind: UploadKind, file: MediaUpload) -> Result<UploadResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Poll eseguito: quanti nodi nuovi sono stati aggiunti.
    Rendered(usize),
    /// Un altro poll era in corso: farà un giro in più al posto di questo.
    Coalesced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Testo vuoto.
    Ignored,
    Sent,
    Cleared,
    /// `/clear` non confermato dal server.
    ClearRefused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { url: String },
    /// Il server ha risposto con uno status diverso da "ok".
    Rejected { message: String },
    /// Errore di trasporto.
    Failed,
}

/// Loop di sincronizzazione: polling, deduplicazione, rendering e invio.
///
/// Pensato per un solo thread: gli stati interni sono in `Cell`/`RefCell`
/// e nessun borrow attraversa un `.await`. Condividerlo con `Rc`.
pub struct SyncLoop<T, R> {
    transport: T,
    renderer: RefCell<R>,
    session: RefCell<Session>,
    in_flight: Cell<bool>,
    rerun: Cell<bool>,
}

/// Rilascia il flag di poll in corso anche quando il fetch fallisce.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T: ChatTransport, R: Renderer> SyncLoop<T, R> {
    pub fn new(transport: T, renderer: R, session: Session) -> Self {
        Self {
            transport,
            renderer: RefCell::new(renderer),
            session: RefCell::new(session),
            in_flight: Cell::new(false),
            rerun: Cell::new(false),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> Ref<'_, Session> {
        self.session.borrow()
    }

    pub fn renderer(&self) -> Ref<'_, R> {
        self.renderer.borrow()
    }

    pub fn is_polling(&self) -> bool {
        self.in_flight.get()
    }

    /// Scarica i messaggi visibili e mostra quelli nuovi.
    ///
    /// Al massimo un poll alla volta: una richiesta che arriva mentre un altro
    /// è in corso viene accorpata e il poll attivo ripete il fetch una volta.
    pub async fn poll(&self) -> Result<PollOutcome> {
        if self.in_flight.replace(true) {
            self.rerun.set(true);
            debug!("poll already in flight, coalescing");
            return Ok(PollOutcome::Coalesced);
        }
        let _guard = InFlight(&self.in_flight);

        let mut rendered = 0;
        loop {
            self.rerun.set(false);
            let (query, epoch) = {
                let session = self.session.borrow();
                (session.query(), session.epoch())
            };
            let messages = self.transport.fetch_messages(&query).await?;
            if self.session.borrow().epoch() != epoch {
                debug!("history cleared while polling, refetching");
                continue;
            }
            rendered += self.render_batch(&messages);
            if !self.rerun.get() {
                break;
            }
        }
        debug!(rendered, "poll complete");
        Ok(PollOutcome::Rendered(rendered))
    }

    fn render_batch(&self, messages: &[Message]) -> usize {
        let fresh: Vec<Message> = self
            .session
            .borrow()
            .ledger()
            .diff(messages)
            .into_iter()
            .cloned()
            .collect();
        let count = fresh.iter().filter(|m| self.render(m)).count();

        let evicted = self.session.borrow_mut().ledger_mut().evict(messages);
        if evicted > 0 {
            debug!(evicted, "dropped identities older than the visible window");
        }
        count
    }

    /// Aggiunge il nodo di un messaggio mai visto. `false` se l'identità era già nota.
    pub fn render(&self, message: &Message) -> bool {
        let mut session = self.session.borrow_mut();
        if !session.ledger_mut().record(message.identity()) {
            return false;
        }
        let view = session.view_of(message);

        let mut renderer = self.renderer.borrow_mut();
        // la posizione va letta prima di aggiungere il nodo
        let follow = session.is_first_load() || renderer.is_near_bottom();
        renderer.append(view);
        if follow {
            renderer.scroll_to_bottom();
        }
        session.mark_rendered();
        true
    }

    /// Invia il testo della casella; `/clear` viene intercettato e non arriva mai a `/send`.
    pub async fn send(&self, input: &str) -> Result<SendOutcome> {
        match Outbound::parse(input) {
            Outbound::Empty => Ok(SendOutcome::Ignored),
            Outbound::Clear => self.clear_history().await,
            Outbound::Say(text) => {
                self.renderer.borrow_mut().clear_input();
                let request = self.session.borrow().send_request(text);
                info!(from = %request.from, to_lang = %request.to_lang, "sending message");
                self.transport.send_message(&request).await?;
                self.poll().await?;
                Ok(SendOutcome::Sent)
            }
        }
    }

    async fn clear_history(&self) -> Result<SendOutcome> {
        let response = self.transport.clear_history().await?;
        if !response.is_cleared() {
            warn!(status = %response.status, "clear not confirmed by server");
            return Ok(SendOutcome::ClearRefused);
        }
        info!("chat history cleared");
        self.session.borrow_mut().reset();
        {
            let mut renderer = self.renderer.borrow_mut();
            renderer.clear_view();
            renderer.clear_input();
        }
        self.poll().await?;
        Ok(SendOutcome::Cleared)
    }

    /// Carica un'immagine o un audio. Gli errori diventano un avviso per l'utente, mai fatali.
    pub async fn upload(&self, kind: UploadKind, file: MediaUpload) -> UploadOutcome {
        let file_name = file.file_name.clone();
        match self.transport.upload(kind, file).await {
            Ok(response) if response.is_ok() => {
                let url = response.url.unwrap_or_default();
                info!(%kind, file = %file_name, %url, "upload accepted");
                if let Err(err) = self.poll().await {
                    warn!(error = %err, "poll after upload failed");
                }
                UploadOutcome::Uploaded { url }
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| format!("server replied {}", response.status));
                warn!(%kind, file = %file_name, %message, "upload rejected");
                self.alert(&format!("Upload failed: {message}"));
                UploadOutcome::Rejected { message }
            }
            Err(err) => {
                warn!(%kind, file = %file_name, error = %err, "upload failed");
                self.alert(&format!("Upload failed: {err}"));
                UploadOutcome::Failed
            }
        }
    }

    /// Mostra un avviso tramite il renderer.
    pub fn alert(&self, text: &str) {
        self.renderer.borrow_mut().alert(text);
    }
}
