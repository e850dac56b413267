use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::Rc;

use async_trait::async_trait;
use poliglotta_core::*;
use tokio::sync::oneshot;
use tokio::task::LocalSet;

/*
    Trasporto finto: tiene lo "stato del server" in memoria e conta le chiamate per endpoint.
    Con `hold_next_fetch` il prossimo fetch fotografa i messaggi e poi resta fermo finché
    il test non rilascia il canale, così si possono simulare poll sovrapposti.
*/
#[derive(Default)]
struct ServerState {
    messages: RefCell<Vec<Message>>,
    /// Se presente, il fetch decodifica questo corpo JSON come farebbe un trasporto reale.
    raw_body: RefCell<Option<String>>,
    fetches: Cell<usize>,
    sends: RefCell<Vec<SendRequest>>,
    clears: Cell<usize>,
    clear_status: RefCell<Option<String>>,
    upload_reply: RefCell<Option<UploadResponse>>,
    upload_fails: Cell<bool>,
    fetch_fails: Cell<bool>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

#[derive(Clone, Default)]
struct FakeServer(Rc<ServerState>);

impl Deref for FakeServer {
    type Target = ServerState;

    fn deref(&self) -> &ServerState {
        &self.0
    }
}

impl ServerState {
    fn push(&self, m: Message) {
        self.messages.borrow_mut().push(m);
    }

    fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl ChatTransport for FakeServer {
    async fn fetch_messages(&self, _query: &MessagesQuery) -> Result<Vec<Message>> {
        self.fetches.set(self.fetches.get() + 1);
        if self.fetch_fails.get() {
            return Err(ChatError::transport("/messages", "connection refused"));
        }
        let raw = self.raw_body.borrow().clone();
        let snapshot = match raw {
            Some(body) => {
                serde_json::from_str::<MessagesResponse>(&body)
                    .map_err(|e| ChatError::decode("/messages", e))?
                    .messages
            }
            None => self.messages.borrow().clone(),
        };
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(snapshot)
    }

    async fn send_message(&self, request: &SendRequest) -> Result<()> {
        self.sends.borrow_mut().push(request.clone());
        // il server registra il messaggio e lo restituirà al prossimo poll
        let ts = self.messages.borrow().len() as i64 + 100;
        self.push(text(ts, &request.from, &request.text));
        Ok(())
    }

    async fn clear_history(&self) -> Result<ClearResponse> {
        self.clears.set(self.clears.get() + 1);
        let status = self.clear_status.borrow().clone().unwrap_or_else(|| "cleared".to_string());
        if status == "cleared" {
            self.messages.borrow_mut().clear();
        }
        Ok(ClearResponse { status })
    }

    async fn upload(&self, _kind: UploadKind, _file: MediaUpload) -> Result<UploadResponse> {
        if self.upload_fails.get() {
            return Err(ChatError::transport("/upload_image", "connection reset"));
        }
        Ok(self.upload_reply.borrow().clone().unwrap_or(UploadResponse {
            status: "ok".to_string(),
            url: Some("/media/x.png".to_string()),
            message: None,
        }))
    }
}

/// Renderer che registra tutto ciò che gli viene chiesto.
#[derive(Default)]
struct Recorder {
    nodes: Vec<MessageView>,
    near_bottom: bool,
    scrolls: usize,
    view_clears: usize,
    input_clears: usize,
    alerts: Vec<String>,
}

impl Renderer for Recorder {
    fn append(&mut self, view: MessageView) {
        self.nodes.push(view);
    }
    fn is_near_bottom(&self) -> bool {
        self.near_bottom
    }
    fn scroll_to_bottom(&mut self) {
        self.scrolls += 1;
    }
    fn clear_view(&mut self) {
        self.nodes.clear();
        self.view_clears += 1;
    }
    fn clear_input(&mut self) {
        self.input_clears += 1;
    }
    fn alert(&mut self, text: &str) {
        self.alerts.push(text.to_string());
    }
}

fn text(ts: i64, from: &str, content: &str) -> Message {
    Message {
        sender: from.to_string(),
        content: content.to_string(),
        kind: MessageKind::Text,
        timestamp: Timestamp::Number(ts),
    }
}

fn setup(user: &str) -> (FakeServer, SyncLoop<FakeServer, Recorder>) {
    let server = FakeServer::default();
    let renderer = Recorder { near_bottom: true, ..Recorder::default() };
    let sync = SyncLoop::new(server.clone(), renderer, Session::new(user, "en", EvictionPolicy::Never));
    (server, sync)
}

fn rendered_keys(sync: &SyncLoop<FakeServer, Recorder>) -> Vec<IdentityKey> {
    sync.renderer().nodes.iter().map(|n| n.key.clone()).collect()
}

/*
    Obiettivo test: con poll che restituiscono insiemi sovrapposti (anche riordinati)
    ogni identità (timestamp, sender) viene renderizzata una sola volta.
*/
#[tokio::test]
async fn overlapping_polls_render_each_identity_once() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    server.push(text(1, "alice", "a"));
    server.push(text(2, "bob", "b"));
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(2));

    // il server riordina e aggiunge: solo il nuovo messaggio compare
    *server.messages.borrow_mut() = vec![text(3, "bob", "c"), text(2, "bob", "b"), text(1, "alice", "a")];
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(1));

    // poll su stato invariato: nessun cambiamento visibile
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(0));

    let keys = rendered_keys(&sync);
    assert_eq!(keys.len(), 3);
    assert_eq!(keys[2], text(3, "bob", "c").identity());
    Ok(())
}

#[tokio::test]
async fn same_timestamp_different_sender_are_distinct() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    server.push(text(5, "alice", "x"));
    server.push(text(5, "bob", "y"));
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(2));
    Ok(())
}

/*
    Obiettivo test: "/clear" in qualsiasi forma non arriva mai a /send, va sempre a /clear,
    e una volta confermato svuota vista e identità note.
*/
#[tokio::test]
async fn clear_command_never_reaches_send() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    server.push(text(1, "bob", "old"));
    sync.poll().await?;
    assert_eq!(sync.session().ledger().len(), 1);

    for input in ["/clear", "  /CLEAR  ", "/Clear\n"] {
        assert_eq!(sync.send(input).await?, SendOutcome::Cleared);
    }

    assert!(server.sends.borrow().is_empty());
    assert_eq!(server.clears.get(), 3);
    assert!(sync.renderer().nodes.is_empty());
    assert!(sync.session().ledger().is_empty());
    assert_eq!(sync.renderer().input_clears, 3);
    Ok(())
}

/*
    Dopo un clear lo stesso messaggio, se il server lo ripropone, torna visibile una volta.
*/
#[tokio::test]
async fn cleared_identities_can_render_again() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    server.push(text(1, "bob", "hello"));
    sync.poll().await?;
    sync.send("/clear").await?;
    server.push(text(1, "bob", "hello"));
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(1));
    assert_eq!(sync.renderer().nodes.len(), 1);
    Ok(())
}

#[tokio::test]
async fn refused_clear_keeps_everything() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    server.push(text(1, "bob", "stay"));
    sync.poll().await?;
    *server.clear_status.borrow_mut() = Some("error".to_string());

    assert_eq!(sync.send("/clear").await?, SendOutcome::ClearRefused);
    assert_eq!(sync.renderer().nodes.len(), 1);
    assert_eq!(sync.renderer().view_clears, 0);
    assert_eq!(sync.session().ledger().len(), 1);
    Ok(())
}

/*
    Obiettivo test: send pulisce l'input, manda {text, from, to_lang} ripuliti e fa subito un poll
    che mostra il messaggio appena inviato.
*/
#[tokio::test]
async fn send_clears_input_and_polls_immediately() -> anyhow::Result<()> {
    let (server, sync) = setup(" alice ");
    assert_eq!(sync.send("  ciao a tutti ").await?, SendOutcome::Sent);

    let sends = server.sends.borrow().clone();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].text, "ciao a tutti");
    assert_eq!(sends[0].from, "alice");
    assert_eq!(sends[0].to_lang, "en");

    assert_eq!(sync.renderer().input_clears, 1);
    assert_eq!(server.fetches.get(), 1);
    let renderer = sync.renderer();
    let nodes = &renderer.nodes;
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].personal);
    Ok(())
}

#[tokio::test]
async fn blank_send_does_nothing() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    assert_eq!(sync.send("   ").await?, SendOutcome::Ignored);
    assert!(server.sends.borrow().is_empty());
    assert_eq!(server.fetches.get(), 0);
    assert_eq!(sync.renderer().input_clears, 0);
    Ok(())
}

/*
    Alice con utente locale "alice": il nodo è personale (confronto case-insensitive).
*/
#[tokio::test]
async fn personal_tag_ignores_case() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    server.push(text(1, "Alice", "hi"));
    server.push(text(2, "Bob", "hey"));
    sync.poll().await?;

    let renderer = sync.renderer();
    let nodes = &renderer.nodes;
    assert!(nodes[0].personal);
    assert_eq!(nodes[0].sender, "Alice");
    assert_eq!(nodes[0].body, MessageBody::Text("hi".to_string()));
    assert!(!nodes[1].personal);
    Ok(())
}

/*
    Obiettivo test: upload di un'immagine accettato, il poll successivo mostra il nodo immagine
    con quell'url esattamente una volta.
*/
#[tokio::test]
async fn image_upload_then_poll_renders_image_once() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    let file = MediaUpload::from_bytes("x.png", vec![0x89, 0x50]);

    let outcome = sync.upload(UploadKind::Image, file).await;
    assert_eq!(outcome, UploadOutcome::Uploaded { url: "/media/x.png".to_string() });

    server.push(Message {
        sender: "alice".to_string(),
        content: "/media/x.png".to_string(),
        kind: MessageKind::Image,
        timestamp: Timestamp::Number(7),
    });
    sync.poll().await?;
    sync.poll().await?;

    let images: Vec<_> = sync
        .renderer()
        .nodes
        .iter()
        .filter(|n| n.body == MessageBody::Image { url: "/media/x.png".to_string() })
        .cloned()
        .collect();
    assert_eq!(images.len(), 1);
    assert!(sync.renderer().alerts.is_empty());
    Ok(())
}

/*
    Upload rifiutato ("too large"): l'utente vede un avviso con il messaggio del server
    e non compare nessun nodo nuovo.
*/
#[tokio::test]
async fn rejected_upload_alerts_with_server_message() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    *server.upload_reply.borrow_mut() = Some(UploadResponse {
        status: "error".to_string(),
        url: None,
        message: Some("too large".to_string()),
    });

    let outcome = sync.upload(UploadKind::Image, MediaUpload::from_bytes("big.png", vec![0; 16])).await;
    assert_eq!(outcome, UploadOutcome::Rejected { message: "too large".to_string() });

    let alerts = sync.renderer().alerts.clone();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("too large"));
    assert!(sync.renderer().nodes.is_empty());
    assert_eq!(server.fetches.get(), 0);
    Ok(())
}

#[tokio::test]
async fn upload_transport_failure_is_not_fatal() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    server.upload_fails.set(true);
    let outcome = sync.upload(UploadKind::Audio, MediaUpload::from_bytes("r.webm", vec![1])).await;
    assert_eq!(outcome, UploadOutcome::Failed);
    assert_eq!(sync.renderer().alerts.len(), 1);

    // la sessione continua a funzionare
    server.push(text(1, "bob", "still here"));
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(1));
    Ok(())
}

/*
    Obiettivo test: il primo render scorre sempre in fondo; dopo, solo se la vista era già vicina al fondo.
*/
#[tokio::test]
async fn autoscroll_on_first_render_or_near_bottom() -> anyhow::Result<()> {
    let server = FakeServer::default();
    let renderer = Recorder { near_bottom: false, ..Recorder::default() };
    let sync = SyncLoop::new(server.clone(), renderer, Session::new("alice", "en", EvictionPolicy::Never));

    // poll vuoto: il flag di primo caricamento resta armato
    sync.poll().await?;
    assert!(sync.session().is_first_load());

    server.push(text(1, "bob", "first"));
    sync.poll().await?;
    assert_eq!(sync.renderer().scrolls, 1);
    assert!(!sync.session().is_first_load());

    // l'utente sta leggendo più in alto: niente scroll
    server.push(text(2, "bob", "second"));
    sync.poll().await?;
    assert_eq!(sync.renderer().scrolls, 1);
    assert_eq!(sync.renderer().nodes.len(), 2);
    Ok(())
}

#[tokio::test]
async fn fetch_failure_is_returned_and_releases_guard() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    server.fetch_fails.set(true);
    assert!(matches!(sync.poll().await, Err(ChatError::Transport { .. })));
    assert!(!sync.is_polling());

    server.fetch_fails.set(false);
    server.push(text(1, "bob", "back"));
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(1));
    Ok(())
}

/*
    Obiettivo test: un poll richiesto mentre un altro è in volo non fa una seconda richiesta
    concorrente; il poll attivo ripete il fetch una volta e prende anche i messaggi arrivati nel frattempo.
*/
#[tokio::test]
async fn overlapping_timer_polls_are_coalesced() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    let sync = Rc::new(sync);
    server.push(text(1, "bob", "one"));
    let release = server.hold_next_fetch();

    let local = LocalSet::new();
    local
        .run_until(async {
            let first = tokio::task::spawn_local({
                let sync = sync.clone();
                async move { sync.poll().await }
            });
            while !sync.is_polling() {
                tokio::task::yield_now().await;
            }

            server.push(text(2, "bob", "two"));
            assert_eq!(sync.poll().await?, PollOutcome::Coalesced);
            assert_eq!(server.fetches.get(), 1);

            release.send(()).expect("poll waiting on gate");
            let outcome = first.await??;
            assert_eq!(outcome, PollOutcome::Rendered(2));
            assert_eq!(server.fetches.get(), 2);
            anyhow::Ok(())
        })
        .await?;

    assert_eq!(sync.renderer().nodes.len(), 2);
    assert!(!sync.is_polling());
    Ok(())
}

/*
    Una risposta partita prima di un /clear confermato non deve far ricomparire i messaggi cancellati.
*/
#[tokio::test]
async fn stale_response_after_clear_is_discarded() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    let sync = Rc::new(sync);
    server.push(text(1, "bob", "old"));
    let release = server.hold_next_fetch();

    let local = LocalSet::new();
    local
        .run_until(async {
            let first = tokio::task::spawn_local({
                let sync = sync.clone();
                async move { sync.poll().await }
            });
            while !sync.is_polling() {
                tokio::task::yield_now().await;
            }

            assert_eq!(sync.send("/clear").await?, SendOutcome::Cleared);
            release.send(()).expect("poll waiting on gate");
            assert_eq!(first.await??, PollOutcome::Rendered(0));
            anyhow::Ok(())
        })
        .await?;

    assert!(sync.renderer().nodes.is_empty());
    assert!(sync.session().ledger().is_empty());
    Ok(())
}

#[tokio::test]
async fn long_running_policy_bounds_the_ledger() -> anyhow::Result<()> {
    let server = FakeServer::default();
    let sync = SyncLoop::new(
        server.clone(),
        Recorder { near_bottom: true, ..Recorder::default() },
        Session::new("alice", "en", EvictionPolicy::OlderThanVisible),
    );
    for ts in 1..=3 {
        server.push(text(ts, "bob", "m"));
    }
    sync.poll().await?;
    assert_eq!(sync.session().ledger().len(), 3);

    // il server ora mostra solo gli ultimi due: la prima identità esce dal registro
    *server.messages.borrow_mut() = vec![text(2, "bob", "m"), text(3, "bob", "m")];
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(0));
    assert_eq!(sync.session().ledger().len(), 2);
    Ok(())
}

/*
    Obiettivo test: una voce malformata nella finestra di /messages (tipo sconosciuto,
    timestamp nullo) viene scartata da sola: le altre si vedono e il polling continua.
    Un timestamp con frazioni di secondo è valido e fa da chiave come gli altri.
*/
#[tokio::test]
async fn malformed_entries_do_not_block_polling() -> anyhow::Result<()> {
    let (server, sync) = setup("alice");
    *server.raw_body.borrow_mut() = Some(
        r#"{"messages": [
            {"from": "bob", "content": "uno", "msg_type": "text", "timestamp": 1},
            {"from": "bob", "content": "clip", "msg_type": "video", "timestamp": 2},
            {"from": "carol", "content": "due", "timestamp": 1714560000.25},
            {"from": "dave", "content": "senza ora", "timestamp": null},
            {"from": "erin", "content": "tre", "msg_type": "text", "timestamp": 4}
        ]}"#
        .to_string(),
    );

    assert_eq!(sync.poll().await?, PollOutcome::Rendered(3));
    assert_eq!(sync.poll().await?, PollOutcome::Rendered(0));

    let senders: Vec<String> = sync.renderer().nodes.iter().map(|n| n.sender.clone()).collect();
    assert_eq!(senders, vec!["Bob", "Carol", "Erin"]);
    assert!(rendered_keys(&sync)
        .contains(&IdentityKey { timestamp: Timestamp::Decimal("1714560000.25".to_string()), sender: "carol".to_string() }));
    assert_eq!(server.fetches.get(), 2);
    Ok(())
}
