use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use poliglotta_core::models::preferences::language_label;
use poliglotta_core::{
    ChatError, ChatTransport, EvictionPolicy, MediaUpload, PreferenceStore, Preferences, Renderer,
    Session, SyncLoop, UploadKind, UtcOffset,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::Args;
use crate::prefs::JsonFileStore;
use crate::terminal::TerminalRenderer;
use crate::transport::HttpTransport;

pub type ChatLoop = SyncLoop<HttpTransport, TerminalRenderer<Stdout>>;

/// Riga letta da stdin: comandi locali del client oppure testo da inviare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Testo (anche `/clear`): passa da `SyncLoop::send`.
    Send(String),
    Upload(UploadKind, PathBuf),
    Language(String),
    Rename(String),
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };
        match head {
            "/image" if !rest.is_empty() => Input::Upload(UploadKind::Image, PathBuf::from(rest)),
            "/audio" if !rest.is_empty() => Input::Upload(UploadKind::Audio, PathBuf::from(rest)),
            "/lang" if !rest.is_empty() => Input::Language(rest.to_string()),
            "/name" => Input::Rename(rest.to_string()),
            "/quit" | "/exit" => Input::Quit,
            _ => Input::Send(line.to_string()),
        }
    }
}

/// Motivo per cui una sessione di chat è terminata.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Exit {
    Quit,
    Language(String),
    Rename(String),
}

/// Avvia il client: preferenze, eventuale schermata di benvenuto, poi una sessione di chat
/// che riparte da zero ad ogni cambio di nome o lingua.
pub async fn run(args: Args, utc_offset: UtcOffset) -> anyhow::Result<()> {
    let mut store = JsonFileStore::open(&args.prefs).context("open preferences")?;
    info!(path = ?store.path(), "using preferences file");
    let mut prefs = Preferences::load(&mut store)?;
    if let Some(lang) = &args.lang {
        prefs.set_language(&mut store, lang)?;
    }
    if let Some(name) = &args.name {
        prefs.set_username(&mut store, name)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if prefs.username.is_none() {
        welcome(&mut lines, &mut prefs, &mut store).await?;
    }

    loop {
        let user = prefs.username.clone().context("username missing after welcome")?;
        println!(
            "Connected to {} as {} ({}). Commands: /image PATH, /audio PATH, /lang CODE, /name NAME, /clear, /quit",
            args.base_url(),
            user,
            language_label(&prefs.language)
        );
        match chat_session(&args, &user, &prefs.language, utc_offset, &mut lines).await? {
            Exit::Quit => return Ok(()),
            Exit::Language(code) => prefs.set_language(&mut store, &code)?,
            Exit::Rename(name) => prefs.set_username(&mut store, &name)?,
        }
    }
}

/// Chiede il nome finché non ne arriva uno non vuoto.
async fn welcome<R, S>(lines: &mut Lines<R>, prefs: &mut Preferences, store: &mut S) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    S: PreferenceStore,
{
    loop {
        print!("Welcome! Enter your name: ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("stdin closed before a name was entered");
        };
        match prefs.set_username(store, &line) {
            Ok(()) => return Ok(()),
            Err(ChatError::InvalidName) => continue,
            Err(err) => return Err(err.into()),
        }
    }
}

async fn chat_session<R>(
    args: &Args,
    user: &str,
    language: &str,
    utc_offset: UtcOffset,
    lines: &mut Lines<R>,
) -> anyhow::Result<Exit>
where
    R: AsyncBufRead + Unpin,
{
    let transport = HttpTransport::new(args.base_url()).context("build http client")?;
    let renderer = TerminalRenderer::new(io::stdout(), transport.base_url(), true);
    let session = Session::new(user, language, EvictionPolicy::OlderThanVisible).with_utc_offset(utc_offset);
    let sync = Rc::new(SyncLoop::new(transport, renderer, session));

    let ticker = tokio::task::spawn_local(poll_timer(sync.clone(), args.poll_interval()));
    let exit = read_input(&sync, lines).await;
    ticker.abort();
    exit
}

/// Poll subito e poi ad ogni periodo. Ogni tick è un task a sé: la sovrapposizione
/// viene gestita dal guard del `SyncLoop`.
///
/// I task dei tick appartengono al `JoinSet`: quando il timer viene interrotto
/// (cambio di nome o lingua) anche i poll ancora in corso vengono annullati.
async fn poll_timer<T, R>(sync: Rc<SyncLoop<T, R>>, period: Duration)
where
    T: ChatTransport + 'static,
    R: Renderer + 'static,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = JoinSet::new();
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let sync = sync.clone();
                ticks.spawn_local(async move {
                    if let Err(err) = sync.poll().await {
                        warn!(error = %err, "poll failed");
                    }
                });
            }
            // raccoglie i tick finiti
            Some(_) = ticks.join_next() => {}
        }
    }
}

async fn read_input<R>(sync: &ChatLoop, lines: &mut Lines<R>) -> anyhow::Result<Exit>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Quit => return Ok(Exit::Quit),
            Input::Language(code) => return Ok(Exit::Language(code)),
            Input::Rename(name) if name.trim().is_empty() => sync.alert(&ChatError::InvalidName.to_string()),
            Input::Rename(name) => return Ok(Exit::Rename(name)),
            Input::Upload(kind, path) => upload_file(sync, kind, &path).await,
            Input::Send(text) => {
                if let Err(err) = sync.send(&text).await {
                    warn!(error = %err, "send failed");
                }
            }
        }
    }
    // EOF su stdin
    Ok(Exit::Quit)
}

async fn upload_file(sync: &ChatLoop, kind: UploadKind, path: &Path) {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(?path, error = %err, "cannot read file for upload");
            sync.alert(&format!("Cannot read {}: {}", path.display(), err));
            return;
        }
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("upload.{}", if kind == UploadKind::Image { "png" } else { "webm" }));
    sync.upload(kind, MediaUpload::from_bytes(file_name, bytes)).await;
}
