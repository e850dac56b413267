use std::io::Write;

use colored::Colorize;
use poliglotta_core::{MessageBody, MessageView, Renderer};
use tracing::warn;

/// Renderer a righe: un messaggio per riga su qualsiasi `Write` (stdout, buffer nei test).
///
/// Un terminale segue sempre l'output, quindi la vista è sempre "vicina al fondo".
pub struct TerminalRenderer<W: Write> {
    out: W,
    base_url: String,
    color: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, base_url: impl Into<String>, color: bool) -> Self {
        Self { out, base_url: base_url.into(), color }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Gli url relativi dei media (es. "/media/x.png") vengono completati con l'indirizzo del server.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    pub fn format_line(&self, view: &MessageView) -> String {
        let name = match (self.color, view.personal) {
            (false, _) => view.sender.clone(),
            (true, true) => view.sender.green().bold().to_string(),
            (true, false) => view.sender.bold().to_string(),
        };
        let body = match &view.body {
            MessageBody::Text(text) if self.color => text.italic().to_string(),
            MessageBody::Text(text) => text.clone(),
            MessageBody::Image { url } => format!("[image] {}", self.resolve(url)),
            MessageBody::Audio { url } => format!("[audio] {}", self.resolve(url)),
        };
        match &view.time {
            Some(time) => format!("[{time}] {name}: {body}"),
            None => format!("{name}: {body}"),
        }
    }

    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            warn!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn append(&mut self, view: MessageView) {
        let line = self.format_line(&view);
        self.write_line(&line);
    }

    fn is_near_bottom(&self) -> bool {
        true
    }

    fn scroll_to_bottom(&mut self) {}

    fn clear_view(&mut self) {
        let line = if self.color { "--- chat cleared ---".dimmed().to_string() } else { "--- chat cleared ---".to_string() };
        self.write_line(&line);
    }

    // la riga è già stata consumata da stdin
    fn clear_input(&mut self) {}

    fn alert(&mut self, text: &str) {
        let line = if self.color { format!("! {}", text.red()) } else { format!("! {text}") };
        self.write_line(&line);
    }
}
