use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Opzioni da riga di comando; ognuna ha anche una variabile d'ambiente.
#[derive(Debug, Clone, Parser)]
#[command(name = "poliglotta", version, about = "Chat poliglotta da terminale")]
pub struct Args {
    /// Indirizzo del server di chat
    #[arg(long, env = "POLIGLOTTA_SERVER", default_value = "http://127.0.0.1:5001")]
    pub server: String,

    /// File JSON con nome utente e lingua
    #[arg(long, env = "POLIGLOTTA_PREFS", default_value = "poliglotta.json")]
    pub prefs: PathBuf,

    /// Periodo di polling in millisecondi
    #[arg(long, env = "POLIGLOTTA_INTERVAL_MS", default_value_t = 2000)]
    pub interval_ms: u64,

    /// Imposta (e salva) il nome utente
    #[arg(long)]
    pub name: Option<String>,

    /// Imposta (e salva) la lingua di lettura
    #[arg(long)]
    pub lang: Option<String>,
}

impl Args {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    /// URL del server senza slash finale.
    pub fn base_url(&self) -> &str {
        self.server.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_web_widget() {
        let args = Args::parse_from(["poliglotta"]);
        assert_eq!(args.poll_interval(), Duration::from_secs(2));
        assert_eq!(args.base_url(), "http://127.0.0.1:5001");
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let args = Args::parse_from(["poliglotta", "--server", "http://chat.local:8080/", "--lang", "it"]);
        assert_eq!(args.base_url(), "http://chat.local:8080");
        assert_eq!(args.lang.as_deref(), Some("it"));
    }
}
