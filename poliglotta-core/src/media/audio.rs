use crate::utils::format_clock;

/// Stato del player audio inline, indipendente dal DOM.
///
/// Il player reale (elemento `<audio>`) notifica durata, avanzamento e fine;
/// questo modello decide cosa mostrare: pulsante, barra e etichetta `m:ss`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioPlayback {
    playing: bool,
    elapsed: f64,
    duration: Option<f64>,
}

impl AudioPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Play/pausa. Restituisce il nuovo stato.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Stato confermato dal player reale: un `play()` rifiutato (es. autoplay
    /// bloccato) non arriva mai qui e il pulsante resta su play.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Le registrazioni webm riportano spesso durata infinita: in quel caso resta sconosciuta.
    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = (seconds.is_finite() && seconds > 0.0).then_some(seconds);
    }

    pub fn tick(&mut self, elapsed: f64) {
        self.elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
    }

    /// Fine traccia: si torna fermi all'inizio.
    pub fn finish(&mut self) {
        self.playing = false;
        self.elapsed = 0.0;
    }

    /// Frazione riprodotta in `[0, 1]`, 0 se la durata non è nota.
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(duration) => (self.elapsed / duration).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    /// Durata a riposo, tempo trascorso durante l'ascolto (o in pausa a metà).
    pub fn label(&self) -> String {
        if self.playing || self.elapsed > 0.0 {
            format_clock(self.elapsed)
        } else {
            format_clock(self.duration.unwrap_or(0.0))
        }
    }
}
