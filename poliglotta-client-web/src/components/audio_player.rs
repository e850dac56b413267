use std::rc::Rc;

use poliglotta_core::AudioPlayback;
use tracing::warn;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAudioElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AudioPlayerProps {
    pub url: AttrValue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PlayerState(AudioPlayback);

enum PlayerAction {
    /// Dagli eventi `play` / `pause` dell'elemento, non dal click.
    Playing(bool),
    Duration(f64),
    Tick(f64),
    Finish,
}

impl Reducible for PlayerState {
    type Action = PlayerAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut playback = self.0;
        match action {
            PlayerAction::Playing(playing) => playback.set_playing(playing),
            PlayerAction::Duration(seconds) => playback.set_duration(seconds),
            PlayerAction::Tick(seconds) => playback.tick(seconds),
            PlayerAction::Finish => playback.finish(),
        }
        Rc::new(PlayerState(playback))
    }
}

/// Player inline: play/pausa, barra di avanzamento ed etichetta `m:ss`.
#[function_component(AudioPlayer)]
pub fn audio_player(props: &AudioPlayerProps) -> Html {
    let audio_ref = use_node_ref();
    let state = use_reducer(PlayerState::default);

    let onclick = {
        let audio_ref = audio_ref.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(audio) = audio_ref.cast::<HtmlAudioElement>() else {
                return;
            };
            // lo stato cambia solo quando l'elemento conferma con `play` / `pause`
            if !audio.paused() {
                if let Err(err) = audio.pause() {
                    warn!(error = ?err, "pause failed");
                }
            } else {
                match audio.play() {
                    Ok(promise) => spawn_local(async move {
                        if let Err(err) = JsFuture::from(promise).await {
                            warn!(error = ?err, "playback refused");
                        }
                    }),
                    Err(err) => warn!(error = ?err, "play failed"),
                }
            }
        })
    };

    let onplay = {
        let state = state.clone();
        Callback::from(move |_: Event| state.dispatch(PlayerAction::Playing(true)))
    };
    let onpause = {
        let state = state.clone();
        Callback::from(move |_: Event| state.dispatch(PlayerAction::Playing(false)))
    };

    let onloadedmetadata = {
        let audio_ref = audio_ref.clone();
        let state = state.clone();
        Callback::from(move |_: Event| {
            if let Some(audio) = audio_ref.cast::<HtmlAudioElement>() {
                state.dispatch(PlayerAction::Duration(audio.duration()));
            }
        })
    };

    let ontimeupdate = {
        let audio_ref = audio_ref.clone();
        let state = state.clone();
        Callback::from(move |_: Event| {
            if let Some(audio) = audio_ref.cast::<HtmlAudioElement>() {
                // le registrazioni webm scoprono la durata solo durante l'ascolto
                state.dispatch(PlayerAction::Duration(audio.duration()));
                state.dispatch(PlayerAction::Tick(audio.current_time()));
            }
        })
    };

    let onended = {
        let state = state.clone();
        Callback::from(move |_: Event| state.dispatch(PlayerAction::Finish))
    };

    let playback = state.0;
    let fill = format!("width: {:.1}%", playback.progress() * 100.0);
    html! {
        <span class="audio-player">
            <audio ref={audio_ref} src={props.url.clone()} preload="metadata"
                {onloadedmetadata} {ontimeupdate} {onplay} {onpause} {onended} />
            <button class="audio-toggle" {onclick}>
                { if playback.is_playing() { "❚❚" } else { "▶" } }
            </button>
            <span class="audio-progress">
                <span class="audio-progress-fill" style={fill} />
            </span>
            <span class="audio-time">{ playback.label() }</span>
        </span>
    }
}
