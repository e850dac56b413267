use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use poliglotta_core::{new_upload_name, ChatError, MediaUpload, Result, UploadKind};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{BlobEvent, Event, MediaRecorder, MediaStream, MediaStreamConstraints, MediaStreamTrack};
use yew::prelude::*;

use crate::media::{blob_from_parts, js_error, read_blob};

const RECORDING_MIME: &str = "audio/webm";

#[derive(Properties, PartialEq)]
pub struct RecorderProps {
    pub on_upload: Callback<(UploadKind, MediaUpload)>,
}

/*
    Registrazione in corso. Le closure restano vive finché la struct esiste:
    dopo `stop()` la registrazione resta nello slot fino alla successiva,
    così `onstop` può ancora scattare.
*/
struct ActiveRecording {
    recorder: MediaRecorder,
    stream: MediaStream,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
    _on_stop: Closure<dyn FnMut(Event)>,
}

impl ActiveRecording {
    async fn start(on_upload: Callback<(UploadKind, MediaUpload)>) -> Result<Self> {
        let stream = request_microphone().await?;
        let recorder = MediaRecorder::new_with_media_stream(&stream).map_err(js_error)?;
        let chunks: Rc<RefCell<Vec<JsValue>>> = Rc::default();

        let on_data = {
            let chunks = chunks.clone();
            Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
                if let Some(blob) = event.data() {
                    chunks.borrow_mut().push(blob.into());
                }
            })
        };
        let on_stop = {
            let stream = stream.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                stop_tracks(&stream);
                let parts: Array = chunks.borrow_mut().drain(..).collect();
                let on_upload = on_upload.clone();
                spawn_local(async move {
                    match recording_upload(&parts).await {
                        Ok(upload) => on_upload.emit((UploadKind::Audio, upload)),
                        Err(err) => warn!(error = %err, "could not assemble recording"),
                    }
                });
            })
        };
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        recorder.set_onstop(Some(on_stop.as_ref().unchecked_ref()));
        recorder.start().map_err(js_error)?;
        debug!("recording started");

        Ok(Self { recorder, stream, _on_data: on_data, _on_stop: on_stop })
    }

    fn stop(&self) {
        if let Err(err) = self.recorder.stop() {
            warn!(error = ?err, "recorder stop failed");
            stop_tracks(&self.stream);
        }
    }
}

async fn request_microphone() -> Result<MediaStream> {
    let window = web_sys::window().ok_or_else(|| ChatError::Media("no window".to_string()))?;
    let devices = window.navigator().media_devices().map_err(js_error)?;
    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    let promise = devices.get_user_media_with_constraints(&constraints).map_err(js_error)?;
    let stream = JsFuture::from(promise).await.map_err(js_error)?;
    stream.dyn_into::<MediaStream>().map_err(js_error)
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

async fn recording_upload(parts: &Array) -> Result<MediaUpload> {
    let blob = blob_from_parts(parts, RECORDING_MIME)?;
    let bytes = read_blob(&blob).await?;
    Ok(MediaUpload {
        file_name: new_upload_name("recording", "webm"),
        mime: RECORDING_MIME.to_string(),
        bytes,
    })
}

/// Bottone microfono: primo click avvia, secondo click ferma e carica.
#[function_component(Recorder)]
pub fn recorder(props: &RecorderProps) -> Html {
    let recording = use_state(|| false);
    let active = use_mut_ref(|| None::<ActiveRecording>);

    let onclick = {
        let recording = recording.clone();
        let active = active.clone();
        let on_upload = props.on_upload.clone();
        Callback::from(move |_: MouseEvent| {
            if *recording {
                if let Some(current) = active.borrow().as_ref() {
                    current.stop();
                }
                recording.set(false);
                return;
            }
            let recording = recording.clone();
            let active = active.clone();
            let on_upload = on_upload.clone();
            spawn_local(async move {
                match ActiveRecording::start(on_upload).await {
                    Ok(started) => {
                        *active.borrow_mut() = Some(started);
                        recording.set(true);
                    }
                    // permesso negato o nessun microfono: solo log
                    Err(err) => warn!(error = %err, "microphone unavailable"),
                }
            });
        })
    };

    let class = classes!("record-btn", recording.then_some("recording"));
    html! {
        <button {class} title="Registra audio" {onclick}>
            { if *recording { "⏹" } else { "🎤" } }
        </button>
    }
}
