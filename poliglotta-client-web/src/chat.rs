use std::rc::Rc;

use gloo_timers::callback::Interval;
use poliglotta_core::{
    EvictionPolicy, MediaUpload, MessageBody, MessageView, Session, SyncLoop, UploadKind,
    UtcOffset,
};
use tracing::warn;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::{AudioPlayer, ImagePicker, LanguagePicker, Recorder};
use crate::renderer::{ChatView, DomRenderer};
use crate::transport::FetchTransport;

/// Periodo del polling in millisecondi.
pub const POLL_INTERVAL_MS: u32 = 2_000;

type WebLoop = SyncLoop<FetchTransport, DomRenderer>;

#[derive(Properties, PartialEq)]
pub struct ChatProps {
    pub username: AttrValue,
    pub language: AttrValue,
    pub on_language: Callback<String>,
}

/// Fuso del browser. `getTimezoneOffset` dà i minuti da aggiungere all'ora locale
/// per ottenere UTC (Roma d'estate: -120).
fn browser_offset() -> UtcOffset {
    let minutes = js_sys::Date::new_0().get_timezone_offset();
    UtcOffset::from_whole_seconds((-minutes * 60.0) as i32).unwrap_or(UtcOffset::UTC)
}

async fn poll_logged(sync: Rc<WebLoop>) {
    if let Err(err) = sync.poll().await {
        warn!(error = %err, "poll failed");
    }
}

#[function_component(Chat)]
pub fn chat(props: &ChatProps) -> Html {
    let view = use_reducer(ChatView::default);
    let list_ref = use_node_ref();
    let input_ref = use_node_ref();

    // un solo loop per tutta la vita del componente
    let sync = {
        let renderer = DomRenderer::new(view.dispatcher(), list_ref.clone(), input_ref.clone());
        let session = Session::new(props.username.as_str(), props.language.as_str(), EvictionPolicy::Never)
            .with_utc_offset(browser_offset());
        use_memo((), move |_| SyncLoop::new(FetchTransport::same_origin(), renderer, session))
    };

    {
        let sync = sync.clone();
        use_effect_with((), move |_| {
            spawn_local(poll_logged(sync.clone()));
            let interval = Interval::new(POLL_INTERVAL_MS, move || {
                spawn_local(poll_logged(sync.clone()));
            });
            move || drop(interval)
        });
    }

    {
        let list_ref = list_ref.clone();
        use_effect_with(view.scroll_ticket, move |_| {
            if let Some(list) = list_ref.cast::<Element>() {
                list.set_scroll_top(list.scroll_height());
            }
        });
    }

    let send = {
        let sync = sync.clone();
        let input_ref = input_ref.clone();
        Callback::from(move |_: ()| {
            let Some(input) = input_ref.cast::<HtmlTextAreaElement>() else {
                return;
            };
            let text = input.value();
            let sync = sync.clone();
            spawn_local(async move {
                if let Err(err) = sync.send(&text).await {
                    warn!(error = %err, "send failed");
                }
            });
        })
    };

    let onkeydown = {
        let send = send.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" && !e.shift_key() {
                e.prevent_default();
                send.emit(());
            }
        })
    };
    let onclick = send.reform(|_: MouseEvent| ());

    let on_upload = {
        let sync = sync.clone();
        Callback::from(move |(kind, file): (UploadKind, MediaUpload)| {
            let sync = sync.clone();
            spawn_local(async move {
                sync.upload(kind, file).await;
            });
        })
    };

    let on_error = {
        let sync = sync.clone();
        Callback::from(move |text: String| sync.alert(&text))
    };

    html! {
        <div class="chat">
            <div class="chat-header">
                <span class="chat-user">{ props.username.clone() }</span>
                <LanguagePicker selected={props.language.clone()} on_change={props.on_language.clone()} />
            </div>
            <div class="messages">
                <div class="messages-content" ref={list_ref}>
                    { for view.nodes.iter().map(message_node) }
                </div>
            </div>
            <div class="message-box">
                <textarea ref={input_ref} placeholder="Scrivi un messaggio..." {onkeydown} />
                <ImagePicker on_upload={on_upload.clone()} {on_error} />
                <Recorder {on_upload} />
                <button class="message-submit" {onclick}>{ "Invia" }</button>
            </div>
        </div>
    }
}

fn message_node(view: &MessageView) -> Html {
    let key = format!("{}|{}", view.key.timestamp, view.key.sender);
    let class = classes!("message", view.personal.then_some("message-personal"), "new");
    let body = match &view.body {
        MessageBody::Text(text) => html! { <i>{ text.clone() }</i> },
        MessageBody::Image { url } => html! { <img class="message-image" src={url.clone()} alt="" /> },
        MessageBody::Audio { url } => html! { <AudioPlayer url={AttrValue::from(url.clone())} /> },
    };
    html! {
        <div {key} {class}>
            <b>{ view.sender.clone() }</b>{ ": " }{ body }
            if let Some(time) = &view.time {
                <span class="message-time">{ time.clone() }</span>
            }
        </div>
    }
}
