use std::rc::Rc;

use poliglotta_core::{MessageView, Renderer, ScrollMetrics};
use tracing::warn;
use web_sys::{Element, HtmlTextAreaElement};
use yew::prelude::*;

/// Stato della lista messaggi tenuto da yew.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatView {
    pub nodes: Vec<MessageView>,
    /// Cambia ad ogni richiesta di scroll: l'effetto scorre dopo il render.
    pub scroll_ticket: u32,
}

pub enum ViewAction {
    Append(MessageView),
    Clear,
    ScrollToBottom,
}

impl Reducible for ChatView {
    type Action = ViewAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ViewAction::Append(view) => next.nodes.push(view),
            ViewAction::Clear => next.nodes.clear(),
            ViewAction::ScrollToBottom => next.scroll_ticket = next.scroll_ticket.wrapping_add(1),
        }
        next.into()
    }
}

/// Adattatore DOM: le modifiche alla lista passano dal reducer,
/// le letture (posizione di scroll) e la casella di testo vanno direttamente sul DOM.
pub struct DomRenderer {
    dispatcher: UseReducerDispatcher<ChatView>,
    list: NodeRef,
    input: NodeRef,
}

impl DomRenderer {
    pub fn new(dispatcher: UseReducerDispatcher<ChatView>, list: NodeRef, input: NodeRef) -> Self {
        Self { dispatcher, list, input }
    }
}

impl Renderer for DomRenderer {
    fn append(&mut self, view: MessageView) {
        self.dispatcher.dispatch(ViewAction::Append(view));
    }

    fn is_near_bottom(&self) -> bool {
        match self.list.cast::<Element>() {
            Some(list) => ScrollMetrics {
                scroll_height: f64::from(list.scroll_height()),
                scroll_top: f64::from(list.scroll_top()),
                client_height: f64::from(list.client_height()),
            }
            .is_near_bottom(),
            // non ancora montata
            None => true,
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.dispatcher.dispatch(ViewAction::ScrollToBottom);
    }

    fn clear_view(&mut self) {
        self.dispatcher.dispatch(ViewAction::Clear);
    }

    fn clear_input(&mut self) {
        if let Some(input) = self.input.cast::<HtmlTextAreaElement>() {
            input.set_value("");
        }
    }

    fn alert(&mut self, text: &str) {
        let shown = web_sys::window().map(|w| w.alert_with_message(text));
        if !matches!(shown, Some(Ok(()))) {
            warn!(%text, "could not show alert");
        }
    }
}
