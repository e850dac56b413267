use poliglotta_core::models::preferences::DEFAULT_LANGUAGE;
use poliglotta_core::Preferences;
use tracing::warn;
use yew::prelude::*;

use crate::chat::Chat;
use crate::components::Welcome;
use crate::storage::LocalStore;

fn load_preferences() -> Preferences {
    Preferences::load(&mut LocalStore).unwrap_or_else(|err| {
        warn!(error = %err, "could not read preferences");
        Preferences { username: None, language: DEFAULT_LANGUAGE.to_string() }
    })
}

/*
    Le preferenze si leggono una volta sola: cambiare nome o lingua
    salva il valore e ricarica la pagina.
*/
fn store_and_reload(update: impl FnOnce(&mut Preferences, &mut LocalStore) -> poliglotta_core::Result<()>) {
    let mut prefs = load_preferences();
    if let Err(err) = update(&mut prefs, &mut LocalStore) {
        warn!(error = %err, "could not store preference");
        return;
    }
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.location().reload() {
            warn!(error = ?err, "reload failed");
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let prefs = use_memo((), |_| load_preferences());

    let on_name = Callback::from(|name: String| {
        store_and_reload(|prefs, store| prefs.set_username(store, &name));
    });
    let on_language = Callback::from(|code: String| {
        store_and_reload(|prefs, store| prefs.set_language(store, &code));
    });

    match &prefs.username {
        None => html! { <Welcome {on_name} /> },
        Some(username) => html! {
            <Chat
                username={AttrValue::from(username.clone())}
                language={AttrValue::from(prefs.language.clone())}
                {on_language}
            />
        },
    }
}
