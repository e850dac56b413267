use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct WelcomeProps {
    pub on_name: Callback<String>,
}

/// Schermata iniziale: chiede il nome finché non ne viene dato uno non vuoto.
#[function_component(Welcome)]
pub fn welcome(props: &WelcomeProps) -> Html {
    let input_ref = use_node_ref();

    let submit = {
        let input_ref = input_ref.clone();
        let on_name = props.on_name.clone();
        Callback::from(move |_: ()| {
            let Some(input) = input_ref.cast::<HtmlInputElement>() else {
                return;
            };
            let name = input.value();
            if !name.trim().is_empty() {
                on_name.emit(name.trim().to_string());
            }
        })
    };

    let onclick = submit.reform(|_: MouseEvent| ());
    let onkeydown = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                submit.emit(());
            }
        })
    };

    html! {
        <div class="welcome">
            <h2>{ "Benvenuto!" }</h2>
            <p>{ "Come ti chiami?" }</p>
            <input ref={input_ref} type="text" placeholder="Il tuo nome" {onkeydown} />
            <button {onclick}>{ "Entra" }</button>
        </div>
    }
}
