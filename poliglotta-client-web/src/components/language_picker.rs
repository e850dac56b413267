use poliglotta_core::models::preferences::LANGUAGES;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LanguagePickerProps {
    pub selected: AttrValue,
    pub on_change: Callback<String>,
}

#[function_component(LanguagePicker)]
pub fn language_picker(props: &LanguagePickerProps) -> Html {
    let onchange = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_change.emit(select.value());
        })
    };

    html! {
        <select class="language-select" {onchange}>
            { for LANGUAGES.iter().map(|(code, label)| html! {
                <option value={*code} selected={props.selected.as_str() == *code}>{ *label }</option>
            }) }
        </select>
    }
}
