use poliglotta_core::{MediaUpload, UploadKind};
use tracing::warn;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::media::read_blob;

#[derive(Properties, PartialEq)]
pub struct ImagePickerProps {
    pub on_upload: Callback<(UploadKind, MediaUpload)>,
    pub on_error: Callback<String>,
}

/// Bottone immagine: apre il selettore file e passa il file letto a `on_upload`.
#[function_component(ImagePicker)]
pub fn image_picker(props: &ImagePickerProps) -> Html {
    let input_ref = use_node_ref();

    let onclick = {
        let input_ref = input_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };

    let onchange = {
        let on_upload = props.on_upload.clone();
        let on_error = props.on_error.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            // stesso file selezionabile di nuovo
            input.set_value("");

            let on_upload = on_upload.clone();
            let on_error = on_error.clone();
            spawn_local(async move {
                match read_blob(&file).await {
                    Ok(bytes) => {
                        let mut upload = MediaUpload::from_bytes(file.name(), bytes);
                        let mime = file.type_();
                        if !mime.is_empty() {
                            upload.mime = mime;
                        }
                        on_upload.emit((UploadKind::Image, upload));
                    }
                    Err(err) => {
                        warn!(error = %err, "could not read selected image");
                        on_error.emit(format!("Upload failed: {err}"));
                    }
                }
            });
        })
    };

    html! {
        <>
            <input ref={input_ref} type="file" accept="image/*" style="display: none" {onchange} />
            <button class="image-btn" title="Invia immagine" {onclick}>{ "🖼" }</button>
        </>
    }
}
