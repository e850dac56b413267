mod app;
mod chat;
mod components;
mod media;
mod renderer;
mod storage;
mod transport;

fn main() {
    tracing_wasm::set_as_global_default();
    yew::Renderer::<app::App>::new().render();
}
