pub mod audio_player;
pub mod image_picker;
pub mod language_picker;
pub mod recorder;
pub mod welcome;

pub use audio_player::AudioPlayer;
pub use image_picker::ImagePicker;
pub use language_picker::LanguagePicker;
pub use recorder::Recorder;
pub use welcome::Welcome;
