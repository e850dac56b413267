pub mod ids;
pub mod time;

pub use ids::new_upload_name;
pub use self::time::format_clock;
