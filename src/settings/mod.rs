pub mod settings_model;
pub mod settings_traits;

pub use settings_model::{DisplayTimeZoneMode, StaticSettings};
pub use settings_traits::SettingsProvider;
