pub mod settings;

pub use settings::{ReviewSettings, load_settings};
