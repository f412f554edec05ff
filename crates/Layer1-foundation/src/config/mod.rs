//! Config - runner settings
//!
//! - `settings.rs` - settings types and merge rules
//! - `loader.rs` - layered settings file loader

mod loader;
mod settings;

pub use loader::{load_settings_from_file, strip_json_comments, SettingsLoader, CONFIG_DIR_NAME};
pub use settings::{
    AwsSection, Settings, TunnelSection, DEFAULT_TUNNEL_PROGRAM, DEFAULT_TUNNEL_READY_MARKER,
};
