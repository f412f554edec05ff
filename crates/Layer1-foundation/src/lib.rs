//! # aries-foundation
//!
//! Foundation layer for Aries:
//! - Error: the workspace-wide error type
//! - Config: layered JSON settings (`~/.aries`, `.aries`, explicit file)
//! - Duration: human-readable durations for log output

pub mod config;
pub mod duration;
pub mod error;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::{AwsSection, Settings, SettingsLoader, TunnelSection};
