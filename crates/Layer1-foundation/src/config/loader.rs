//! Settings Loader
//!
//! ## Search order
//!
//! 1. User-level: `~/.aries/settings.json`
//! 2. Project-level: `.aries/settings.json`
//! 3. Local (gitignored): `.aries/settings.local.json`
//! 4. Explicit file passed on the command line
//!
//! Each level overrides the ones before it.

use super::settings::Settings;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Settings directory name
pub const CONFIG_DIR_NAME: &str = ".aries";

// ============================================================================
// SettingsLoader
// ============================================================================

/// Settings loader
pub struct SettingsLoader {
    search_paths: Vec<SettingsPath>,
}

#[derive(Debug, Clone)]
struct SettingsPath {
    path: PathBuf,
    /// Higher wins
    priority: u8,
    description: &'static str,
}

impl SettingsLoader {
    /// Loader with the default search paths
    pub fn new(working_dir: &Path) -> Self {
        let mut paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            paths.push(SettingsPath {
                path: home.join(CONFIG_DIR_NAME).join("settings.json"),
                priority: 10,
                description: "User settings",
            });
        }

        paths.push(SettingsPath {
            path: working_dir.join(CONFIG_DIR_NAME).join("settings.json"),
            priority: 20,
            description: "Project settings",
        });

        paths.push(SettingsPath {
            path: working_dir.join(CONFIG_DIR_NAME).join("settings.local.json"),
            priority: 30,
            description: "Local settings",
        });

        paths.sort_by_key(|p| p.priority);

        Self {
            search_paths: paths,
        }
    }

    /// Loader with custom paths, in increasing priority
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        let search_paths = paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| SettingsPath {
                path,
                priority: i as u8,
                description: "Custom",
            })
            .collect();

        Self { search_paths }
    }

    /// Add an explicit settings file that overrides every other level
    pub fn with_override(mut self, path: PathBuf) -> Self {
        self.search_paths.push(SettingsPath {
            path,
            priority: u8::MAX,
            description: "Explicit settings",
        });
        self
    }

    /// Load and merge every settings file that exists
    ///
    /// Files that fail to parse are logged and skipped.
    pub fn load_all(&self) -> Settings {
        let mut merged = Settings::new();

        for settings_path in &self.search_paths {
            if !settings_path.path.exists() {
                continue;
            }

            match load_settings_from_file(&settings_path.path) {
                Ok(settings) => {
                    debug!(
                        "Loaded {} from: {}",
                        settings_path.description,
                        settings_path.path.display()
                    );
                    merged = merged.merge(settings);
                }
                Err(e) => {
                    warn!(
                        "Failed to load settings from {}: {}",
                        settings_path.path.display(),
                        e
                    );
                }
            }
        }

        merged
    }

    /// Settings files that currently exist, lowest priority first
    pub fn existing_files(&self) -> Vec<PathBuf> {
        self.search_paths
            .iter()
            .filter(|p| p.path.exists())
            .map(|p| p.path.clone())
            .collect()
    }
}

/// Load one settings file
pub fn load_settings_from_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let content = strip_json_comments(&content);

    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Invalid settings at {}: {}", path.display(), e))
    })
}

/// Strip `//` and `/* */` comments outside of string literals
pub fn strip_json_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            output.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            output.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            output.push(c);
            continue;
        }

        if !in_string && c == '/' {
            match chars.peek() {
                Some('/') => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            output.push(c);
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                    continue;
                }
                _ => {}
            }
        }

        output.push(c);
    }

    output
}
