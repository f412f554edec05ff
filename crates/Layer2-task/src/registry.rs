//! Handler Registry - explicit module registration
//!
//! Handlers are registered up front under a key (usually the repository
//! name). The loader resolves the `--repo` location, or the current working
//! directory when none is given, to a registered module:
//!
//! 1. the location as given, without `.` components or a trailing `/`
//! 2. the location joined onto the working directory
//! 3. the last component of that joined location
//!
//! `--repo .` therefore resolves to the same module as no `--repo` at all.
//!
//! A module may carry a default export; when present it takes precedence
//! over the top-level export.

use crate::handler::HandlerFactory;
use aries_foundation::{Error, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

// ============================================================================
// HandlerModule
// ============================================================================

/// A registered module and its exports
#[derive(Debug, Clone)]
pub struct HandlerModule {
    export: HandlerFactory,
    default_export: Option<HandlerFactory>,
}

impl HandlerModule {
    /// Module whose top-level export is the handler
    pub fn new(export: HandlerFactory) -> Self {
        Self {
            export,
            default_export: None,
        }
    }

    /// Add a default export
    pub fn with_default(mut self, default_export: HandlerFactory) -> Self {
        self.default_export = Some(default_export);
        self
    }

    /// Default export if present, otherwise the top-level export
    pub fn select(&self) -> &HandlerFactory {
        self.default_export.as_ref().unwrap_or(&self.export)
    }
}

impl From<HandlerFactory> for HandlerModule {
    fn from(export: HandlerFactory) -> Self {
        Self::new(export)
    }
}

// ============================================================================
// HandlerRegistry
// ============================================================================

/// Registered modules by key
#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    modules: HashMap<String, HandlerModule>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module; returns `false` if the key is taken
    pub fn register(&mut self, key: impl Into<String>, module: impl Into<HandlerModule>) -> bool {
        let key = key.into();

        if self.modules.contains_key(&key) {
            warn!("Module {} is already registered", key);
            return false;
        }

        debug!("Registered module: {}", key);
        self.modules.insert(key, module.into());
        true
    }

    /// Like [`register`](Self::register) but fails on duplicates
    pub fn try_register(
        &mut self,
        key: impl Into<String>,
        module: impl Into<HandlerModule>,
    ) -> Result<()> {
        let key = key.into();
        if self.modules.contains_key(&key) {
            return Err(Error::DuplicateModule(key));
        }
        self.modules.insert(key, module.into());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&HandlerModule> {
        self.modules.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.modules.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.modules.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

// ============================================================================
// ModuleLoader
// ============================================================================

/// Resolves a repository location to a handler factory
pub struct ModuleLoader {
    registry: HandlerRegistry,
    working_dir: Option<PathBuf>,
}

impl ModuleLoader {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            working_dir: None,
        }
    }

    /// Use `dir` instead of the process working directory as the default
    /// location and as the base for relative repos
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Load the module at `repo` (or the working directory) and select its export
    pub fn load(&self, repo: Option<&Path>) -> Result<HandlerFactory> {
        let as_given = repo.map(normalize);
        if let Some(module) = as_given.as_deref().and_then(|path| self.lookup(path)) {
            return Ok(module.select().clone());
        }

        let location = match repo {
            Some(path) if path.is_absolute() => normalize(path),
            Some(path) => normalize(&self.base_dir()?.join(path)),
            None => normalize(&self.base_dir()?),
        };
        debug!("Resolving module at {}", location.display());

        let module = self
            .lookup(&location)
            .or_else(|| {
                let name = location.file_name()?.to_str()?;
                self.registry.get(name)
            })
            .ok_or_else(|| {
                let shown = repo.map_or(location.as_path(), |path| path);
                Error::ModuleNotFound(shown.display().to_string())
            })?;

        Ok(module.select().clone())
    }

    fn base_dir(&self) -> Result<PathBuf> {
        match &self.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    fn lookup(&self, location: &Path) -> Option<&HandlerModule> {
        let key = location.to_str()?;
        if key.is_empty() {
            return None;
        }
        self.registry.get(key)
    }
}

/// Drop `.` components and fold `..` into its parent
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}
