//! # aries-cli
//!
//! Command-line adapter for the task runner: argument parsing, settings and
//! region resolution, built-in handlers and the single-run pipeline.

pub mod builtins;
pub mod cli;

pub use builtins::{builtin_registry, EchoHandler, StorageProbe};
pub use cli::{build_executor, build_tunnel, load_settings, run_once, Args};
