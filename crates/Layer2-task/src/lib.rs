//! # aries-task
//!
//! Task execution for Aries.
//! Resolves a registered handler, parses the positional arguments, opens a
//! VPN tunnel when the config asks for one, runs the handler and wraps its
//! result in the legacy `{ "input": ... }` envelope.
//!
//! ## Features
//!
//! - JSON-or-string argument coercion with a never-failing date parser
//! - Explicit handler registration in place of dynamic module loading
//! - Tunnel gate with a process-backed VPN connector
//! - Timed, logged execution with untouched error propagation

pub mod args;
pub mod executor;
pub mod handler;
pub mod registry;
pub mod tunnel;

pub use args::{parse_arguments, parse_json_or_string, ExecutionDate, TaskArgs, ARG_COUNT};
pub use executor::{run_task, Envelope, TaskExecutor};
pub use handler::{HandlerFactory, TaskHandler};
pub use registry::{HandlerModule, HandlerRegistry, ModuleLoader};
pub use tunnel::{
    open_if_requested, vpn_connection, CommandTunnel, NoTunnel, TunnelConnector, TunnelHandle,
    VPN_CONNECTION_ENV,
};
