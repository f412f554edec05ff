//! Single-run CLI mode

use crate::builtins::builtin_registry;
use aries_aws::{AwsClientFactory, AwsSettings};
use aries_foundation::{Settings, SettingsLoader, TunnelSection};
use aries_task::{CommandTunnel, Envelope, ModuleLoader, NoTunnel, TaskExecutor, TunnelConnector};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Aries - run one task handler with `<TASK> <CONFIG> <EXECUTION_DATE>`
#[derive(Parser, Debug)]
#[command(name = "aries")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Handler module location; defaults to the current directory
    #[arg(short, long)]
    pub repo: Option<PathBuf>,

    /// Extra settings file, applied after the `.aries` files
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// AWS region for handler clients
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Task arguments: task, config and execution date
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Layered settings for `working_dir`, plus `override_file` when given
pub fn load_settings(working_dir: &Path, override_file: Option<&Path>) -> Settings {
    let mut loader = SettingsLoader::new(working_dir);
    if let Some(path) = override_file {
        loader = loader.with_override(path.to_path_buf());
    }
    debug!("Settings files: {:?}", loader.existing_files());
    loader.load_all()
}

/// Process-backed tunnel when a program is configured, otherwise none
pub fn build_tunnel(section: &TunnelSection) -> Arc<dyn TunnelConnector> {
    if section.program.is_some() {
        Arc::new(CommandTunnel::from_settings(section))
    } else {
        Arc::new(NoTunnel)
    }
}

/// Executor over the built-in handlers
pub fn build_executor(settings: &Settings, region: Option<String>) -> TaskExecutor {
    let aws = AwsClientFactory::new(AwsSettings::resolve(&settings.aws, region));
    let tunnel = build_tunnel(&settings.tunnel);
    debug!("Tunnel backend: {}", tunnel.name());

    TaskExecutor::new(ModuleLoader::new(builtin_registry(aws))).with_tunnel(tunnel)
}

/// Run the task described by `args` from `working_dir`
pub async fn run_once(args: &Args, working_dir: &Path) -> anyhow::Result<Envelope> {
    let settings = load_settings(working_dir, args.settings.as_deref());
    let executor = build_executor(&settings, args.region.clone());

    let repo = args.repo.as_deref();
    Ok(executor.execute(repo, args.args.as_slice()).await?)
}
