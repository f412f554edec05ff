//! Task Executor - runs one handler invocation end to end
//!
//! ```text
//! load module -> instantiate handler -> parse args -> tunnel gate -> run task
//! ```
//!
//! Every failure is logged once at error level and returned unchanged.
//! Results are wrapped as `{ "input": <value> }`, the shape legacy
//! workflow callers expect.

use crate::args::{parse_arguments, TaskArgs};
use crate::handler::TaskHandler;
use crate::registry::ModuleLoader;
use crate::tunnel::{self, NoTunnel, TunnelConnector};
use aries_foundation::{duration, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, error, Instrument};

// ============================================================================
// Envelope
// ============================================================================

/// Successful task result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub input: Value,
}

impl Envelope {
    pub fn new(input: Value) -> Self {
        Self { input }
    }

    pub fn into_inner(self) -> Value {
        self.input
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"input\":{}}}", self.input)
    }
}

/// Run `handler` with the parsed arguments and wrap its output
pub async fn run_task(handler: &dyn TaskHandler, args: TaskArgs) -> Result<Envelope> {
    debug!("Executing task with {} args.", args.len());

    let start = Instant::now();
    let (task, config, execution_date) = args.into_parts();
    let output = handler
        .run(task, config, execution_date)
        .await
        .map_err(Error::Task)?;

    let seconds = start.elapsed().as_secs();
    debug!(
        "Task executed in {} ({} sec).",
        duration::humanize_secs(seconds),
        seconds
    );

    Ok(Envelope::new(output))
}

// ============================================================================
// RunLog
// ============================================================================

/// Outcome logging for one run; the completion line is written on drop
struct RunLog;

impl RunLog {
    fn record<T>(&self, result: &Result<T>) {
        if let Err(e) = result {
            error!("Error executing task: {}", e);
        }
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        debug!("Finished executing task.");
    }
}

// ============================================================================
// TaskExecutor
// ============================================================================

/// Resolves, prepares and runs a single task
pub struct TaskExecutor {
    loader: ModuleLoader,
    tunnel: Arc<dyn TunnelConnector>,
}

impl TaskExecutor {
    /// Executor that refuses tunnel requests
    pub fn new(loader: ModuleLoader) -> Self {
        Self {
            loader,
            tunnel: Arc::new(NoTunnel),
        }
    }

    /// Set the tunnel backend
    pub fn with_tunnel(mut self, tunnel: Arc<dyn TunnelConnector>) -> Self {
        self.tunnel = tunnel;
        self
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Execute the module at `repo` with raw positional `args`
    pub async fn execute<S: AsRef<str>>(&self, repo: Option<&Path>, args: &[S]) -> Result<Envelope> {
        let span = debug_span!("execute", repo = ?repo);

        async {
            let log = RunLog;
            let result = self.execute_inner(repo, args).await;
            log.record(&result);
            result
        }
        .instrument(span)
        .await
    }

    async fn execute_inner<S: AsRef<str>>(
        &self,
        repo: Option<&Path>,
        args: &[S],
    ) -> Result<Envelope> {
        let factory = self.loader.load(repo)?;
        let handler = factory.instantiate();
        debug!("Loaded {}.", factory.display_name());

        let args = parse_arguments(args)?;

        // Held until the task returns; dropping it closes the tunnel.
        let _tunnel = tunnel::open_if_requested(self.tunnel.as_ref(), &args.config).await?;

        let result = run_task(handler.as_ref(), args).await?;
        debug!("Task result: {}", result);

        Ok(result)
    }
}
