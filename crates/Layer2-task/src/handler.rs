//! Task handler contract

use crate::args::ExecutionDate;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Handler trait - implement to add a runnable task
///
/// A fresh instance is created for every invocation and dropped afterwards.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Run the task with the parsed positional arguments
    ///
    /// Whatever is returned is wrapped as `{ "input": <value> }`; errors are
    /// reported to the caller unchanged.
    async fn run(
        &self,
        task: Value,
        config: Value,
        execution_date: ExecutionDate,
    ) -> anyhow::Result<Value>;
}

type Constructor = dyn Fn() -> Box<dyn TaskHandler> + Send + Sync;

/// Constructor for a handler, plus the optional display name used in logs
#[derive(Clone)]
pub struct HandlerFactory {
    name: Option<String>,
    constructor: Arc<Constructor>,
}

impl HandlerFactory {
    /// Factory without a display name
    pub fn new<F, H>(constructor: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: TaskHandler + 'static,
    {
        Self {
            name: None,
            constructor: Arc::new(move || Box::new(constructor()) as Box<dyn TaskHandler>),
        }
    }

    /// Factory for a `Default` handler type
    pub fn of<H>() -> Self
    where
        H: TaskHandler + Default + 'static,
    {
        Self::new(H::default)
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for log output
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("unnamed module")
    }

    /// Build a new handler instance
    pub fn instantiate(&self) -> Box<dyn TaskHandler> {
        (self.constructor)()
    }
}

impl fmt::Debug for HandlerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
