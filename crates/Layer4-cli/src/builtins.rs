//! Built-in task handlers
//!
//! - `echo`: returns its arguments, useful for checking argument coercion
//! - `storage-probe`: HEADs one S3 object through the allow-listed client

use aries_aws::{sdk_error, AwsClientFactory};
use aries_task::{ExecutionDate, HandlerFactory, HandlerRegistry, TaskHandler};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const ECHO: &str = "echo";
pub const STORAGE_PROBE: &str = "storage-probe";

/// Registry with every built-in handler
pub fn builtin_registry(aws: AwsClientFactory) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(ECHO, HandlerFactory::of::<EchoHandler>().with_name("Echo"));
    registry.register(
        STORAGE_PROBE,
        HandlerFactory::new(move || StorageProbe::new(aws.clone())).with_name("Storage probe"),
    );
    registry
}

// ============================================================================
// echo
// ============================================================================

#[derive(Debug, Default)]
pub struct EchoHandler;

#[async_trait]
impl TaskHandler for EchoHandler {
    async fn run(
        &self,
        task: Value,
        config: Value,
        execution_date: ExecutionDate,
    ) -> anyhow::Result<Value> {
        Ok(json!({
            "task": task,
            "config": config,
            "executionDate": execution_date,
        }))
    }
}

// ============================================================================
// storage-probe
// ============================================================================

/// Reports size and type of `config.bucket`/`config.key`
#[derive(Debug, Clone)]
pub struct StorageProbe {
    aws: AwsClientFactory,
}

impl StorageProbe {
    pub fn new(aws: AwsClientFactory) -> Self {
        Self { aws }
    }
}

fn required<'a>(config: &'a Value, field: &str) -> anyhow::Result<&'a str> {
    config
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("{STORAGE_PROBE} needs a string config.{field}"))
}

#[async_trait]
impl TaskHandler for StorageProbe {
    async fn run(
        &self,
        _task: Value,
        config: Value,
        _execution_date: ExecutionDate,
    ) -> anyhow::Result<Value> {
        let bucket = required(&config, "bucket")?;
        let key = required(&config, "key")?;

        let client = self
            .aws
            .create_storage_client(false)
            .await
            .into_wrapped()
            .ok_or_else(|| anyhow::anyhow!("expected a wrapped storage client"))?;

        let head = client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("s3", e))?;

        Ok(json!({
            "bucket": bucket,
            "key": key,
            "contentLength": head.content_length(),
            "contentType": head.content_type(),
            "eTag": head.e_tag(),
        }))
    }
}
