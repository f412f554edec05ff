//! AWS Client Factory
//!
//! Builds a fresh SWF or S3 client per call from explicit [`AwsSettings`].
//! Nothing is cached between calls.

use crate::storage::StorageClient;
use crate::workflow::WorkflowClient;
use aries_foundation::{AwsSection, Error};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Settings the factory builds clients from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    /// `None` leaves region resolution to the SDK provider chain
    pub region: Option<String>,
}

impl AwsSettings {
    pub fn new(region: Option<String>) -> Self {
        Self { region }
    }

    /// Region from the settings files, replaced by `region_override` when given
    pub fn resolve(section: &AwsSection, region_override: Option<String>) -> Self {
        Self {
            region: region_override
                .filter(|r| !r.is_empty())
                .or_else(|| section.region.clone()),
        }
    }
}

/// Either the SDK client untouched or its allow-listed wrapper
#[derive(Debug, Clone)]
pub enum ClientHandle<R, W> {
    Raw(R),
    Wrapped(W),
}

impl<R, W> ClientHandle<R, W> {
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    pub fn into_raw(self) -> Option<R> {
        match self {
            Self::Raw(client) => Some(client),
            Self::Wrapped(_) => None,
        }
    }

    pub fn into_wrapped(self) -> Option<W> {
        match self {
            Self::Wrapped(client) => Some(client),
            Self::Raw(_) => None,
        }
    }
}

pub type WorkflowHandle = ClientHandle<aws_sdk_swf::Client, WorkflowClient>;
pub type StorageHandle = ClientHandle<aws_sdk_s3::Client, StorageClient>;

/// Creates configured AWS clients for task handlers
#[derive(Debug, Clone, Default)]
pub struct AwsClientFactory {
    settings: AwsSettings,
    sdk_config: Option<SdkConfig>,
}

impl AwsClientFactory {
    pub fn new(settings: AwsSettings) -> Self {
        Self {
            settings,
            sdk_config: None,
        }
    }

    /// Use a prepared SDK config instead of loading one per client
    pub fn with_sdk_config(mut self, config: SdkConfig) -> Self {
        self.sdk_config = Some(config);
        self
    }

    pub fn settings(&self) -> &AwsSettings {
        &self.settings
    }

    async fn sdk_config(&self) -> SdkConfig {
        if let Some(config) = &self.sdk_config {
            return config.clone();
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }

    /// Simple Workflow Service client; `raw` skips the allow-list wrapper
    pub async fn create_workflow_client(&self, raw: bool) -> WorkflowHandle {
        let config = self.sdk_config().await;
        let client = aws_sdk_swf::Client::new(&config);
        debug!(raw, region = ?config.region(), "Created workflow client");

        if raw {
            ClientHandle::Raw(client)
        } else {
            ClientHandle::Wrapped(WorkflowClient::new(client))
        }
    }

    /// S3 client; `raw` skips the allow-list wrapper
    pub async fn create_storage_client(&self, raw: bool) -> StorageHandle {
        let config = self.sdk_config().await;
        let client = aws_sdk_s3::Client::new(&config);
        debug!(raw, region = ?config.region(), "Created storage client");

        if raw {
            ClientHandle::Raw(client)
        } else {
            ClientHandle::Wrapped(StorageClient::new(client))
        }
    }
}

/// Map an SDK failure to [`Error::Aws`], keeping the full error chain in the message
pub fn sdk_error<E>(service: &str, err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::aws(
        service,
        aws_sdk_s3::error::DisplayErrorContext(&err).to_string(),
    )
}
