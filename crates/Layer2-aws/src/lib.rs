//! # aries-aws
//!
//! AWS clients for task handlers.
//!
//! [`AwsClientFactory`] hands out either the raw SDK client or a wrapper that
//! only exposes the operations task handlers are allowed to call:
//! - [`WorkflowClient`]: Simple Workflow Service
//! - [`StorageClient`]: S3

pub mod factory;
pub mod storage;
pub mod workflow;

pub use factory::{
    sdk_error, AwsClientFactory, AwsSettings, ClientHandle, StorageHandle, WorkflowHandle,
};
pub use storage::{StorageClient, StorageOperation};
pub use workflow::{WorkflowClient, WorkflowOperation};
