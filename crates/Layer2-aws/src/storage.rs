//! S3 client restricted to the operations task handlers use
//!
//! Managed `upload` stays out of the allow-list; large objects go through the
//! multipart calls instead.

use aws_sdk_s3::operation::complete_multipart_upload::builders::CompleteMultipartUploadFluentBuilder;
use aws_sdk_s3::operation::create_multipart_upload::builders::CreateMultipartUploadFluentBuilder;
use aws_sdk_s3::operation::delete_object::builders::DeleteObjectFluentBuilder;
use aws_sdk_s3::operation::get_object::builders::GetObjectFluentBuilder;
use aws_sdk_s3::operation::head_object::builders::HeadObjectFluentBuilder;
use aws_sdk_s3::operation::list_objects::builders::ListObjectsFluentBuilder;
use aws_sdk_s3::operation::list_objects_v2::builders::ListObjectsV2FluentBuilder;
use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::operation::upload_part_copy::builders::UploadPartCopyFluentBuilder;
use std::fmt;

/// Operations exposed by [`StorageClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOperation {
    CompleteMultipartUpload,
    CreateMultipartUpload,
    DeleteObject,
    GetObject,
    HeadObject,
    PutObject,
    ListObjects,
    ListObjectsV2,
    UploadPartCopy,
}

impl StorageOperation {
    pub const ALL: [StorageOperation; 9] = [
        Self::CompleteMultipartUpload,
        Self::CreateMultipartUpload,
        Self::DeleteObject,
        Self::GetObject,
        Self::HeadObject,
        Self::PutObject,
        Self::ListObjects,
        Self::ListObjectsV2,
        Self::UploadPartCopy,
    ];

    /// S3 API operation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompleteMultipartUpload => "completeMultipartUpload",
            Self::CreateMultipartUpload => "createMultipartUpload",
            Self::DeleteObject => "deleteObject",
            Self::GetObject => "getObject",
            Self::HeadObject => "headObject",
            Self::PutObject => "putObject",
            Self::ListObjects => "listObjects",
            Self::ListObjectsV2 => "listObjectsV2",
            Self::UploadPartCopy => "uploadPartCopy",
        }
    }

    /// `None` for anything outside the allow-list
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// S3 client exposing only [`StorageOperation::ALL`]
///
/// Each method returns the SDK request builder; `.send().await` performs the call.
#[derive(Debug, Clone)]
pub struct StorageClient {
    inner: aws_sdk_s3::Client,
}

impl StorageClient {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { inner: client }
    }

    /// Whether `operation` is callable through this client
    pub fn supports(operation: &str) -> bool {
        StorageOperation::from_name(operation).is_some()
    }

    pub fn region(&self) -> Option<&str> {
        self.inner.config().region().map(|r| r.as_ref())
    }

    pub fn complete_multipart_upload(&self) -> CompleteMultipartUploadFluentBuilder {
        self.inner.complete_multipart_upload()
    }

    pub fn create_multipart_upload(&self) -> CreateMultipartUploadFluentBuilder {
        self.inner.create_multipart_upload()
    }

    pub fn delete_object(&self) -> DeleteObjectFluentBuilder {
        self.inner.delete_object()
    }

    pub fn get_object(&self) -> GetObjectFluentBuilder {
        self.inner.get_object()
    }

    pub fn head_object(&self) -> HeadObjectFluentBuilder {
        self.inner.head_object()
    }

    pub fn put_object(&self) -> PutObjectFluentBuilder {
        self.inner.put_object()
    }

    pub fn list_objects(&self) -> ListObjectsFluentBuilder {
        self.inner.list_objects()
    }

    pub fn list_objects_v2(&self) -> ListObjectsV2FluentBuilder {
        self.inner.list_objects_v2()
    }

    pub fn upload_part_copy(&self) -> UploadPartCopyFluentBuilder {
        self.inner.upload_part_copy()
    }
}
