use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store error: {0}")]
    Upstream(String),

    #[error("invalid storage configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Binary blob storage namespaced by key prefix. Ownership lives entirely in
/// the key layout; callers are responsible for prefix checks.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        original_name: &str,
    ) -> Result<(), StorageError>;

    async fn list(&self, prefix: &str, max_keys: i32) -> Result<Vec<StoredObject>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Public https URL for a stored object.
    fn public_url(&self, key: &str) -> String;
}

/// S3-backed implementation serving objects through the bucket's
/// virtual-hosted public endpoint.
pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
    base_url: Url,
}

impl S3ObjectStorage {
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        region: &str,
    ) -> Result<Self, StorageError> {
        let bucket = bucket.into();
        let base_url = Url::parse(&format!("https://{}.s3.{}.amazonaws.com", bucket, region))
            .map_err(|e| StorageError::Config(e.to_string()))?;
        Ok(Self {
            client,
            bucket,
            base_url,
        })
    }
}

fn upstream<E, R>(err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error,
{
    match err.as_service_error() {
        Some(service_err) => StorageError::Upstream(service_err.to_string()),
        None => StorageError::Upstream(err.to_string()),
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        original_name: &str,
    ) -> Result<(), StorageError> {
        // Metadata values must stay ASCII, hence the encoded original name.
        let encoded_name = utf8_percent_encode(original_name, NON_ALPHANUMERIC).to_string();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .metadata("original-name", encoded_name)
            .metadata("upload-date", Utc::now().to_rfc3339())
            .send()
            .await
            .map_err(upstream)?;

        Ok(())
    }

    async fn list(&self, prefix: &str, max_keys: i32) -> Result<Vec<StoredObject>, StorageError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(upstream)?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?.to_string();
                Some(StoredObject {
                    size: object.size().unwrap_or(0),
                    last_modified: object
                        .last_modified()
                        .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())),
                    key,
                })
            })
            .collect();

        Ok(objects)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(upstream)?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        let mut url = self.base_url.clone();
        // set_path percent-encodes what it must and keeps `/` separators.
        url.set_path(key);
        url.to_string()
    }
}
