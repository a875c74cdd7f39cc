pub mod memory;

use crate::{error::BoxError, options::Acl};

/// The description of an object to be created, fully determined by the source
/// file and the options for the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObject {
    /// The destination key, identical to the source path
    pub name: String,
    /// Only set when the body is re-encoded, otherwise the service infers it
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub acl: Acl,
}

/// A bucket, as reported by the service after creation
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub self_link: Option<String>,
}

/// The calls made against an object storage service
pub trait Storage {
    /// Checks if the bucket exists and is accessible to the current identity
    fn bucket_exists(&self, bucket: &str) -> Result<bool, BoxError>;

    fn create_bucket(&self, project: &str, bucket: &str) -> Result<Bucket, BoxError>;

    /// Creates an object in a single blocking request, returning the name of
    /// the created object
    fn insert_object<B>(
        &self,
        bucket: &str,
        object: &StorageObject,
        body: B,
        len: u64,
    ) -> Result<String, BoxError>
    where
        B: std::io::Read + Send + 'static;
}
