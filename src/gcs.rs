mod util;

use crate::{
    error::{BoxError, Error},
    options::Acl,
    storage::{Bucket, Storage, StorageObject},
};
use reqwest::blocking::Client;
use tame_gcs::{
    self as tgcs,
    common::PredefinedAcl,
    objects::{InsertObjectOptional, Metadata},
};

/// Scopes requested for the bearer token
pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/devstorage.full_control"];

const BUCKETS_URL: &str = "https://storage.googleapis.com/storage/v1/b";

impl From<Acl> for PredefinedAcl {
    fn from(acl: Acl) -> Self {
        match acl {
            Acl::Private => Self::Private,
            Acl::PublicRead => Self::PublicRead,
        }
    }
}

/// A blocking client builder without the default 30 second request timeout,
/// an upload takes however long the file takes to send
pub(crate) fn client_builder() -> reqwest::blocking::ClientBuilder {
    Client::builder().timeout(None)
}

/// [`Storage`] backed by the GCS JSON API
pub struct Gcs {
    client: Client,
    objects: tgcs::objects::Object,
}

impl Gcs {
    /// Creates a client that authenticates every request with the provided
    /// bearer token
    pub fn new(auth_token: http::HeaderValue) -> Result<Self, Error> {
        let hm = {
            let mut hm = reqwest::header::HeaderMap::new();
            hm.insert(http::header::AUTHORIZATION, auth_token);
            hm
        };

        let client = client_builder()
            .default_headers(hm)
            .build()
            .map_err(|e| Error::ServiceInit(e.into()))?;

        Ok(Self {
            client,
            objects: tgcs::objects::Object::default(),
        })
    }

    fn insert_request<B>(
        &self,
        bucket: &str,
        object: &StorageObject,
        body: B,
        len: u64,
    ) -> Result<http::Request<tgcs::objects::Multipart<B>>, BoxError>
    where
        B: std::io::Read,
    {
        let bucket = tgcs::BucketName::try_from(bucket)?;

        let metadata = Metadata {
            name: Some(object.name.clone()),
            content_type: object.content_type.clone(),
            content_encoding: object.content_encoding.clone(),
            ..Default::default()
        };

        let optional = InsertObjectOptional {
            predefined_acl: Some(object.acl.into()),
            ..Default::default()
        };

        Ok(self
            .objects
            .insert_multipart(&bucket, body, len, &metadata, Some(optional))?)
    }
}

impl Storage for Gcs {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, BoxError> {
        let res = self
            .client
            .get(format!("{BUCKETS_URL}/{bucket}"))
            .query(&[("fields", "name")])
            .send()?;

        log::debug!("bucket '{bucket}' -> {}", res.status());

        if res.status() == http::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        util::check_status(res)?;
        Ok(true)
    }

    /// <https://cloud.google.com/storage/docs/json_api/v1/buckets/insert>
    fn create_bucket(&self, project: &str, bucket: &str) -> Result<Bucket, BoxError> {
        let res = self
            .client
            .post(BUCKETS_URL)
            .query(&[("project", project)])
            .json(&serde_json::json!({ "name": bucket }))
            .send()?;

        Ok(util::check_status(res)?.json()?)
    }

    /// <https://cloud.google.com/storage/docs/json_api/v1/objects/insert>
    fn insert_object<B>(
        &self,
        bucket: &str,
        object: &StorageObject,
        body: B,
        len: u64,
    ) -> Result<String, BoxError>
    where
        B: std::io::Read + Send + 'static,
    {
        let req = self.insert_request(bucket, object, body, len)?;
        let res: tgcs::objects::InsertResponse = util::execute(&self.client, req)?;

        Ok(res.metadata.name.unwrap_or_else(|| object.name.clone()))
    }
}
