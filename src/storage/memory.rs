use super::{Bucket, Storage, StorageObject};
use crate::error::BoxError;
use std::{collections::BTreeSet, io::Read, sync::Mutex};

/// An object that was inserted into a [`MemoryStorage`]
#[derive(Debug, Clone)]
pub struct Inserted {
    pub bucket: String,
    pub object: StorageObject,
    /// The length the caller declared for the body
    pub len: u64,
    /// The body, empty if the storage discards bodies
    pub data: Vec<u8>,
}

#[derive(Default)]
struct State {
    buckets: BTreeSet<String>,
    bucket_checks: usize,
    bucket_creates: Vec<(String, String)>,
    inserts: Vec<Inserted>,
}

/// Keeps everything in memory and records every call made against it. Used
/// for dry runs, where no service is contacted.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
    keep_bodies: bool,
}

impl MemoryStorage {
    /// Creates a storage that retains the body of every inserted object
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            keep_bodies: true,
        }
    }

    /// Creates a storage that drains and drops object bodies, only their
    /// length is recorded
    pub fn discarding() -> Self {
        Self::default()
    }

    /// Adds a bucket that is reported as already existing
    pub fn with_bucket(self, name: impl Into<String>) -> Self {
        self.lock().buckets.insert(name.into());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // Nothing panics while holding the lock
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn inserts(&self) -> Vec<Inserted> {
        self.lock().inserts.clone()
    }

    /// The `(project, bucket)` pairs of every create call
    pub fn bucket_creates(&self) -> Vec<(String, String)> {
        self.lock().bucket_creates.clone()
    }

    pub fn bucket_checks(&self) -> usize {
        self.lock().bucket_checks
    }
}

impl Storage for MemoryStorage {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, BoxError> {
        let mut state = self.lock();
        state.bucket_checks += 1;
        Ok(state.buckets.contains(bucket))
    }

    fn create_bucket(&self, project: &str, bucket: &str) -> Result<Bucket, BoxError> {
        let mut state = self.lock();
        state
            .bucket_creates
            .push((project.to_owned(), bucket.to_owned()));

        if !state.buckets.insert(bucket.to_owned()) {
            return Err(format!("bucket '{bucket}' already exists").into());
        }

        Ok(Bucket {
            name: bucket.to_owned(),
            location: None,
            self_link: None,
        })
    }

    fn insert_object<B>(
        &self,
        bucket: &str,
        object: &StorageObject,
        mut body: B,
        len: u64,
    ) -> Result<String, BoxError>
    where
        B: Read + Send + 'static,
    {
        let mut data = Vec::new();
        if self.keep_bodies {
            body.read_to_end(&mut data)?;
        } else {
            std::io::copy(&mut body, &mut std::io::sink())?;
        }

        let mut state = self.lock();
        if !state.buckets.contains(bucket) {
            return Err(format!("bucket '{bucket}' does not exist").into());
        }

        state.inserts.push(Inserted {
            bucket: bucket.to_owned(),
            object: object.clone(),
            len,
            data,
        });

        Ok(object.name.clone())
    }
}
