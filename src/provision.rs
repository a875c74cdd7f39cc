use crate::{
    error::Error,
    options::UploadOptions,
    report::{error_chain, Reporter},
    storage::{Bucket, Storage},
};

#[derive(Debug, PartialEq, Eq)]
pub enum BucketState {
    /// The bucket already existed and was left untouched
    Existing,
    Created(Bucket),
}

/// Makes sure the bucket exists, creating it in the project if it doesn't.
///
/// A failure to check for the bucket is treated the same as the bucket not
/// existing, in which case creating it will most likely fail with a more
/// useful error.
pub fn ensure_bucket<S: Storage>(
    storage: &S,
    opts: &UploadOptions,
    reporter: &Reporter,
) -> Result<BucketState, Error> {
    match storage.bucket_exists(&opts.bucket) {
        Ok(true) => {
            reporter.debug(format_args!(
                "bucket {} exists, adding data to it",
                opts.bucket
            ));
            return Ok(BucketState::Existing);
        }
        Ok(false) => {}
        Err(source) => {
            let err = Error::BucketCheck {
                bucket: opts.bucket.clone(),
                source,
            };
            log::warn!("{}, assuming it does not exist", error_chain(&err));
        }
    }

    let bucket = storage
        .create_bucket(&opts.project, &opts.bucket)
        .map_err(|source| Error::BucketCreate {
            bucket: opts.bucket.clone(),
            project: opts.project.clone(),
            source,
        })?;

    reporter.debug(format_args!(
        "created bucket {} at location {}",
        bucket.name,
        bucket.location.as_deref().unwrap_or("<default>")
    ));

    Ok(BucketState::Created(bucket))
}
