pub mod auth;
pub mod cli;
pub mod error;
pub mod gcs;
pub mod options;
pub mod provision;
pub mod report;
pub mod sniff;
pub mod storage;
pub mod upload;
pub mod walk;

pub use error::Error;
pub use options::UploadOptions;
pub use storage::Storage;

use options::Source;
use report::Reporter;
use upload::Uploaded;
use walk::{EntryKind, Walker};

/// What happened during a run
#[derive(Debug, Default)]
pub struct Summary {
    pub bucket: Option<provision::BucketState>,
    pub uploaded: Vec<Uploaded>,
    /// The number of hidden entries that were skipped
    pub hidden_skipped: usize,
    /// Per-file failures, only collected when `keep_going` is set
    pub failures: Vec<Error>,
}

impl Summary {
    pub fn uploaded_bytes(&self) -> u64 {
        self.uploaded.iter().map(|u| u.size).sum()
    }
}

/// Either records a per-file failure and carries on, or aborts the run
fn handle(
    res: Result<(), Error>,
    opts: &UploadOptions,
    reporter: &Reporter,
    summary: &mut Summary,
) -> Result<(), Error> {
    match res {
        Ok(()) => Ok(()),
        Err(err) if opts.keep_going && err.is_per_file() => {
            reporter.failed(&err);
            summary.failures.push(err);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn upload_one<S: Storage>(
    storage: &S,
    opts: &UploadOptions,
    reporter: &Reporter,
    path: &camino::Utf8Path,
    summary: &mut Summary,
) -> Result<(), Error> {
    let uploaded = upload::upload_file(storage, opts, path)?;
    reporter.uploaded(&uploaded.name, uploaded.size);
    summary.uploaded.push(uploaded);
    Ok(())
}

fn upload_dir<S: Storage>(
    storage: &S,
    opts: &UploadOptions,
    reporter: &Reporter,
    root: &camino::Utf8Path,
    summary: &mut Summary,
) -> Result<(), Error> {
    for entry in Walker::new(root, opts.hidden) {
        let res = entry.and_then(|entry| {
            if entry.is_hidden && !opts.hidden.allow {
                reporter.debug(format_args!("hidden files are not uploaded: {}", entry.path));
                summary.hidden_skipped += 1;
                return Ok(());
            }

            match entry.kind {
                EntryKind::Dir => {
                    reporter.debug(format_args!("directory: {}", entry.path));
                    Ok(())
                }
                EntryKind::File => upload_one(storage, opts, reporter, &entry.path, summary),
                EntryKind::Other => {
                    log::debug!("skipping {}, not a regular file", entry.path);
                    Ok(())
                }
            }
        });

        handle(res, opts, reporter, summary)?;
    }

    Ok(())
}

/// Performs a complete run against `storage`: ensures the bucket exists, then
/// uploads the single file or every regular file in the directory tree, one at
/// a time. Stops on the first error unless `keep_going` is set, in which case
/// per-file failures are collected in the returned [`Summary`].
pub fn run<S: Storage>(
    storage: &S,
    opts: &UploadOptions,
    reporter: &Reporter,
) -> Result<Summary, Error> {
    let mut summary = Summary {
        bucket: Some(provision::ensure_bucket(storage, opts, reporter)?),
        ..Default::default()
    };
    log::debug!("bucket {} ensured", opts.bucket);

    match &opts.source {
        Source::File(path) => {
            let res = upload_one(storage, opts, reporter, path, &mut summary);
            handle(res, opts, reporter, &mut summary)?;
        }
        Source::Dir(root) => upload_dir(storage, opts, reporter, root, &mut summary)?,
    }

    log::debug!(
        "uploaded {} objects, {} failures",
        summary.uploaded.len(),
        summary.failures.len()
    );

    Ok(summary)
}
