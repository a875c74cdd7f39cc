use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A non-success response from the storage service
#[derive(Debug, thiserror::Error)]
#[error("HTTP status {status}: {body}")]
pub struct ApiError {
    pub status: http::StatusCode,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("unable to acquire credentials")]
    Auth(#[source] BoxError),
    #[error("failed to construct storage client")]
    ServiceInit(#[source] BoxError),
    #[error("failed to check for bucket '{bucket}'")]
    BucketCheck {
        bucket: String,
        #[source]
        source: BoxError,
    },
    #[error("failed to create bucket '{bucket}' in project '{project}'")]
    BucketCreate {
        bucket: String,
        project: String,
        #[source]
        source: BoxError,
    },
    #[error("failed to open {path}")]
    FileOpen {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to stat {path}")]
    FileStat {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk {}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("path '{}' is not valid utf-8", .0.display())]
    NonUtf8Path(PathBuf),
    #[error("failed to sniff content type of {path}")]
    Sniff {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to gzip {path}")]
    Compression {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to upload {path} as '{object}'")]
    Upload {
        path: Utf8PathBuf,
        object: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// The local file the error relates to, if any
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::FileOpen { path, .. }
            | Self::FileStat { path, .. }
            | Self::Sniff { path, .. }
            | Self::Compression { path, .. }
            | Self::Upload { path, .. } => Some(path),
            Self::Walk { path, .. } | Self::NonUtf8Path(path) => Utf8Path::from_path(path),
            _ => None,
        }
    }

    /// Errors scoped to a single filesystem entry, as opposed to the run as a
    /// whole. Only these can be skipped with `--keep-going`.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::FileOpen { .. }
                | Self::FileStat { .. }
                | Self::Walk { .. }
                | Self::NonUtf8Path(_)
                | Self::Sniff { .. }
                | Self::Compression { .. }
                | Self::Upload { .. }
        )
    }
}
