use crate::{
    error::Error,
    options::UploadOptions,
    sniff,
    storage::{Storage, StorageObject},
};
use camino::{Utf8Component, Utf8Path};
use std::{fs::File, io};

/// The result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    /// The object name reported by the service
    pub name: String,
    /// The number of bytes sent, after compression if enabled
    pub size: u64,
}

/// Converts a local path into an object name. The name is the path itself,
/// `/` separated, with `.` components dropped.
pub fn object_name(path: &Utf8Path) -> String {
    let mut name = String::new();

    for comp in path.components() {
        let seg = match comp {
            Utf8Component::CurDir | Utf8Component::Prefix(_) => continue,
            Utf8Component::RootDir => {
                name.push('/');
                continue;
            }
            Utf8Component::ParentDir => "..",
            Utf8Component::Normal(seg) => seg,
        };

        if !name.is_empty() && !name.ends_with('/') {
            name.push('/');
        }
        name.push_str(seg);
    }

    name
}

/// Compresses the rest of `file` into an in-memory gzip stream
fn gzip(file: &mut File) -> io::Result<Vec<u8>> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    io::copy(file, &mut encoder)?;
    encoder.finish()
}

/// Uploads a single file as an object with the same name.
///
/// The content type is always sniffed from the uncompressed file. With gzip
/// enabled the whole file is compressed in memory first and the content
/// encoding set to `gzip`, otherwise the file is streamed as is.
pub fn upload_file<S: Storage>(
    storage: &S,
    opts: &UploadOptions,
    path: &Utf8Path,
) -> Result<Uploaded, Error> {
    let mut file = File::open(path).map_err(|source| Error::FileOpen {
        path: path.to_owned(),
        source,
    })?;

    let name = object_name(path);

    // Rewinds the file, so the same handle is used for the body
    let content_type = sniff::sniff(&mut file).map_err(|source| Error::Sniff {
        path: path.to_owned(),
        source,
    })?;

    if opts.gzip {
        let compressed = gzip(&mut file).map_err(|source| Error::Compression {
            path: path.to_owned(),
            source,
        })?;
        let size = compressed.len() as u64;

        let object = StorageObject {
            name,
            content_type: Some(content_type.to_owned()),
            content_encoding: Some("gzip".to_owned()),
            acl: opts.acl(),
        };

        log::debug!("{path}: {content_type}, gzipped to {size} bytes");

        storage
            .insert_object(&opts.bucket, &object, io::Cursor::new(compressed), size)
            .map(|name| Uploaded { name, size })
            .map_err(|source| Error::Upload {
                path: path.to_owned(),
                object: object.name,
                source,
            })
    } else {
        let size = file
            .metadata()
            .map_err(|source| Error::FileStat {
                path: path.to_owned(),
                source,
            })?
            .len();

        let object = StorageObject {
            name,
            content_type: Some(content_type.to_owned()),
            content_encoding: None,
            acl: opts.acl(),
        };

        // The handle is moved into the request and closed once it is sent
        storage
            .insert_object(&opts.bucket, &object, file, size)
            .map(|name| Uploaded { name, size })
            .map_err(|source| Error::Upload {
                path: path.to_owned(),
                object: object.name,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        options::{Acl, HiddenPolicy, Source},
        storage::memory::MemoryStorage,
    };
    use std::io::Read;

    fn options(gzip: bool, public: bool) -> UploadOptions {
        UploadOptions {
            project: "proj".to_owned(),
            bucket: "bucket".to_owned(),
            source: Source::File("unused".into()),
            public,
            gzip,
            verbose: false,
            hidden: HiddenPolicy::default(),
            keep_going: false,
        }
    }

    fn temp_file(name: &str, contents: &[u8]) -> (tempfile::TempDir, camino::Utf8PathBuf) {
        let td = tempfile::Builder::new()
            .prefix("gcs-push")
            .tempdir()
            .unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(td.path().join(name)).unwrap();
        std::fs::write(&path, contents).unwrap();
        (td, path)
    }

    #[test]
    fn names() {
        assert_eq!(object_name(Utf8Path::new("site/index.html")), "site/index.html");
        assert_eq!(object_name(Utf8Path::new("./site/img/logo.png")), "site/img/logo.png");
        assert_eq!(object_name(Utf8Path::new("site//a.txt")), "site/a.txt");
        assert_eq!(object_name(Utf8Path::new("/abs/a.txt")), "/abs/a.txt");
        assert_eq!(object_name(Utf8Path::new("../up/a.txt")), "../up/a.txt");
    }

    #[test]
    fn plain_upload_streams_the_file() {
        let (_td, path) = temp_file("plain.txt", b"hello there");
        let storage = MemoryStorage::new().with_bucket("bucket");

        let up = upload_file(&storage, &options(false, false), &path).unwrap();
        assert_eq!(up.name, object_name(&path));
        assert_eq!(up.size, 11);

        let inserts = storage.inserts();
        assert_eq!(inserts.len(), 1);
        let ins = &inserts[0];
        assert_eq!(ins.data, b"hello there");
        assert_eq!(
            ins.object.content_type.as_deref(),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(ins.object.content_encoding, None);
        assert_eq!(ins.object.acl, Acl::Private);
    }

    #[test]
    fn gzip_round_trips() {
        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.extend((0..4096u32).map(|i| (i % 251) as u8));

        let (_td, path) = temp_file("logo.png", &png);
        let storage = MemoryStorage::new().with_bucket("bucket");

        let up = upload_file(&storage, &options(true, true), &path).unwrap();

        let inserts = storage.inserts();
        let ins = &inserts[0];
        assert_eq!(ins.object.content_type.as_deref(), Some("image/png"));
        assert_eq!(ins.object.content_encoding.as_deref(), Some("gzip"));
        assert_eq!(ins.object.acl, Acl::PublicRead);
        assert_eq!(ins.len, up.size);
        assert_eq!(ins.data.len() as u64, up.size);

        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(ins.data.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, png);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let storage = MemoryStorage::new().with_bucket("bucket");

        let err = upload_file(
            &storage,
            &options(false, false),
            Utf8Path::new("does/not/exist.txt"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::FileOpen { .. }), "{err}");
        assert_eq!(err.path(), Some(Utf8Path::new("does/not/exist.txt")));
        assert!(storage.inserts().is_empty());
    }

    #[test]
    fn service_failures_name_the_object() {
        let (_td, path) = temp_file("a.txt", b"a");
        // No bucket, so the insert fails
        let storage = MemoryStorage::new();

        let err = upload_file(&storage, &options(false, false), &path).unwrap_err();
        match err {
            Error::Upload { object, .. } => assert_eq!(object, object_name(&path)),
            other => panic!("unexpected error {other}"),
        }
    }
}
