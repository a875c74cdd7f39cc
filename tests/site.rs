//! Uploads a small website from a relative path, the same way the tool is run
//! from a shell. This changes the working directory, so it must remain the
//! only test in this binary.

use gcs_push::{
    options::{HiddenPolicy, Source},
    report::Reporter,
    storage::memory::MemoryStorage,
    UploadOptions,
};
use std::fs;

#[test]
fn uploads_site_without_hidden_entries() {
    let td = tempfile::Builder::new()
        .prefix("gcs-push")
        .tempdir()
        .unwrap();
    std::env::set_current_dir(td.path()).unwrap();

    fs::create_dir_all("site/.git").unwrap();
    fs::create_dir_all("site/img").unwrap();
    fs::write("site/index.html", "<html><body>hi</body></html>").unwrap();
    fs::write("site/.git/config", "[core]").unwrap();
    fs::write("site/img/logo.png", b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR").unwrap();

    let opts = UploadOptions {
        project: "proj".to_owned(),
        bucket: "www-bucket".to_owned(),
        source: Source::Dir("site".into()),
        public: true,
        gzip: false,
        verbose: false,
        hidden: HiddenPolicy::default(),
        keep_going: false,
    };

    let storage = MemoryStorage::new().with_bucket("www-bucket");
    let summary = gcs_push::run(&storage, &opts, &Reporter::new(false)).unwrap();

    let mut inserts = storage.inserts();
    inserts.sort_by(|a, b| a.object.name.cmp(&b.object.name));

    let names: Vec<_> = inserts.iter().map(|i| i.object.name.as_str()).collect();
    assert_eq!(names, ["site/img/logo.png", "site/index.html"]);

    for ins in &inserts {
        assert_eq!(ins.bucket, "www-bucket");
        assert_eq!(ins.object.acl.as_str(), "publicRead");
        assert_eq!(ins.object.content_encoding, None);
    }

    assert_eq!(inserts[0].object.content_type.as_deref(), Some("image/png"));
    assert_eq!(
        inserts[1].object.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(inserts[1].data, b"<html><body>hi</body></html>");
    assert!(inserts.iter().all(|i| !i.object.name.contains(".git")));

    assert_eq!(summary.uploaded.len(), 2);
    assert_eq!(summary.hidden_skipped, 1);
    assert!(storage.bucket_creates().is_empty());
}
