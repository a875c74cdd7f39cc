use crate::{
    error::Error,
    options::{HiddenPolicy, HiddenScope, Source, UploadOptions},
};
use camino::Utf8PathBuf;
use clap::{ArgAction, Args as ClapArgs, Parser};

/// Only the literal `true` enables a flag, anything else leaves it disabled
fn truthy(s: &str) -> Result<bool, String> {
    Ok(s == "true")
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// The file to upload
    #[arg(long)]
    file: Option<Utf8PathBuf>,
    /// The directory to upload, recursively
    #[arg(long)]
    dir: Option<Utf8PathBuf>,
}

/// Uploads a file or directory tree to a Google Cloud Storage bucket, creating
/// the bucket if it doesn't exist
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// The cloud project the bucket is, or will be, created in
    #[arg(long, env = "GCS_PUSH_PROJECT")]
    project: String,
    /// The name of the bucket to upload to
    #[arg(long, env = "GCS_PUSH_BUCKET")]
    bucket: String,
    #[command(flatten)]
    source: SourceArgs,
    /// Make the uploaded objects publicly readable
    #[arg(
        long,
        value_name = "true|false",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = truthy,
    )]
    public: bool,
    /// Gzip the content and set the content encoding to gzip
    #[arg(
        long,
        value_name = "true|false",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = truthy,
    )]
    gzip: bool,
    /// Suppresses debug output
    #[arg(
        long = "quite",
        alias = "quiet",
        value_name = "true|false",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = truthy,
    )]
    quite: bool,
    /// Upload hidden files and directories, those with a path component
    /// starting with a `.`
    #[arg(
        long = "allowHidden",
        alias = "allow-hidden",
        value_name = "true|false",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = truthy,
    )]
    allow_hidden: bool,
    /// Which path components decide if an entry is hidden
    #[arg(long, value_enum, default_value_t)]
    hidden_scope: HiddenScope,
    /// Report failures to upload individual files and continue, instead of
    /// stopping at the first one. The run still fails if any file failed.
    #[arg(long)]
    keep_going: bool,
    /// Walk and read the files as normal, but don't contact the storage service
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Validates the arguments and converts them into the options for a run
    pub fn into_options(self) -> Result<UploadOptions, Error> {
        if self.project.is_empty() {
            return Err(Error::Config("project must not be empty".to_owned()));
        }

        tame_gcs::BucketName::try_from(self.bucket.as_str())
            .map_err(|e| Error::Config(format!("invalid bucket name '{}': {e}", self.bucket)))?;

        let source = match (self.source.file, self.source.dir) {
            (Some(file), _) => Source::File(file),
            (None, Some(dir)) => Source::Dir(dir),
            (None, None) => {
                return Err(Error::Config(
                    "either a file or a directory to upload is required".to_owned(),
                ))
            }
        };

        Ok(UploadOptions {
            project: self.project,
            bucket: self.bucket,
            source,
            public: self.public,
            gzip: self.gzip,
            verbose: !self.quite,
            hidden: HiddenPolicy {
                allow: self.allow_hidden,
                scope: self.hidden_scope,
            },
            keep_going: self.keep_going,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Acl;

    fn parse(args: &[&str]) -> Result<UploadOptions, String> {
        let args = Args::try_parse_from(std::iter::once("gcs-push").chain(args.iter().copied()))
            .map_err(|e| e.to_string())?;
        args.into_options().map_err(|e| e.to_string())
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let opts = parse(&["--project", "p", "--bucket", "my-bucket", "--dir", "site"]).unwrap();

        assert_eq!(opts.source, Source::Dir("site".into()));
        assert!(!opts.public);
        assert!(!opts.gzip);
        assert!(opts.verbose);
        assert!(!opts.keep_going);
        assert_eq!(opts.hidden, HiddenPolicy::default());
        assert_eq!(opts.acl(), Acl::Private);
    }

    #[test]
    fn only_true_enables_flags() {
        let opts = parse(&[
            "--project",
            "p",
            "--bucket",
            "b-1",
            "--file",
            "a.txt",
            "--public",
            "true",
            "--gzip",
            "yes",
            "--quite",
            "TRUE",
            "--allowHidden",
            "true",
        ])
        .unwrap();

        assert_eq!(opts.source, Source::File("a.txt".into()));
        assert_eq!(opts.acl(), Acl::PublicRead);
        assert!(!opts.gzip);
        assert!(opts.verbose);
        assert!(opts.hidden.allow);

        let opts = parse(&[
            "--project", "p", "--bucket", "b-1", "--file", "a.txt", "--public", "",
        ])
        .unwrap();
        assert_eq!(opts.acl(), Acl::Private);
    }

    #[test]
    fn bare_flags_enable() {
        let opts = parse(&[
            "--project",
            "p",
            "--bucket",
            "b-1",
            "--dir",
            "d",
            "--gzip",
            "--quiet",
            "--allow-hidden",
            "--hidden-scope",
            "below-root",
        ])
        .unwrap();

        assert!(opts.gzip);
        assert!(!opts.verbose);
        assert!(opts.hidden.allow);
        assert_eq!(opts.hidden.scope, HiddenScope::BelowRoot);
    }

    #[test]
    fn required_arguments() {
        assert!(parse(&["--bucket", "b-1", "--dir", "d"]).is_err());
        assert!(parse(&["--project", "p", "--dir", "d"]).is_err());
        assert!(parse(&["--project", "p", "--bucket", "b-1"]).is_err());
        assert!(parse(&[
            "--project", "p", "--bucket", "b-1", "--dir", "d", "--file", "f"
        ])
        .is_err());
    }

    #[test]
    fn invalid_bucket_name() {
        let err = parse(&["--project", "p", "--bucket", "Not_Valid!", "--dir", "d"]).unwrap_err();
        assert!(err.starts_with("invalid configuration: invalid bucket name"), "{err}");
    }
}
