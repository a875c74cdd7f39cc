use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// What to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A single file, uploaded once
    File(Utf8PathBuf),
    /// A directory, every regular file beneath it is uploaded
    Dir(Utf8PathBuf),
}

/// Which components of a path are checked when deciding if an entry is hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HiddenScope {
    /// Every component of the walked path, including the walk root itself
    #[default]
    FullPath,
    /// Only the components beneath the walk root
    BelowRoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HiddenPolicy {
    /// Upload hidden entries instead of skipping them
    pub allow: bool,
    pub scope: HiddenScope,
}

impl HiddenPolicy {
    /// Returns true if `path`, found while walking `root`, has a component
    /// starting with a `.`. `.` and `..` themselves don't count.
    pub fn is_hidden(&self, root: &Utf8Path, path: &Utf8Path) -> bool {
        let checked = match self.scope {
            HiddenScope::FullPath => path,
            HiddenScope::BelowRoot => path.strip_prefix(root).unwrap_or(path),
        };

        checked
            .components()
            .any(|c| matches!(c, Utf8Component::Normal(seg) if seg.starts_with('.')))
    }
}

/// The predefined ACL applied to every created object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Acl {
    #[default]
    Private,
    PublicRead,
}

impl Acl {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "publicRead",
        }
    }
}

impl From<bool> for Acl {
    fn from(public: bool) -> Self {
        if public {
            Self::PublicRead
        } else {
            Self::Private
        }
    }
}

/// The immutable configuration for a single run
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub project: String,
    pub bucket: String,
    pub source: Source,
    pub public: bool,
    pub gzip: bool,
    pub verbose: bool,
    pub hidden: HiddenPolicy,
    /// Report per-file failures and continue instead of aborting the run
    pub keep_going: bool,
}

impl UploadOptions {
    #[inline]
    pub fn acl(&self) -> Acl {
        self.public.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(scope: HiddenScope) -> HiddenPolicy {
        HiddenPolicy { allow: false, scope }
    }

    #[test]
    fn hidden_segments() {
        let full = policy(HiddenScope::FullPath);
        let root = Utf8Path::new("site");

        assert!(full.is_hidden(root, Utf8Path::new("site/.git")));
        assert!(full.is_hidden(root, Utf8Path::new("site/.git/config")));
        assert!(full.is_hidden(root, Utf8Path::new("site/img/.DS_Store")));
        assert!(!full.is_hidden(root, Utf8Path::new("site/img/logo.png")));
        assert!(!full.is_hidden(root, Utf8Path::new("site/index.html")));
        // Dots that don't start a segment
        assert!(!full.is_hidden(root, Utf8Path::new("site/a.b/c.txt")));
    }

    #[test]
    fn current_and_parent_dirs_are_not_hidden() {
        let full = policy(HiddenScope::FullPath);

        assert!(!full.is_hidden(Utf8Path::new("./site"), Utf8Path::new("./site/index.html")));
        assert!(!full.is_hidden(Utf8Path::new("../site"), Utf8Path::new("../site/index.html")));
    }

    #[test]
    fn scope_decides_if_the_root_counts() {
        let root = Utf8Path::new(".config/site");
        let path = Utf8Path::new(".config/site/index.html");

        assert!(policy(HiddenScope::FullPath).is_hidden(root, path));
        assert!(!policy(HiddenScope::BelowRoot).is_hidden(root, path));
        assert!(policy(HiddenScope::BelowRoot).is_hidden(root, Utf8Path::new(".config/site/.env")));
    }

    #[test]
    fn acl_selection() {
        assert_eq!(Acl::from(true).as_str(), "publicRead");
        assert_eq!(Acl::from(false).as_str(), "private");
    }
}
