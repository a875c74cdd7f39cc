use crate::{error::Error, options::HiddenPolicy};
use camino::{Utf8Path, Utf8PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    /// Symlinks, devices, sockets etc. These are never uploaded.
    Other,
}

/// A filesystem entry found during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalEntry {
    pub path: Utf8PathBuf,
    pub kind: EntryKind,
    pub is_hidden: bool,
}

/// A depth first, pre-order walk of a directory tree, including the root.
///
/// Hidden entries are still yielded, with `is_hidden` set, so the caller can
/// report them, but unless the policy allows hidden entries the walk does not
/// descend into hidden directories. Entries are visited in the order the
/// filesystem returns them. Symlinks are not followed.
pub struct Walker {
    root: Utf8PathBuf,
    policy: HiddenPolicy,
    inner: walkdir::IntoIter,
}

impl Walker {
    pub fn new(root: &Utf8Path, policy: HiddenPolicy) -> Self {
        Self {
            root: root.to_owned(),
            policy,
            inner: walkdir::WalkDir::new(root).into_iter(),
        }
    }
}

impl Iterator for Walker {
    type Item = Result<TraversalEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(source) => {
                let path = source
                    .path()
                    .map_or_else(|| self.root.clone().into_std_path_buf(), |p| p.to_owned());
                return Some(Err(Error::Walk { path, source }));
            }
        };

        let ft = entry.file_type();
        let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => path,
            Err(path) => {
                // Don't bother descending into a directory none of whose
                // children could be named either
                if ft.is_dir() {
                    self.inner.skip_current_dir();
                }
                return Some(Err(Error::NonUtf8Path(path)));
            }
        };

        let is_hidden = self.policy.is_hidden(&self.root, &path);

        let kind = if ft.is_dir() {
            if is_hidden && !self.policy.allow {
                self.inner.skip_current_dir();
            }
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        Some(Ok(TraversalEntry {
            path,
            kind,
            is_hidden,
        }))
    }
}
