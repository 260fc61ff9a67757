use std::path::PathBuf;

/// A non-directory entry met during traversal, pending predicate evaluation.
///
/// The walker stats every candidate before handing it over, so `size` is
/// always populated. Symlinks are not followed: a link's `size` is the size
/// of the link itself, while content reads go through to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full path to the entry, rooted at the search root.
    pub path: PathBuf,

    /// The final path component.
    pub name: String,

    /// What kind of entry this is.
    pub kind: EntryKind,

    /// How deep below the search root this entry sits. Direct children = 1.
    pub depth: usize,

    /// Size in bytes as reported by the entry's own metadata.
    pub size: u64,
}

/// The kind of a candidate. Directories are never candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A symbolic link (to anything, including a directory).
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    pub(crate) fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_file() {
            Self::File
        } else if ft.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}
