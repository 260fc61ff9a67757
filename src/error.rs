use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FindError {
    // Traversal
    #[error("cannot read directory {}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot stat {}", .path.display())]
    FileStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read contents of {}", .path.display())]
    ContentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("symlink loop at {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("walk error: {0}")]
    Walk(String),

    // Config
    #[error("invalid pattern {pattern:?}")]
    PatternTranslation {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // Runtime
    #[error("failed to start the walk thread")]
    Spawn(#[source] std::io::Error),

    #[error("walk thread panicked")]
    WalkerPanicked,
}

impl FindError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::DirectoryRead { path: p, .. }
            | Self::FileStat { path: p, .. }
            | Self::ContentRead { path: p, .. }
            | Self::NotADirectory(p)
            | Self::SymlinkLoop(p) => Some(p),
            _ => None,
        }
    }

    /// Whether the search keeps going after this error.
    ///
    /// Recoverable errors only cost the entry or subtree they happened on;
    /// they are logged and, with `.collect_errors(true)`, surfaced in
    /// [`Results::errors`](crate::Results::errors) once the search completes.
    ///
    /// Fatal errors (bad pattern, thread failures) are returned from
    /// [`SearchBuilder::spawn`](crate::SearchBuilder::spawn) or
    /// [`Search::wait`](crate::Search::wait) instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DirectoryRead { .. }
                | Self::FileStat { .. }
                | Self::ContentRead { .. }
                | Self::NotADirectory(_)
                | Self::SymlinkLoop(_)
                | Self::Walk(_)
        )
    }
}
