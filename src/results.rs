use std::path::PathBuf;
use std::time::Duration;

use crate::error::FindError;

/// The outcome of a completed search.
///
/// `paths` and `errors` are both opt-in, enabled on the builder with
/// `.collect_paths(true)` and `.collect_errors(true)`.
#[derive(Debug)]
pub struct Results {
    /// Total number of files that matched, including any the caller already
    /// received from the stream before calling `wait()`.
    pub matches: usize,

    /// Matched paths, in arrival order (which is not traversal order).
    /// Only populated if `.collect_paths(true)` was set on the builder.
    pub paths: Vec<PathBuf>,

    /// Scan statistics.
    pub stats: ScanStats,

    /// Non-fatal errors met along the way (unreadable directories, files
    /// that could not be stat'ed or read). Only populated if
    /// `.collect_errors(true)` was set on the builder.
    pub errors: Vec<FindError>,
}

/// Statistics for a completed scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanStats {
    /// Candidate files encountered (matched or not). Symlinks count here.
    pub files: usize,

    /// Directories encountered, root included, listed or not.
    pub dirs: usize,

    /// Wall-clock time from walk start to the last worker finishing.
    pub duration: Duration,

    /// `(files + dirs) / duration`, clamped to 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(files: usize, dirs: usize, duration: Duration) -> Self {
        let total = files + dirs;
        let eps = if duration.as_secs_f64() > 0.0 {
            (total as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            dirs,
            duration,
            entries_per_sec: eps,
        }
    }
}
