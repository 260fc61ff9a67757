use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ignore::{DirEntry, ParallelVisitor, ParallelVisitorBuilder, WalkBuilder, WalkState};
use tracing::{debug, info};

use crate::entry::{Candidate, EntryKind};
use crate::error::FindError;
use crate::options::SearchOptions;
use crate::results::ScanStats;
use crate::stream::ResultSink;
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Everything one walk needs, assembled by the builder.
pub(crate) struct EngineOptions {
    pub root:    PathBuf,
    pub options: Arc<SearchOptions>,
    pub threads: usize,
    pub matcher: Arc<dyn Matcher>,
    pub sink:    ResultSink,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Walk `root` on a bounded thread pool, publishing every match to the sink.
///
/// Subdirectories are queued as new pool work as soon as they are seen; no
/// worker waits for the subtrees it discovers. The pool returns once its
/// queue is empty and every worker is idle, and by then all per-thread sinks
/// have been dropped. Dropping the last one here closes the match stream.
pub(crate) fn run(opts: EngineOptions) -> ScanStats {
    let EngineOptions { root, options, threads, matcher, sink } = opts;
    let root = walk_root(root);

    info!(root = %root.display(), threads, "search started");
    debug!(?options, "search options");

    let mut builder = WalkBuilder::new(&root);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(false)
        .same_file_system(false)
        .threads(threads);

    let tally = sink.tally();
    let start = Instant::now();

    let mut visitors = VisitorFactory { options, matcher, sink };
    builder.build_parallel().visit(&mut visitors);
    drop(visitors);

    let stats = ScanStats::compute(tally.files(), tally.dirs(), start.elapsed());
    info!(
        matches = tally.published(),
        files = stats.files,
        dirs = stats.dirs,
        elapsed_ms = stats.duration.as_millis() as u64,
        "search complete"
    );
    stats
}

/// `ignore` reads a bare `-` as stdin; spell it as a relative path instead.
fn walk_root(root: PathBuf) -> PathBuf {
    if root.as_os_str() == "-" {
        Path::new(".").join(root)
    } else {
        root
    }
}

// ---------------------------------------------------------------------------
// Visitors
// ---------------------------------------------------------------------------

/// Hands each pool thread its own visitor.
struct VisitorFactory {
    options: Arc<SearchOptions>,
    matcher: Arc<dyn Matcher>,
    sink:    ResultSink,
}

impl<'s> ParallelVisitorBuilder<'s> for VisitorFactory {
    fn build(&mut self) -> Box<dyn ParallelVisitor + 's> {
        Box::new(DirVisitor {
            options: Arc::clone(&self.options),
            matcher: Arc::clone(&self.matcher),
            sink:    self.sink.clone(),
        })
    }
}

/// Per-thread walker: gates directories on depth, evaluates everything else.
struct DirVisitor {
    options: Arc<SearchOptions>,
    matcher: Arc<dyn Matcher>,
    sink:    ResultSink,
}

impl ParallelVisitor for DirVisitor {
    fn visit(&mut self, entry: Result<DirEntry, ignore::Error>) -> WalkState {
        // Listing failures arrive here: the subtree is lost, nothing else is.
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                self.sink.report(map_ignore_error(err));
                return WalkState::Continue;
            }
        };

        // Only a stdin entry has no file type; a root can never be one.
        let ft = match entry.file_type() {
            Some(ft) => ft,
            None => {
                if entry.depth() == 0 {
                    self.sink.report(FindError::NotADirectory(entry.into_path()));
                }
                return WalkState::Continue;
            }
        };

        if ft.is_dir() {
            self.sink.saw_dir();
            // A directory at walk depth d is listed at options depth
            // current_depth + d.
            if self.options.depth_exhausted_at(entry.depth()) {
                debug!(path = %entry.path().display(), depth = entry.depth(), "depth limit reached");
                return WalkState::Skip;
            }
            return WalkState::Continue;
        }

        if entry.depth() == 0 {
            self.sink.report(FindError::NotADirectory(entry.into_path()));
            return WalkState::Continue;
        }

        self.sink.saw_file();

        let candidate = match into_candidate(entry, ft) {
            Ok(c) => c,
            Err(err) => {
                self.sink.report(err);
                return WalkState::Continue;
            }
        };

        match self.matcher.evaluate(&candidate) {
            Ok(true) => {
                if self.sink.publish(candidate.path).is_err() {
                    // Consumer is gone; nobody is left to hand results to.
                    return WalkState::Quit;
                }
            }
            Ok(false) => {}
            Err(err) => self.sink.report(err),
        }

        WalkState::Continue
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Stat a non-directory entry into a [`Candidate`]. Links are not followed.
fn into_candidate(entry: DirEntry, ft: std::fs::FileType) -> Result<Candidate, FindError> {
    let metadata = entry.metadata().map_err(|err| FindError::FileStat {
        path:   entry.path().to_path_buf(),
        source: into_io_error(err),
    })?;

    Ok(Candidate {
        name:  entry.file_name().to_string_lossy().into_owned(),
        kind:  EntryKind::from_file_type(ft),
        depth: entry.depth(),
        size:  metadata.len(),
        path:  entry.into_path(),
    })
}

fn into_io_error(err: ignore::Error) -> io::Error {
    let msg = err.to_string();
    err.into_io_error().unwrap_or_else(|| io::Error::other(msg))
}

/// Map an `ignore` traversal error onto [`FindError`].
///
/// The parallel walker wraps I/O errors in `WithDepth` and `WithPath`
/// layers; peel them until the path and the underlying error are known.
fn map_ignore_error(err: ignore::Error) -> FindError {
    match err {
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(source) => FindError::DirectoryRead { path, source },
            ignore::Error::WithDepth { err, .. } => match map_ignore_error(*err) {
                FindError::DirectoryRead { source, .. } => FindError::DirectoryRead { path, source },
                other => other,
            },
            other => FindError::Walk(format!("{}: {}", path.display(), other)),
        },
        ignore::Error::Loop { child, .. } => FindError::SymlinkLoop(child),
        ignore::Error::Io(source) => FindError::DirectoryRead {
            path: PathBuf::new(),
            source,
        },
        other => FindError::Walk(other.to_string()),
    }
}
