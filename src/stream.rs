use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, SendError, Sender};
use tracing::{trace, warn};

use crate::engine::{self, EngineOptions};
use crate::error::FindError;
use crate::results::{Results, ScanStats};

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// Counters shared by every walker thread and the [`Search`] handle.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    files:     AtomicUsize,
    dirs:      AtomicUsize,
    published: AtomicUsize,
}

impl Tally {
    pub(crate) fn files(&self) -> usize {
        self.files.load(Ordering::Relaxed)
    }

    pub(crate) fn dirs(&self) -> usize {
        self.dirs.load(Ordering::Relaxed)
    }

    pub(crate) fn published(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// ResultSink
// ---------------------------------------------------------------------------

/// The producer side of a search: one clone per walker thread.
///
/// The match stream closes when the last clone is dropped. Clones live in the
/// walker's per-thread visitors and in the engine itself, and the engine only
/// returns after the pool has joined every thread, so closure happens exactly
/// once, after the final publish.
#[derive(Clone)]
pub(crate) struct ResultSink {
    matches:     Sender<PathBuf>,
    diagnostics: Option<Sender<FindError>>,
    tally:       Arc<Tally>,
}

impl ResultSink {
    /// Hand a matching path to the consumer, blocking until it is received.
    ///
    /// Fails only when the consumer has gone away.
    pub(crate) fn publish(&self, path: PathBuf) -> Result<(), SendError<PathBuf>> {
        trace!(path = %path.display(), "match");
        self.matches.send(path)?;
        self.tally.published.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Report a non-fatal error. Always logged; queued for
    /// [`Results::errors`] only when error collection is on.
    pub(crate) fn report(&self, err: FindError) {
        match std::error::Error::source(&err) {
            Some(cause) => warn!("{err}: {cause}"),
            None => warn!("{err}"),
        }
        if let Some(tx) = &self.diagnostics {
            // The receiver only disappears together with the Search handle.
            let _ = tx.send(err);
        }
    }

    pub(crate) fn saw_file(&self) {
        self.tally.files.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn saw_dir(&self) {
        self.tally.dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn tally(&self) -> Arc<Tally> {
        Arc::clone(&self.tally)
    }
}

/// Create the match stream and its diagnostics side channel.
///
/// Matches go through a zero-capacity channel: every publish is a direct
/// handoff to the consumer. Diagnostics are buffered, they are rare and the
/// consumer only drains them at the end.
pub(crate) fn channel(
    collect_errors: bool,
) -> (ResultSink, Receiver<PathBuf>, Option<Receiver<FindError>>) {
    let (match_tx, match_rx) = bounded(0);
    let (diag_tx, diag_rx) = if collect_errors {
        let (tx, rx) = unbounded();
        (Some(tx), Some(rx))
    } else {
        (None, None)
    };

    let sink = ResultSink {
        matches:     match_tx,
        diagnostics: diag_tx,
        tally:       Arc::new(Tally::default()),
    };
    (sink, match_rx, diag_rx)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// A running search: the consumer end of the match stream.
///
/// Created by [`SearchBuilder::spawn`](crate::SearchBuilder::spawn). Iterate
/// it (or call [`recv`](Search::recv)) to receive matching paths as they are
/// found, in no particular order. Iteration ends exactly when the walk is
/// complete. Call [`wait`](Search::wait) for the final [`Results`].
///
/// Dropping a `Search` before the stream ends is not a way to cancel a
/// search. It is tolerated: the walker notices at its next publish and winds
/// down, but work already underway still runs.
///
/// # Example
///
/// ```rust,no_run
/// let search = parfind::search()
///     .root("/var/log")
///     .name("*.log")
///     .content("panic")
///     .spawn()?;
///
/// for path in &search {
///     println!("{}", path.display());
/// }
///
/// let results = search.wait()?;
/// println!("Found {} matching files", results.matches);
/// # Ok::<(), parfind::FindError>(())
/// ```
pub struct Search {
    matches:       Receiver<PathBuf>,
    diagnostics:   Option<Receiver<FindError>>,
    walker:        JoinHandle<ScanStats>,
    tally:         Arc<Tally>,
    collect_paths: bool,
}

impl Search {
    /// Start the walk on a dedicated thread.
    pub(crate) fn start(
        opts: EngineOptions,
        matches: Receiver<PathBuf>,
        diagnostics: Option<Receiver<FindError>>,
        collect_paths: bool,
    ) -> Result<Self, FindError> {
        let tally = opts.sink.tally();
        let walker = std::thread::Builder::new()
            .name("parfind-walk".into())
            .spawn(move || engine::run(opts))
            .map_err(FindError::Spawn)?;

        Ok(Self {
            matches,
            diagnostics,
            walker,
            tally,
            collect_paths,
        })
    }

    /// Block until the next match arrives. `None` once the search is done.
    pub fn recv(&self) -> Option<PathBuf> {
        self.matches.recv().ok()
    }

    /// Blocking iterator over matches; ends when the search is done.
    pub fn iter(&self) -> crossbeam_channel::Iter<'_, PathBuf> {
        self.matches.iter()
    }

    /// Number of matches handed to the consumer so far.
    pub fn published(&self) -> usize {
        self.tally.published()
    }

    /// Drain whatever is left of the stream, join the walk and summarise.
    ///
    /// Paths received here (not those already taken through
    /// [`recv`](Search::recv) or iteration) land in [`Results::paths`] when
    /// `.collect_paths(true)` was set. [`Results::matches`] always counts
    /// every match of the search.
    ///
    /// # Errors
    ///
    /// [`FindError::WalkerPanicked`] if the walk thread panicked.
    pub fn wait(self) -> Result<Results, FindError> {
        let mut paths = Vec::new();
        for path in self.matches.iter() {
            if self.collect_paths {
                paths.push(path);
            }
        }

        let stats = self.walker.join().map_err(|_| FindError::WalkerPanicked)?;

        let errors = self
            .diagnostics
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        Ok(Results {
            matches: self.tally.published(),
            paths,
            stats,
            errors,
        })
    }
}

impl<'a> IntoIterator for &'a Search {
    type Item = PathBuf;
    type IntoIter = crossbeam_channel::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
